//! Collapse triplets into one summed row per (month, category).

use std::collections::BTreeMap;

use crate::model::{MonthKey, MonthlyAggregate, Triplet};

/// Group by (month, category) and sum revenue.
///
/// Sparse: combinations that never occur produce no row. Output is ordered by
/// month, then category.
pub fn aggregate<'a, I>(triplets: I) -> Vec<MonthlyAggregate>
where
    I: IntoIterator<Item = &'a Triplet>,
{
    let mut groups: BTreeMap<(MonthKey, &'a str), f64> = BTreeMap::new();
    for t in triplets {
        *groups.entry((t.month, t.category.as_str())).or_insert(0.0) += t.revenue;
    }

    groups
        .into_iter()
        .map(|((month, category), total_revenue)| MonthlyAggregate {
            month,
            category: category.to_string(),
            total_revenue,
        })
        .collect()
}

/// Earliest month present in a set of aggregates.
pub fn earliest_month(aggregates: &[MonthlyAggregate]) -> Option<MonthKey> {
    aggregates.iter().map(|a| a.month).min()
}
