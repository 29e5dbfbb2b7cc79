//! Class-balancing weights for the training aggregates.

use std::collections::HashMap;

use crate::model::{MonthlyAggregate, WeightedAggregate};

/// weight = 1 / (rows sharing the category). Each category's weights sum to 1.
pub fn assign_weights(aggregates: Vec<MonthlyAggregate>) -> Vec<WeightedAggregate> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for a in &aggregates {
        *counts.entry(a.category.clone()).or_insert(0) += 1;
    }

    aggregates
        .into_iter()
        .map(|aggregate| {
            let n = counts[&aggregate.category];
            WeightedAggregate {
                weight: 1.0 / n as f64,
                aggregate,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::{MonthKey, Triplet};

    fn key(m: u32) -> MonthKey {
        MonthKey::new(2024, m).unwrap()
    }

    #[test]
    fn test_weights_for_two_categories() {
        let rows = aggregate(&vec![
            Triplet::new(key(1), "A", 100.0),
            Triplet::new(key(1), "B", 50.0),
            Triplet::new(key(2), "A", 80.0),
        ]);
        let weighted = assign_weights(rows);

        for w in &weighted {
            match w.aggregate.category.as_str() {
                "A" => assert_eq!(w.weight, 0.5),
                "B" => assert_eq!(w.weight, 1.0),
                other => panic!("unexpected category {other}"),
            }
        }
    }

    #[test]
    fn test_category_weights_sum_to_one() {
        let mut triplets = Vec::new();
        for m in 1..=7 {
            triplets.push(Triplet::new(key(m), "Frequent", 10.0));
        }
        for m in 1..=3 {
            triplets.push(Triplet::new(key(m), "Rare", 10.0));
        }
        let weighted = assign_weights(aggregate(&triplets));

        let mut sums: HashMap<String, f64> = HashMap::new();
        for w in &weighted {
            *sums.entry(w.aggregate.category.clone()).or_insert(0.0) += w.weight;
        }
        for (category, sum) in sums {
            assert!((sum - 1.0).abs() < 1e-12, "{category} sums to {sum}");
        }
    }

    #[test]
    fn test_empty() {
        assert!(assign_weights(Vec::new()).is_empty());
    }
}
