//! Per-category random train/held-out split.
//!
//! Every category contributes floor(20%) of its triplets to the held-out pool,
//! so rare categories never vanish from evaluation.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::model::Triplet;

/// Held-out share numerator/denominator: floor(n * 1 / 5).
const HOLDOUT_DIVISOR: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<Triplet>,
    pub test: Vec<Triplet>,
}

/// Number of held-out items for a category with `n` triplets.
pub fn holdout_count(n: usize) -> usize {
    n / HOLDOUT_DIVISOR
}

/// Shuffle each category independently and cut the first floor(0.2 * n)
/// ranks into the held-out pool.
pub fn split_by_category<R: Rng + ?Sized>(triplets: &[Triplet], rng: &mut R) -> Split {
    let mut by_category: BTreeMap<&str, Vec<&Triplet>> = BTreeMap::new();
    for t in triplets {
        by_category.entry(t.category.as_str()).or_default().push(t);
    }

    let mut split = Split::default();
    for (_, mut items) in by_category {
        items.shuffle(rng);
        let cut = holdout_count(items.len());
        for (rank, item) in items.into_iter().enumerate() {
            if rank < cut {
                split.test.push(item.clone());
            } else {
                split.train.push(item.clone());
            }
        }
    }

    info!(
        train = split.train.len(),
        test = split.test.len(),
        "split triplets by category"
    );
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonthKey;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn corpus() -> Vec<Triplet> {
        let mut out = Vec::new();
        let counts = [("Electronics", 23), ("Furniture", 10), ("Toys", 4), ("Books", 1)];
        for (category, n) in counts {
            for i in 0..n {
                let month = MonthKey::new(2024, (i % 12) as u32 + 1).unwrap();
                out.push(Triplet::new(month, category, 10.0 + i as f64));
            }
        }
        out
    }

    fn count_by_category(ts: &[Triplet]) -> HashMap<String, usize> {
        let mut m = HashMap::new();
        for t in ts {
            *m.entry(t.category.clone()).or_insert(0) += 1;
        }
        m
    }

    #[test]
    fn test_holdout_count_floors() {
        assert_eq!(holdout_count(0), 0);
        assert_eq!(holdout_count(4), 0);
        assert_eq!(holdout_count(5), 1);
        assert_eq!(holdout_count(23), 4);
    }

    #[test]
    fn test_per_category_sizes() {
        let data = corpus();
        let mut rng = StdRng::seed_from_u64(7);
        let split = split_by_category(&data, &mut rng);

        let totals = count_by_category(&data);
        let tests = count_by_category(&split.test);
        let trains = count_by_category(&split.train);
        for (category, n) in totals {
            let held = tests.get(&category).copied().unwrap_or(0);
            let kept = trains.get(&category).copied().unwrap_or(0);
            assert_eq!(held, n / 5, "held-out size for {category}");
            assert_eq!(held + kept, n, "partition size for {category}");
        }
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        // Revenues are unique per category, so (category, revenue) identifies a triplet.
        let data = corpus();
        let mut rng = StdRng::seed_from_u64(99);
        let split = split_by_category(&data, &mut rng);

        let key = |t: &Triplet| (t.category.clone(), t.revenue.to_bits());
        let train: Vec<_> = split.train.iter().map(key).collect();
        let test: Vec<_> = split.test.iter().map(key).collect();
        assert!(test.iter().all(|k| !train.contains(k)));

        let mut union: Vec<_> = train.into_iter().chain(test).collect();
        let mut all: Vec<_> = data.iter().map(key).collect();
        union.sort();
        all.sort();
        assert_eq!(union, all);
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let data = corpus();
        let a = split_by_category(&data, &mut StdRng::seed_from_u64(3));
        let b = split_by_category(&data, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
