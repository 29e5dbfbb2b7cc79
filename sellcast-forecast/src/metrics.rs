//! Classification metrics used to rank candidate trainers

use std::collections::BTreeMap;

/// Recall per class, over the classes present in `truth`.
pub fn per_class_recall(truth: &[usize], predicted: &[usize]) -> BTreeMap<usize, f64> {
    let mut totals: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    for (&t, &p) in truth.iter().zip(predicted) {
        let entry = totals.entry(t).or_insert((0, 0));
        entry.1 += 1;
        if t == p {
            entry.0 += 1;
        }
    }
    totals
        .into_iter()
        .map(|(class, (hit, total))| (class, hit as f64 / total as f64))
        .collect()
}

/// Unweighted mean of per-class recall. Empty input scores 0.
pub fn macro_accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    let recalls = per_class_recall(truth, predicted);
    if recalls.is_empty() {
        return 0.0;
    }
    recalls.values().sum::<f64>() / recalls.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn micro_accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
        if truth.is_empty() {
            return 0.0;
        }
        let hits = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
        hits as f64 / truth.len() as f64
    }

    #[test]
    fn test_macro_ignores_class_frequency() {
        // Class 0: 9/9 correct, class 1: 0/1 correct.
        let truth = [0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let predicted = [0; 10];
        assert_eq!(micro_accuracy(&truth, &predicted), 0.9);
        assert_eq!(macro_accuracy(&truth, &predicted), 0.5);
    }

    #[test]
    fn test_per_class_recall() {
        let recall = per_class_recall(&[0, 1, 1, 2], &[0, 1, 0, 1]);
        assert_eq!(recall[&0], 1.0);
        assert_eq!(recall[&1], 0.5);
        assert_eq!(recall[&2], 0.0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(macro_accuracy(&[], &[]), 0.0);
        assert_eq!(micro_accuracy(&[], &[]), 0.0);
    }
}
