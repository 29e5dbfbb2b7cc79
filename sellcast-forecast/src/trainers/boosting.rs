//! Gradient boosting over regression trees.
//!
//! The classifier boosts one tree per class and round on the softmax
//! gradient with Newton leaf values; the regressor boosts on least squares.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tree::{RegressionTree, TreeParams};
use super::{Classifier, Prediction, RegressionTable, Regressor, TrainingTable, softmax};

/// Multiclass gradient boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingParams {
    /// Boosting rounds (one tree per class per round)
    pub rounds: usize,
    /// Shrinkage applied to each tree
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            rounds: 50,
            learning_rate: 0.2,
            max_depth: 4,
            min_samples_leaf: 1,
        }
    }
}

/// Least-squares gradient boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostedTreesParams {
    pub rounds: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for BoostedTreesParams {
    fn default() -> Self {
        Self {
            rounds: 100,
            learning_rate: 0.1,
            max_depth: 4,
            min_samples_leaf: 2,
        }
    }
}

const HESSIAN_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    base: Vec<f64>,
    learning_rate: f64,
    /// rounds x classes
    trees: Vec<Vec<RegressionTree>>,
}

impl Classifier for GradientBoostingModel {
    fn predict(&self, row: ArrayView1<'_, f64>) -> Prediction {
        let mut logits = self.base.clone();
        for round in &self.trees {
            for (k, tree) in round.iter().enumerate() {
                logits[k] += self.learning_rate * tree.predict(row);
            }
        }
        Prediction::from_scores(softmax(&logits))
    }
}

pub(super) fn fit_classifier(
    table: &TrainingTable,
    params: &GradientBoostingParams,
) -> GradientBoostingModel {
    let n = table.n_rows();
    let k = table.n_classes;
    let weights = table.weights_or_ones();
    let tree_params = TreeParams {
        max_depth: params.max_depth,
        min_samples_leaf: params.min_samples_leaf,
    };

    // Start from the log of the weighted class priors.
    let mut prior = vec![0.0; k];
    for (i, &label) in table.labels.iter().enumerate() {
        prior[label] += weights[i];
    }
    let total: f64 = prior.iter().sum();
    let base: Vec<f64> = prior
        .iter()
        .map(|&p| ((p / total.max(HESSIAN_FLOOR)).max(HESSIAN_FLOOR)).ln())
        .collect();

    let mut model = GradientBoostingModel {
        base: base.clone(),
        learning_rate: params.learning_rate,
        trees: Vec::with_capacity(params.rounds),
    };
    if k < 2 {
        return model;
    }

    let mut logits = Array2::from_shape_fn((n, k), |(_, c)| base[c]);
    let scale = (k as f64 - 1.0) / k as f64;

    for round in 0..params.rounds {
        let probs: Vec<Vec<f64>> = logits
            .rows()
            .into_iter()
            .map(|r| softmax(&r.to_vec()))
            .collect();

        let mut round_trees = Vec::with_capacity(k);
        for class in 0..k {
            let residual: Vec<f64> = (0..n)
                .map(|i| (if table.labels[i] == class { 1.0 } else { 0.0 }) - probs[i][class])
                .collect();
            let hessian: Vec<f64> = (0..n).map(|i| probs[i][class] * (1.0 - probs[i][class])).collect();

            let tree = RegressionTree::fit_with(
                &table.features,
                &residual,
                &weights,
                tree_params,
                |idx: &[usize]| {
                    let num: f64 = idx.iter().map(|&i| weights[i] * residual[i]).sum();
                    let den: f64 = idx.iter().map(|&i| weights[i] * hessian[i]).sum();
                    scale * num / den.max(HESSIAN_FLOOR)
                },
            );

            for i in 0..n {
                logits[[i, class]] += params.learning_rate * tree.predict(table.features.row(i));
            }
            round_trees.push(tree);
        }
        model.trees.push(round_trees);
        debug!(round, "boosting round complete");
    }

    model
}

#[derive(Debug, Clone)]
pub struct BoostedTreesModel {
    base: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl Regressor for BoostedTreesModel {
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.base
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.predict(row))
                .sum::<f64>()
    }
}

pub(super) fn fit_regressor(table: &RegressionTable, params: &BoostedTreesParams) -> BoostedTreesModel {
    let n = table.features.nrows();
    let weights = vec![1.0; n];
    let tree_params = TreeParams {
        max_depth: params.max_depth,
        min_samples_leaf: params.min_samples_leaf,
    };

    let base = table.targets.mean().unwrap_or(0.0);
    let mut fitted = vec![base; n];
    let mut trees = Vec::with_capacity(params.rounds);

    for _ in 0..params.rounds {
        let residual: Vec<f64> = (0..n).map(|i| table.targets[i] - fitted[i]).collect();
        let tree = RegressionTree::fit(&table.features, &residual, &weights, tree_params);
        for (i, f) in fitted.iter_mut().enumerate() {
            *f += params.learning_rate * tree.predict(table.features.row(i));
        }
        trees.push(tree);
    }

    BoostedTreesModel {
        base,
        learning_rate: params.learning_rate,
        trees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};

    #[test]
    fn test_classifier_learns_threshold() {
        let table = TrainingTable {
            features: array![[0.0], [0.1], [0.2], [0.8], [0.9], [1.0]],
            labels: vec![0, 0, 0, 1, 1, 1],
            weights: None,
            n_classes: 2,
        };
        let model = fit_classifier(&table, &GradientBoostingParams::default());
        assert_eq!(model.predict(array![0.05].view()).label, 0);
        assert_eq!(model.predict(array![0.95].view()).label, 1);
        let scores = model.predict(array![0.95].view()).scores;
        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_always_predicted() {
        let table = TrainingTable {
            features: array![[0.0], [1.0]],
            labels: vec![0, 0],
            weights: None,
            n_classes: 1,
        };
        let model = fit_classifier(&table, &GradientBoostingParams::default());
        assert_eq!(model.predict(array![0.5].view()).label, 0);
    }

    #[test]
    fn test_regressor_fits_group_means() {
        // One-hot group indicator; targets are group constants.
        let table = RegressionTable {
            features: array![[1.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]],
            targets: Array1::from(vec![100.0, 100.0, 20.0, 20.0]),
        };
        let params = BoostedTreesParams {
            rounds: 200,
            learning_rate: 0.1,
            max_depth: 2,
            min_samples_leaf: 1,
        };
        let model = fit_regressor(&table, &params);
        assert!((model.predict(array![1.0, 0.0].view()) - 100.0).abs() < 1e-3);
        assert!((model.predict(array![0.0, 1.0].view()) - 20.0).abs() < 1e-3);
    }
}
