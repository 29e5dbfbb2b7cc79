//! Maximum-entropy (multinomial logistic) classifier

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Classifier, Prediction, TrainingTable, softmax};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxEntropyParams {
    /// Full-batch gradient steps
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 penalty on the coefficients (not the intercepts)
    pub l2: f64,
}

impl Default for MaxEntropyParams {
    fn default() -> Self {
        Self {
            epochs: 500,
            learning_rate: 0.5,
            l2: 1e-4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaxEntropyModel {
    /// classes x features
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
}

impl Classifier for MaxEntropyModel {
    fn predict(&self, row: ArrayView1<'_, f64>) -> Prediction {
        let logits = self.coefficients.dot(&row) + &self.intercepts;
        Prediction::from_scores(softmax(&logits.to_vec()))
    }
}

pub(super) fn fit(table: &TrainingTable, params: &MaxEntropyParams) -> MaxEntropyModel {
    let x = &table.features;
    let (n, d) = x.dim();
    let k = table.n_classes;

    let weights = Array1::from(table.weights_or_ones());
    let total_weight = weights.sum().max(f64::EPSILON);

    let mut onehot = Array2::<f64>::zeros((n, k));
    for (i, &label) in table.labels.iter().enumerate() {
        onehot[[i, label]] = 1.0;
    }

    let mut coefficients = Array2::<f64>::zeros((k, d));
    let mut intercepts = Array1::<f64>::zeros(k);

    for epoch in 0..params.epochs {
        let logits = x.dot(&coefficients.t()) + &intercepts;
        let mut errors = Array2::<f64>::zeros((n, k));
        for (i, row) in logits.axis_iter(Axis(0)).enumerate() {
            let p = softmax(&row.to_vec());
            for c in 0..k {
                errors[[i, c]] = (p[c] - onehot[[i, c]]) * weights[i];
            }
        }

        let grad_w = errors.t().dot(x) / total_weight + &coefficients * params.l2;
        let grad_b = errors.sum_axis(Axis(0)) / total_weight;

        coefficients = coefficients - grad_w * params.learning_rate;
        intercepts = intercepts - grad_b * params.learning_rate;

        if epoch % 100 == 0 {
            debug!(epoch, "max entropy step");
        }
    }

    MaxEntropyModel {
        coefficients,
        intercepts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_three_class_separation() {
        let table = TrainingTable {
            features: array![
                [1.0, 0.0, 0.0],
                [0.9, 0.1, 0.0],
                [0.0, 1.0, 0.0],
                [0.1, 0.9, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.1, 0.9]
            ],
            labels: vec![0, 0, 1, 1, 2, 2],
            weights: None,
            n_classes: 3,
        };
        let model = fit(&table, &MaxEntropyParams::default());
        for (i, &label) in table.labels.iter().enumerate() {
            assert_eq!(model.predict(table.features.row(i)).label, label);
        }
    }

    #[test]
    fn test_weights_shift_the_decision() {
        // Identical features, conflicting labels: the heavier label wins.
        let table = TrainingTable {
            features: array![[1.0], [1.0]],
            labels: vec![0, 1],
            weights: Some(array![1.0, 3.0]),
            n_classes: 2,
        };
        let model = fit(&table, &MaxEntropyParams::default());
        let pred = model.predict(array![1.0].view());
        assert_eq!(pred.label, 1);
        assert!(pred.scores[1] > 0.7);
    }
}
