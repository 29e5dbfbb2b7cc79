//! One-versus-all ensemble of averaged perceptrons

use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{Classifier, Prediction, TrainingTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptronParams {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Seed for the per-epoch shuffle
    pub seed: u64,
}

impl Default for PerceptronParams {
    fn default() -> Self {
        Self {
            epochs: 20,
            learning_rate: 1.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PerceptronEnsemble {
    /// classes x features, averaged over every update step
    weights: Array2<f64>,
    biases: Array1<f64>,
}

impl Classifier for PerceptronEnsemble {
    fn predict(&self, row: ArrayView1<'_, f64>) -> Prediction {
        let margins = self.weights.dot(&row) + &self.biases;
        Prediction::from_scores(margins.to_vec())
    }
}

pub(super) fn fit(table: &TrainingTable, params: &PerceptronParams) -> PerceptronEnsemble {
    let x = &table.features;
    let (n, d) = x.dim();
    let k = table.n_classes;
    let sample_weights = table.weights_or_ones();

    let mut weights = Array2::<f64>::zeros((k, d));
    let mut biases = Array1::<f64>::zeros(k);

    for class in 0..k {
        let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(class as u64));
        let mut order: Vec<usize> = (0..n).collect();

        let mut w = Array1::<f64>::zeros(d);
        let mut b = 0.0;
        let mut sum_w = Array1::<f64>::zeros(d);
        let mut sum_b = 0.0;
        let mut steps = 0usize;

        for _ in 0..params.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                let row = x.row(i);
                let target = if table.labels[i] == class { 1.0 } else { -1.0 };
                if target * (w.dot(&row) + b) <= 0.0 {
                    let step = params.learning_rate * sample_weights[i] * target;
                    w.scaled_add(step, &row);
                    b += step;
                }
                sum_w += &w;
                sum_b += b;
                steps += 1;
            }
        }

        if steps > 0 {
            weights.row_mut(class).assign(&(sum_w / steps as f64));
            biases[class] = sum_b / steps as f64;
        }
    }

    PerceptronEnsemble { weights, biases }
}
