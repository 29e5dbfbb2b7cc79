//! Trainer / model capability and the built-in learners.
//!
//! A `Trainer` turns a labeled, optionally weighted feature table into a
//! `Classifier`; a `RegressionTrainer` does the same for a `Regressor`.
//! The built-in learners are tagged variants of `ClassifierKind` and
//! `RegressorKind`.

pub mod boosting;
pub mod maxent;
pub mod perceptron;
pub mod tree;

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use boosting::{BoostedTreesParams, GradientBoostingParams};
pub use maxent::MaxEntropyParams;
pub use perceptron::PerceptronParams;
pub use tree::{RegressionTree, TreeParams};

#[derive(Debug, Error)]
pub enum FitError {
    #[error("empty training table")]
    Empty,

    #[error("dimension mismatch: expected {expected} {what}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("negative sample weight")]
    NegativeWeight,
}

/// Feature table for classification.
#[derive(Debug, Clone)]
pub struct TrainingTable {
    pub features: Array2<f64>,
    /// Class index per row, `< n_classes`
    pub labels: Vec<usize>,
    pub weights: Option<Array1<f64>>,
    pub n_classes: usize,
}

impl TrainingTable {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Sample weights, defaulting to 1.0 per row.
    pub fn weights_or_ones(&self) -> Vec<f64> {
        match &self.weights {
            Some(w) => w.to_vec(),
            None => vec![1.0; self.n_rows()],
        }
    }

    pub fn validate(&self) -> Result<(), FitError> {
        let n = self.n_rows();
        if n == 0 || self.n_classes == 0 {
            return Err(FitError::Empty);
        }
        if self.labels.len() != n {
            return Err(FitError::DimensionMismatch {
                what: "labels",
                expected: n,
                got: self.labels.len(),
            });
        }
        if let Some(&label) = self.labels.iter().find(|&&l| l >= self.n_classes) {
            return Err(FitError::LabelOutOfRange {
                label,
                n_classes: self.n_classes,
            });
        }
        if !self.features.iter().all(|v| v.is_finite()) {
            return Err(FitError::NonFinite("features"));
        }
        validate_weights(self.weights.as_ref(), n)
    }
}

/// Feature table for regression.
#[derive(Debug, Clone)]
pub struct RegressionTable {
    pub features: Array2<f64>,
    pub targets: Array1<f64>,
}

impl RegressionTable {
    pub fn validate(&self) -> Result<(), FitError> {
        let n = self.features.nrows();
        if n == 0 {
            return Err(FitError::Empty);
        }
        if self.targets.len() != n {
            return Err(FitError::DimensionMismatch {
                what: "targets",
                expected: n,
                got: self.targets.len(),
            });
        }
        if !self.features.iter().all(|v| v.is_finite()) {
            return Err(FitError::NonFinite("features"));
        }
        if !self.targets.iter().all(|v| v.is_finite()) {
            return Err(FitError::NonFinite("targets"));
        }
        Ok(())
    }
}

fn validate_weights(weights: Option<&Array1<f64>>, n: usize) -> Result<(), FitError> {
    let Some(w) = weights else { return Ok(()) };
    if w.len() != n {
        return Err(FitError::DimensionMismatch {
            what: "weights",
            expected: n,
            got: w.len(),
        });
    }
    if !w.iter().all(|v| v.is_finite()) {
        return Err(FitError::NonFinite("weights"));
    }
    if w.iter().any(|&v| v < 0.0) {
        return Err(FitError::NegativeWeight);
    }
    Ok(())
}

/// Output of a classifier for one record
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: usize,
    /// Per-class scores; higher is more likely.
    pub scores: Vec<f64>,
}

impl Prediction {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        Self {
            label: argmax(&scores),
            scores,
        }
    }
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| {
            if v > bv { (i, v) } else { (bi, bv) }
        })
        .0
}

pub(crate) fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

pub trait Classifier {
    fn predict(&self, row: ArrayView1<'_, f64>) -> Prediction;
}

pub trait Trainer {
    fn fit(&self, table: &TrainingTable) -> Result<Box<dyn Classifier>, FitError>;
}

pub trait Regressor {
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64;
}

pub trait RegressionTrainer {
    fn fit(&self, table: &RegressionTable) -> Result<Box<dyn Regressor>, FitError>;
}

/// Built-in multiclass learners
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierKind {
    GradientBoosting(GradientBoostingParams),
    MaxEntropy(MaxEntropyParams),
    PerceptronEnsemble(PerceptronParams),
}

impl ClassifierKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClassifierKind::GradientBoosting(_) => "GradientBoosting",
            ClassifierKind::MaxEntropy(_) => "MaxEntropy",
            ClassifierKind::PerceptronEnsemble(_) => "PerceptronEnsemble",
        }
    }
}

impl Trainer for ClassifierKind {
    fn fit(&self, table: &TrainingTable) -> Result<Box<dyn Classifier>, FitError> {
        table.validate()?;
        Ok(match self {
            ClassifierKind::GradientBoosting(p) => Box::new(boosting::fit_classifier(table, p)),
            ClassifierKind::MaxEntropy(p) => Box::new(maxent::fit(table, p)),
            ClassifierKind::PerceptronEnsemble(p) => Box::new(perceptron::fit(table, p)),
        })
    }
}

/// Built-in regression learners
#[derive(Debug, Clone, PartialEq)]
pub enum RegressorKind {
    BoostedTrees(BoostedTreesParams),
}

impl RegressorKind {
    pub fn name(&self) -> &'static str {
        match self {
            RegressorKind::BoostedTrees(_) => "BoostedTrees",
        }
    }
}

impl RegressionTrainer for RegressorKind {
    fn fit(&self, table: &RegressionTable) -> Result<Box<dyn Regressor>, FitError> {
        table.validate()?;
        Ok(match self {
            RegressorKind::BoostedTrees(p) => Box::new(boosting::fit_regressor(table, p)),
        })
    }
}

/// Hyperparameters of every built-in learner (`[trainers]` in sellcast.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerParams {
    pub gradient_boosting: GradientBoostingParams,
    pub max_entropy: MaxEntropyParams,
    pub perceptron: PerceptronParams,
    pub regression: BoostedTreesParams,
}

impl TrainerParams {
    /// Candidate classifiers in evaluation order (order decides ties).
    pub fn classifiers(&self) -> Vec<ClassifierKind> {
        vec![
            ClassifierKind::GradientBoosting(self.gradient_boosting.clone()),
            ClassifierKind::MaxEntropy(self.max_entropy.clone()),
            ClassifierKind::PerceptronEnsemble(self.perceptron.clone()),
        ]
    }

    pub fn regressor(&self) -> RegressorKind {
        RegressorKind::BoostedTrees(self.regression.clone())
    }
}
