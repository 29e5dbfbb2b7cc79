//! Fit every candidate trainer on the weighted training aggregates, score each
//! on the same table, keep the best.
//!
//! Scoring is in-sample: the table a model is fitted on is the table it is
//! ranked on.

use sellcast_core::{ForecastError, MonthKey, Result, WeightedAggregate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::features::{ClassificationEncoder, LabelMap};
use crate::metrics::macro_accuracy;
use crate::trainers::{Classifier, Trainer, TrainerParams};

/// A named trainer awaiting evaluation
pub struct Candidate {
    pub name: String,
    pub trainer: Box<dyn Trainer>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, trainer: impl Trainer + 'static) -> Self {
        Self {
            name: name.into(),
            trainer: Box::new(trainer),
        }
    }
}

/// The built-in candidates in evaluation order.
pub fn default_candidates(params: &TrainerParams) -> Vec<Candidate> {
    params
        .classifiers()
        .into_iter()
        .map(|kind| Candidate::new(kind.name(), kind))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub name: String,
    pub macro_accuracy: f64,
}

/// The winning model together with the encoding it was trained under
pub struct Selection {
    pub name: String,
    pub macro_accuracy: f64,
    pub model: Box<dyn Classifier>,
    pub encoder: ClassificationEncoder,
    pub labels: LabelMap,
    /// Every candidate's score, in evaluation order
    pub leaderboard: Vec<CandidateScore>,
}

impl Selection {
    pub fn predict_category(&self, month: MonthKey, revenue: f64) -> &str {
        let row = self.encoder.encode(month, revenue);
        let prediction = self.model.predict(row.view());
        self.labels.label(prediction.label).unwrap_or_default()
    }
}

struct Evaluated {
    name: String,
    macro_accuracy: f64,
    model: Box<dyn Classifier>,
}

/// Fit, score, and select. Ties keep the earlier candidate.
pub fn select_best(rows: &[WeightedAggregate], candidates: &[Candidate]) -> Result<Selection> {
    if rows.is_empty() {
        return Err(ForecastError::no_data("training aggregates are empty"));
    }
    if candidates.is_empty() {
        return Err(ForecastError::no_data("no candidate trainers configured"));
    }

    let labels = LabelMap::from_categories(rows.iter().map(|r| r.aggregate.category.as_str()));
    let (encoder, table) = ClassificationEncoder::fit(rows, &labels);
    info!(
        rows = table.n_rows(),
        classes = labels.len(),
        features = table.features.ncols(),
        "built training table"
    );

    let mut leaderboard = Vec::with_capacity(candidates.len());
    let best = candidates
        .iter()
        .try_fold(None::<Evaluated>, |best, candidate| {
            let model = candidate
                .trainer
                .fit(&table)
                .map_err(|e| ForecastError::trainer_fit(&candidate.name, e.to_string()))?;

            let predicted: Vec<usize> = table
                .features
                .rows()
                .into_iter()
                .map(|row| model.predict(row).label)
                .collect();
            let accuracy = macro_accuracy(&table.labels, &predicted);
            info!(trainer = %candidate.name, macro_accuracy = accuracy, "evaluated candidate");

            leaderboard.push(CandidateScore {
                name: candidate.name.clone(),
                macro_accuracy: accuracy,
            });

            Ok::<_, ForecastError>(match best {
                Some(b) if accuracy <= b.macro_accuracy => Some(b),
                _ => Some(Evaluated {
                    name: candidate.name.clone(),
                    macro_accuracy: accuracy,
                    model,
                }),
            })
        })?
        .ok_or_else(|| ForecastError::no_data("no candidate was evaluated"))?;

    info!(trainer = %best.name, macro_accuracy = best.macro_accuracy, "selected model");
    Ok(Selection {
        name: best.name,
        macro_accuracy: best.macro_accuracy,
        model: best.model,
        encoder,
        labels,
        leaderboard,
    })
}
