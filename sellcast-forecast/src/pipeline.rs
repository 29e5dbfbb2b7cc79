//! End-to-end flows from parsed transactions to forecasts.

use rand::Rng;
use sellcast_core::{
    ForecastError, ForecastResult, RawTransaction, Result, RevenueForecastResult, Triplet,
    aggregate, assign_weights, split_by_category,
};
use sellcast_ingest::{read_holdout_csv, write_holdout_csv};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::category::forecast_best_seller;
use crate::orchestrator::{Candidate, CandidateScore, select_best};
use crate::revenue::RevenueForecaster;
use crate::trainers::RegressionTrainer;

/// Outcome of the best-seller flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSellerReport {
    pub model: String,
    pub macro_accuracy: f64,
    pub leaderboard: Vec<CandidateScore>,
    pub forecast: ForecastResult,
}

/// Outcome of the revenue flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub target_month: String,
    pub forecasts: Vec<RevenueForecastResult>,
}

/// Split, aggregate, weight, select a classifier, then forecast the best seller
/// from the held-out pool.
///
/// With `holdout_path` the held-out pool is written to that CSV and read back
/// before forecasting; otherwise it stays in memory.
pub fn run_best_seller<R: Rng + ?Sized>(
    transactions: &[RawTransaction],
    candidates: &[Candidate],
    holdout_path: Option<&Path>,
    rng: &mut R,
) -> Result<BestSellerReport> {
    if transactions.is_empty() {
        return Err(ForecastError::no_data("no transactions"));
    }

    let triplets: Vec<Triplet> = transactions.iter().map(RawTransaction::triplet).collect();
    let split = split_by_category(&triplets, rng);

    let training = assign_weights(aggregate(&split.train));
    info!(aggregates = training.len(), "weighted training aggregates");
    let selection = select_best(&training, candidates)?;

    let held_out = match holdout_path {
        Some(path) => {
            write_holdout_csv(path, &split.test)?;
            read_holdout_csv(path)?
        }
        None => split.test,
    };

    let forecast = forecast_best_seller(&selection, &held_out)?;
    Ok(BestSellerReport {
        model: selection.name,
        macro_accuracy: selection.macro_accuracy,
        leaderboard: selection.leaderboard,
        forecast,
    })
}

/// Fit the revenue regression on every transaction and predict `month` (1..=12).
pub fn run_revenue<T>(
    transactions: &[RawTransaction],
    trainer: &T,
    month: u32,
) -> Result<RevenueReport>
where
    T: RegressionTrainer + ?Sized,
{
    let forecaster = RevenueForecaster::fit(transactions, trainer)?;
    Ok(RevenueReport {
        target_month: format!("{month:02}"),
        forecasts: forecaster.predict_month(month)?,
    })
}
