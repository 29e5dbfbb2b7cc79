//! Next month's best seller from the held-out pool.

use sellcast_core::{
    ForecastError, ForecastResult, MonthKey, Result, Triplet, aggregate, earliest_month,
};
use tracing::{debug, info};

use crate::orchestrator::Selection;

/// Anything that maps a (month, revenue) record to a category name.
pub trait CategoryPredictor {
    fn predict_category(&self, month: MonthKey, revenue: f64) -> String;
}

impl CategoryPredictor for Selection {
    fn predict_category(&self, month: MonthKey, revenue: f64) -> String {
        Selection::predict_category(self, month, revenue).to_string()
    }
}

impl<F> CategoryPredictor for F
where
    F: Fn(MonthKey, f64) -> String,
{
    fn predict_category(&self, month: MonthKey, revenue: f64) -> String {
        self(month, revenue)
    }
}

/// Re-aggregate the held-out pool, take its earliest month, and report the
/// predicted category of that month's highest-revenue row.
///
/// The reported category is the model's prediction for the row, which need
/// not be the row's own category. Revenue ties keep the first row in
/// (month, category) order.
pub fn forecast_best_seller<P>(predictor: &P, held_out: &[Triplet]) -> Result<ForecastResult>
where
    P: CategoryPredictor + ?Sized,
{
    let rows = aggregate(held_out);
    let next_month =
        earliest_month(&rows).ok_or_else(|| ForecastError::no_data("held-out pool is empty"))?;

    let best = rows
        .iter()
        .filter(|r| r.month == next_month)
        .map(|r| {
            let predicted = predictor.predict_category(r.month, r.total_revenue);
            debug!(
                category = %r.category,
                predicted = %predicted,
                revenue = r.total_revenue,
                "held-out prediction"
            );
            (predicted, r.total_revenue)
        })
        .fold(None::<(String, f64)>, |best, (predicted, revenue)| match best {
            Some(b) if revenue <= b.1 => Some(b),
            _ => Some((predicted, revenue)),
        })
        .ok_or_else(|| ForecastError::no_data(format!("no held-out rows for {next_month}")))?;

    info!(month = %next_month, category = %best.0, revenue = best.1, "forecast best seller");
    Ok(ForecastResult {
        target_month: next_month,
        predicted_category: best.0,
        revenue: best.1,
    })
}
