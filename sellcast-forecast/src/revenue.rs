//! Per-category revenue forecast for a month of year.
//!
//! Fitted at transaction granularity (no aggregation): one row per sale,
//! one-hot category ++ one-hot month of year, target = the sale's revenue.

use ndarray::{Array1, Array2};
use sellcast_core::{ForecastError, RawTransaction, Result, RevenueForecastResult};
use tracing::info;

use crate::features::{LabelMap, RevenueEncoder};
use crate::trainers::{RegressionTable, RegressionTrainer, Regressor};

pub struct RevenueForecaster {
    encoder: RevenueEncoder,
    model: Box<dyn Regressor>,
}

impl RevenueForecaster {
    /// Fit one regression model on every transaction.
    pub fn fit<T>(transactions: &[RawTransaction], trainer: &T) -> Result<Self>
    where
        T: RegressionTrainer + ?Sized,
    {
        if transactions.is_empty() {
            return Err(ForecastError::no_data("no transactions to fit revenue model"));
        }

        let samples: Vec<_> = transactions.iter().map(RawTransaction::revenue_sample).collect();
        let encoder = RevenueEncoder::new(LabelMap::from_categories(
            samples.iter().map(|s| s.category.as_str()),
        ));

        let mut features = Array2::<f64>::zeros((samples.len(), encoder.width()));
        for (i, s) in samples.iter().enumerate() {
            features.row_mut(i).assign(&encoder.encode(&s.category, s.month));
        }
        let table = RegressionTable {
            features,
            targets: samples.iter().map(|s| s.revenue).collect::<Array1<f64>>(),
        };

        let model = trainer
            .fit(&table)
            .map_err(|e| ForecastError::trainer_fit("revenue regression", e.to_string()))?;
        info!(
            rows = samples.len(),
            categories = encoder.categories().len(),
            "fitted revenue model"
        );

        Ok(Self { encoder, model })
    }

    /// Categories seen during fitting, sorted.
    pub fn categories(&self) -> &[String] {
        self.encoder.categories().labels()
    }

    /// One prediction per training category for `month` (1..=12).
    pub fn predict_month(&self, month: u32) -> Result<Vec<RevenueForecastResult>> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidMonth(month));
        }
        let target_month = format!("{month:02}");

        Ok(self
            .categories()
            .iter()
            .map(|category| RevenueForecastResult {
                category: category.clone(),
                target_month: target_month.clone(),
                predicted_revenue: self.model.predict(self.encoder.encode(category, month).view()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trainers::{BoostedTreesParams, FitError, RegressorKind};
    use chrono::NaiveDate;
    use ndarray::ArrayView1;

    fn txn(date: (i32, u32, u32), category: &str, revenue: f64) -> RawTransaction {
        RawTransaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category: category.to_string(),
            quantity: None,
            unit_price: None,
            total_revenue: revenue,
        }
    }

    fn transactions() -> Vec<RawTransaction> {
        vec![
            txn((2024, 1, 3), "Electronics", 500.0),
            txn((2024, 1, 9), "Electronics", 520.0),
            txn((2024, 5, 2), "Electronics", 480.0),
            txn((2024, 2, 14), "Furniture", 900.0),
            txn((2024, 5, 20), "Furniture", 950.0),
        ]
    }

    #[test]
    fn test_one_result_per_training_category() {
        let trainer = RegressorKind::BoostedTrees(BoostedTreesParams::default());
        let forecaster = RevenueForecaster::fit(&transactions(), &trainer).unwrap();
        let results = forecaster.predict_month(5).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].category, "Electronics");
        assert_eq!(results[1].category, "Furniture");
        assert!(results.iter().all(|r| r.target_month == "05"));
        assert!(results[1].predicted_revenue > results[0].predicted_revenue);
    }

    #[test]
    fn test_rare_category_still_predicted() {
        let mut data = transactions();
        data.push(txn((2023, 7, 1), "Toys", 15.0));
        let trainer = RegressorKind::BoostedTrees(BoostedTreesParams::default());
        let forecaster = RevenueForecaster::fit(&data, &trainer).unwrap();
        let results = forecaster.predict_month(12).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().any(|r| r.category == "Toys"));
    }

    #[test]
    fn test_invalid_month() {
        let trainer = RegressorKind::BoostedTrees(BoostedTreesParams::default());
        let forecaster = RevenueForecaster::fit(&transactions(), &trainer).unwrap();
        assert!(matches!(forecaster.predict_month(0), Err(ForecastError::InvalidMonth(0))));
        assert!(matches!(forecaster.predict_month(13), Err(ForecastError::InvalidMonth(13))));
    }

    #[test]
    fn test_empty_is_no_data() {
        let trainer = RegressorKind::BoostedTrees(BoostedTreesParams::default());
        assert!(matches!(
            RevenueForecaster::fit(&[], &trainer),
            Err(ForecastError::NoData(_))
        ));
    }

    struct Broken;

    impl RegressionTrainer for Broken {
        fn fit(&self, _: &RegressionTable) -> std::result::Result<Box<dyn Regressor>, FitError> {
            Err(FitError::NonFinite("targets"))
        }
    }

    struct Flat;

    impl Regressor for Flat {
        fn predict(&self, _: ArrayView1<'_, f64>) -> f64 {
            42.0
        }
    }

    struct FlatTrainer;

    impl RegressionTrainer for FlatTrainer {
        fn fit(&self, _: &RegressionTable) -> std::result::Result<Box<dyn Regressor>, FitError> {
            Ok(Box::new(Flat))
        }
    }

    #[test]
    fn test_trainer_failure_is_fatal() {
        assert!(matches!(
            RevenueForecaster::fit(&transactions(), &Broken),
            Err(ForecastError::TrainerFit { .. })
        ));
    }

    #[test]
    fn test_uses_injected_trainer() {
        let forecaster = RevenueForecaster::fit(&transactions(), &FlatTrainer).unwrap();
        let results = forecaster.predict_month(3).unwrap();
        assert!(results.iter().all(|r| r.predicted_revenue == 42.0));
    }
}
