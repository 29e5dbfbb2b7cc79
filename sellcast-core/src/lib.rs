//! sellcast-core: sales data model and the data-shaping steps of the forecaster

pub mod aggregate;
pub mod error;
pub mod model;
pub mod split;
pub mod weights;

pub use aggregate::{aggregate, earliest_month};
pub use error::{ForecastError, Result};
pub use model::{
    ForecastResult, MonthKey, MonthlyAggregate, RawTransaction, RevenueForecastResult,
    RevenueSample, Triplet, WeightedAggregate, parse_month_of_year,
};
pub use split::{Split, holdout_count, split_by_category};
pub use weights::assign_weights;
