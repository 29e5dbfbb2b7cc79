//! sellcast-forecast: trainers, model selection, and the two forecast flows

pub mod category;
pub mod features;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod revenue;
pub mod trainers;

pub use category::{CategoryPredictor, forecast_best_seller};
pub use orchestrator::{Candidate, CandidateScore, Selection, default_candidates, select_best};
pub use pipeline::{BestSellerReport, RevenueReport, run_best_seller, run_revenue};
pub use revenue::RevenueForecaster;
pub use trainers::{ClassifierKind, RegressorKind, TrainerParams};
