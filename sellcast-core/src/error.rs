//! Error taxonomy shared by every sellcast crate.
//!
//! All variants are fatal: the pipeline is a batch job and nothing is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// A malformed input row (bad date, bad revenue, missing columns).
    #[error("parse error on line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// A step produced an empty set where a later step needs at least one row.
    #[error("no data: {0}")]
    NoData(String),

    /// A candidate trainer could not fit the supplied table.
    #[error("trainer `{trainer}` failed to fit: {reason}")]
    TrainerFit { trainer: String, reason: String },

    /// A month of year outside 1..=12.
    #[error("invalid target month {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    pub fn parse(line: u64, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub fn no_data(what: impl Into<String>) -> Self {
        Self::NoData(what.into())
    }

    pub fn trainer_fit(trainer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TrainerFit {
            trainer: trainer.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_line() {
        let err = ForecastError::parse(7, "expected at least 5 fields, got 4");
        assert_eq!(
            err.to_string(),
            "parse error on line 7: expected at least 5 fields, got 4"
        );
    }

    #[test]
    fn test_invalid_month_has_no_line() {
        let err = ForecastError::InvalidMonth(13);
        assert_eq!(err.to_string(), "invalid target month 13 (expected 1-12)");
    }

    #[test]
    fn test_trainer_fit_message() {
        let err = ForecastError::trainer_fit("MaxEntropy", "empty table");
        assert!(err.to_string().contains("MaxEntropy"));
        assert!(err.to_string().contains("empty table"));
    }
}
