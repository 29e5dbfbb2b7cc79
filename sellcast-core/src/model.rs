//! Sales record types flowing through the forecasting pipeline

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static MONTH_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?P<month>\d{1,2})-(?P<year>\d{4})\s*$").unwrap());

/// Calendar month + year, the only temporal granularity of the classification flow.
///
/// Displays as `MM-YYYY` ("05-2024"). Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MonthKey {
    // Field order matters: derived Ord compares year first.
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("MonthKey always holds a valid month")
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = MONTH_KEY_RE
            .captures(s)
            .ok_or_else(|| format!("invalid month key `{s}` (expected MM-YYYY)"))?;
        let month: u32 = caps["month"].parse().map_err(|_| format!("invalid month in `{s}`"))?;
        let year: i32 = caps["year"].parse().map_err(|_| format!("invalid year in `{s}`"))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in `{s}`"))
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Parse a month-of-year such as `"05"` or `"5"` into 1..=12.
pub fn parse_month_of_year(s: &str) -> Option<u32> {
    let month: u32 = s.trim().parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// One sale as read from the source dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: NaiveDate,
    pub category: String,
    /// Carried for completeness; never consumed downstream.
    pub quantity: Option<f64>,
    /// Carried for completeness; never consumed downstream.
    pub unit_price: Option<f64>,
    pub total_revenue: f64,
}

impl RawTransaction {
    /// Projection used by the best-seller flow
    pub fn triplet(&self) -> Triplet {
        Triplet {
            month: MonthKey::from_date(self.date),
            category: self.category.clone(),
            revenue: self.total_revenue,
        }
    }

    /// Projection used by the revenue flow (month-of-year only)
    pub fn revenue_sample(&self) -> RevenueSample {
        RevenueSample {
            month: self.date.month(),
            category: self.category.clone(),
            revenue: self.total_revenue,
        }
    }
}

/// (month key, category, revenue): the unit the splitter works on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triplet {
    pub month: MonthKey,
    pub category: String,
    pub revenue: f64,
}

impl Triplet {
    pub fn new(month: MonthKey, category: impl Into<String>, revenue: f64) -> Self {
        Self {
            month,
            category: category.into(),
            revenue,
        }
    }
}

/// Transaction-level sample for the revenue regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSample {
    /// Month of year, 1..=12
    pub month: u32,
    pub category: String,
    pub revenue: f64,
}

/// Summed revenue of one (month, category) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: MonthKey,
    pub category: String,
    pub total_revenue: f64,
}

impl MonthlyAggregate {
    pub fn as_triplet(&self) -> Triplet {
        Triplet::new(self.month, self.category.clone(), self.total_revenue)
    }
}

/// Training aggregate with its class-balancing weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedAggregate {
    pub aggregate: MonthlyAggregate,
    pub weight: f64,
}

/// Next month's best seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub target_month: MonthKey,
    pub predicted_category: String,
    /// Observed revenue of the row whose prediction is reported.
    pub revenue: f64,
}

/// Predicted revenue of one category for a month of year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueForecastResult {
    pub category: String,
    /// Zero-padded month of year ("05")
    pub target_month: String,
    pub predicted_revenue: f64,
}
