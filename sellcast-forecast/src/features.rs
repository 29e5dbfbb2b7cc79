//! Feature encoding shared by the trainers.
//!
//! Classification rows: one-hot month key ++ raw revenue, min-max normalized.
//! Regression rows: one-hot category ++ one-hot month of year.

use ndarray::{Array1, Array2};
use sellcast_core::{MonthKey, WeightedAggregate};
use std::collections::BTreeSet;

use crate::trainers::TrainingTable;

/// Number of month-of-year slots in the regression encoding.
pub const MONTHS_PER_YEAR: usize = 12;

/// Category <-> class index, in sorted category order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    pub fn from_categories<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let set: BTreeSet<&str> = categories.into_iter().collect();
        Self {
            labels: set.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(category)).ok()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Per-column min-max scaling fitted on the training matrix.
///
/// Constant columns map to 0. Values outside the fitted range are not clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    range: Array1<f64>,
}

impl MinMaxScaler {
    pub fn fit(x: &Array2<f64>) -> Self {
        let cols = x.ncols();
        let mut min = Array1::from_elem(cols, f64::INFINITY);
        let mut max = Array1::from_elem(cols, f64::NEG_INFINITY);
        for row in x.rows() {
            for (j, &v) in row.iter().enumerate() {
                min[j] = min[j].min(v);
                max[j] = max[j].max(v);
            }
        }
        if x.nrows() == 0 {
            min.fill(0.0);
            max.fill(0.0);
        }
        let range = &max - &min;
        Self { min, range }
    }

    pub fn transform_row(&self, row: &Array1<f64>) -> Array1<f64> {
        Array1::from_shape_fn(row.len(), |j| {
            if self.range[j] > 0.0 {
                (row[j] - self.min[j]) / self.range[j]
            } else {
                0.0
            }
        })
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        Array2::from_shape_fn(x.dim(), |(i, j)| {
            if self.range[j] > 0.0 {
                (x[[i, j]] - self.min[j]) / self.range[j]
            } else {
                0.0
            }
        })
    }
}

/// Encoder for (month key, revenue) rows of the best-seller classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationEncoder {
    months: Vec<MonthKey>,
    scaler: MinMaxScaler,
}

impl ClassificationEncoder {
    /// Fit the vocabulary and scaler on the training rows and return the
    /// normalized training table alongside the encoder.
    pub fn fit(rows: &[WeightedAggregate], labels: &LabelMap) -> (Self, TrainingTable) {
        let months: Vec<MonthKey> = rows
            .iter()
            .map(|r| r.aggregate.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let width = months.len() + 1;
        let mut raw = Array2::<f64>::zeros((rows.len(), width));
        for (i, r) in rows.iter().enumerate() {
            raw.row_mut(i)
                .assign(&raw_row(&months, r.aggregate.month, r.aggregate.total_revenue));
        }

        let scaler = MinMaxScaler::fit(&raw);
        let features = scaler.transform(&raw);
        let table = TrainingTable {
            features,
            labels: rows
                .iter()
                .map(|r| labels.index_of(&r.aggregate.category).unwrap_or(0))
                .collect(),
            weights: Some(rows.iter().map(|r| r.weight).collect()),
            n_classes: labels.len(),
        };

        (Self { months, scaler }, table)
    }

    /// Encode one (month, revenue) record. Months unseen in training get an
    /// all-zero one-hot block.
    pub fn encode(&self, month: MonthKey, revenue: f64) -> Array1<f64> {
        self.scaler.transform_row(&raw_row(&self.months, month, revenue))
    }

    #[cfg(test)]
    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }
}

fn raw_row(months: &[MonthKey], month: MonthKey, revenue: f64) -> Array1<f64> {
    let mut row = Array1::<f64>::zeros(months.len() + 1);
    if let Ok(slot) = months.binary_search(&month) {
        row[slot] = 1.0;
    }
    row[months.len()] = revenue;
    row
}

/// Encoder for (category, month of year) rows of the revenue regression
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueEncoder {
    categories: LabelMap,
}

impl RevenueEncoder {
    pub fn new(categories: LabelMap) -> Self {
        Self { categories }
    }

    pub fn width(&self) -> usize {
        self.categories.len() + MONTHS_PER_YEAR
    }

    /// `month` is 1..=12; out-of-range months and unknown categories leave
    /// their one-hot block empty.
    pub fn encode(&self, category: &str, month: u32) -> Array1<f64> {
        let mut row = Array1::<f64>::zeros(self.width());
        if let Some(idx) = self.categories.index_of(category) {
            row[idx] = 1.0;
        }
        if (1..=MONTHS_PER_YEAR as u32).contains(&month) {
            row[self.categories.len() + month as usize - 1] = 1.0;
        }
        row
    }

    pub fn categories(&self) -> &LabelMap {
        &self.categories
    }
}
