//! Persisted held-out dataset.
//!
//! The held-out triplets are written back out as day-level rows:
//!   Date,Category,ID,UnitsSold,Revenue
//!   2024-03-01,Electronics,HOLDOUT,0,900
//!
//! Date is the first day of the triplet's month; ID and UnitsSold are
//! placeholders. Revenue is a plain decimal, never exponent notation. Column
//! positions line up with the sales dataset, so the file is read back through
//! the same parser.

use sellcast_core::{Result, Triplet};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::parser::{csv_error, parse_sales_csv};

/// Placeholder transaction identifier written for every held-out row.
pub const PLACEHOLDER_ID: &str = "HOLDOUT";

pub const HOLDOUT_HEADER: [&str; 5] = ["Date", "Category", "ID", "UnitsSold", "Revenue"];

#[derive(Debug, Serialize)]
struct HoldoutRow<'a> {
    date: String,
    category: &'a str,
    id: &'static str,
    units_sold: u32,
    /// `f64` Display: plain decimal, shortest exact round trip
    revenue: String,
}

/// Write (overwriting) the held-out pool. The writer is flushed and closed on return.
pub fn write_holdout_csv(path: impl AsRef<Path>, triplets: &[Triplet]) -> Result<()> {
    let path = path.as_ref();
    // Header is written by hand so an empty pool still produces a valid file.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;
    wtr.write_record(HOLDOUT_HEADER).map_err(csv_error)?;

    for t in triplets {
        wtr.serialize(HoldoutRow {
            date: t.month.first_day().format("%Y-%m-%d").to_string(),
            category: &t.category,
            id: PLACEHOLDER_ID,
            units_sold: 0,
            revenue: t.revenue.to_string(),
        })
        .map_err(csv_error)?;
    }
    wtr.flush()?;

    info!(rows = triplets.len(), path = %path.display(), "wrote held-out dataset");
    Ok(())
}

/// Read the held-out pool back as triplets.
pub fn read_holdout_csv(path: impl AsRef<Path>) -> Result<Vec<Triplet>> {
    Ok(parse_sales_csv(path)?.iter().map(|t| t.triplet()).collect())
}
