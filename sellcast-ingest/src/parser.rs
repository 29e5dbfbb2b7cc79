//! Sales CSV parser.
//!
//! Expected columns (header row ignored):
//!   Date,Category,Quantity,UnitPrice,TotalRevenue
//!   2024-05-03,Electronics,2,149.99,299.98
//!
//! Parsing is fail-fast: the first malformed row aborts ingestion.

use chrono::{NaiveDate, NaiveDateTime};
use sellcast_core::{ForecastError, RawTransaction, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Minimum number of comma-separated fields in a data row.
pub const MIN_FIELDS: usize = 5;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn csv_error(err: csv::Error) -> ForecastError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(e) => ForecastError::Io(e),
        other => ForecastError::parse(line, format!("{other:?}")),
    }
}

/// Parse one CSV record (already split into fields) into a transaction.
pub fn parse_record(record: &csv::StringRecord, line: u64) -> Result<RawTransaction> {
    if record.len() < MIN_FIELDS {
        return Err(ForecastError::parse(
            line,
            format!("expected at least {MIN_FIELDS} fields, got {}", record.len()),
        ));
    }

    let date_str = record.get(0).unwrap_or("");
    let date = parse_date(date_str)
        .ok_or_else(|| ForecastError::parse(line, format!("invalid date `{}`", date_str.trim())))?;

    let revenue_str = record.get(4).unwrap_or("");
    let total_revenue = parse_decimal(revenue_str).ok_or_else(|| {
        ForecastError::parse(line, format!("invalid total revenue `{}`", revenue_str.trim()))
    })?;

    Ok(RawTransaction {
        date,
        category: record.get(1).unwrap_or("").trim().to_string(),
        quantity: record.get(2).and_then(parse_decimal),
        unit_price: record.get(3).and_then(parse_decimal),
        total_revenue,
    })
}

/// Parse a single comma-separated line. `line` is reported in errors.
pub fn parse_line(text: &str, line: u64) -> Result<RawTransaction> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut record = csv::StringRecord::new();
    let found = rdr.read_record(&mut record).map_err(csv_error)?;
    if !found {
        return Err(ForecastError::parse(line, "empty line"));
    }
    parse_record(&record, line)
}

/// Parse a sales dataset from any reader. The first row is a header and is skipped.
pub fn parse_sales_reader<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut txns = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let txn = parse_record(&record, line)?;
        debug!(line, category = %txn.category, revenue = txn.total_revenue, "parsed row");
        txns.push(txn);
    }

    Ok(txns)
}

/// Parse a sales CSV file.
pub fn parse_sales_csv(path: impl AsRef<Path>) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let txns = parse_sales_reader(file)?;
    info!(rows = txns.len(), path = %path.display(), "parsed sales dataset");
    Ok(txns)
}
