use chrono::NaiveDate;
use sellcast_ingest::{parse_sales_csv, read_holdout_csv, write_holdout_csv};
use std::collections::HashSet;
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("data")
        .join("sales_sample.csv")
}

#[test]
fn test_parse_sample_dataset() {
    let txns = parse_sales_csv(sample_path()).expect("should parse sales_sample.csv");
    assert_eq!(txns.len(), 845);

    let first = &txns[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
    assert_eq!(first.category, "Clothing");
    assert_eq!(first.total_revenue, 99.42);

    let categories: HashSet<_> = txns.iter().map(|t| t.category.as_str()).collect();
    assert_eq!(categories.len(), 5);
    assert!(categories.contains("Electronics"));
    assert!(categories.contains("Toys"));
}

#[test]
fn test_sample_spans_two_years() {
    use chrono::Datelike;
    let txns = parse_sales_csv(sample_path()).unwrap();
    let min = txns.iter().map(|t| t.date).min().unwrap();
    let max = txns.iter().map(|t| t.date).max().unwrap();
    assert_eq!(min.year(), 2023);
    assert_eq!(max.year(), 2024);
}

#[test]
fn test_holdout_round_trip_of_sample_triplets() {
    let txns = parse_sales_csv(sample_path()).unwrap();
    let triplets: Vec<_> = txns.iter().take(50).map(|t| t.triplet()).collect();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holdout.csv");
    write_holdout_csv(&path, &triplets).unwrap();

    let back = read_holdout_csv(&path).unwrap();
    assert_eq!(back, triplets);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = parse_sales_csv("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, sellcast_core::ForecastError::Io(_)));
}
