//! sellcast-ingest: sales CSV parsing and the persisted held-out dataset.

pub mod holdout;
pub mod parser;

pub use holdout::{PLACEHOLDER_ID, read_holdout_csv, write_holdout_csv};
pub use parser::{parse_line, parse_record, parse_sales_csv, parse_sales_reader};
