//! Result flattening and CSV or Parquet report export.

pub mod tables;

pub use tables::{write_report, ReportRecord, ValuationRow};
