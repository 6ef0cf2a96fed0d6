//! Tabular inputs and the UTC series container.
//!
//! This module provides:
//! - `series`: `TimeSeries`, a strictly ordered UTC-indexed `f64` series
//! - `tables`: `PriceTable` and `CurveTable` as loaded from collaborators
//! - `io`: CSV and Parquet readers for prices and curves, CSV reader for
//!   contract specifications

pub mod io;
pub mod series;
pub mod tables;

pub use io::{read_curve, read_prices, read_specs, read_specs_from_reader};
pub use series::TimeSeries;
pub use tables::{
    Cell, Column, CurveRow, CurveTable, CurveValueColumn, PriceRow, PriceTable, TimestampColumn,
    CURVE_VALUE_COLUMNS, TIMESTAMP_COLUMNS,
};
