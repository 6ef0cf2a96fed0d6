//! Flat report rows and CSV or Parquet export.
//!
//! [`ValuationRow`] carries every documented field of a `ValuationResult`,
//! metadata included, as scalar columns. Row types implementing
//! [`ReportRecord`] can be written with [`write_report`]; batch rows are
//! exported the same way. Both formats use the same column order.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use ftr_core::types::{FtrError, ValuationMetadata, ValuationResult};
use parquet::arrow::arrow_writer::ArrowWriter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pricing::BatchRow;

/// A flat row type with a columnar form.
///
/// Columns must follow the `Serialize` field order so that CSV and Parquet
/// reports share a header.
pub trait ReportRecord: Serialize + Sized {
    /// Named, typed columns holding `rows`.
    fn report_columns(rows: &[Self]) -> Vec<(Field, ArrayRef)>;
}

fn text_column<R>(name: &str, rows: &[R], value: impl Fn(&R) -> &str) -> (Field, ArrayRef) {
    let array = StringArray::from_iter_values(rows.iter().map(value));
    (Field::new(name, DataType::Utf8, false), Arc::new(array))
}

fn optional_text_column<R>(
    name: &str,
    rows: &[R],
    value: impl Fn(&R) -> Option<&str>,
) -> (Field, ArrayRef) {
    let array: StringArray = rows.iter().map(value).collect();
    (Field::new(name, DataType::Utf8, true), Arc::new(array))
}

fn number_column<R>(name: &str, rows: &[R], value: impl Fn(&R) -> f64) -> (Field, ArrayRef) {
    let array = Float64Array::from_iter_values(rows.iter().map(value));
    (Field::new(name, DataType::Float64, false), Arc::new(array))
}

fn count_column<R>(name: &str, rows: &[R], value: impl Fn(&R) -> usize) -> (Field, ArrayRef) {
    let array = UInt64Array::from_iter_values(rows.iter().map(|row| value(row) as u64));
    (Field::new(name, DataType::UInt64, false), Arc::new(array))
}

fn instant_column<R>(
    name: &str,
    rows: &[R],
    value: impl Fn(&R) -> DateTime<Utc>,
) -> (Field, ArrayRef) {
    let micros = rows.iter().map(|row| value(row).timestamp_micros());
    let array = TimestampMicrosecondArray::from_iter_values(micros).with_timezone("UTC");
    let data_type = DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()));
    (Field::new(name, data_type, false), Arc::new(array))
}

/// One valuation as a flat record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationRow {
    /// Contract identifier
    pub contract_id: Option<String>,
    /// Fair value
    pub price: f64,
    /// Reporting currency
    pub currency: String,
    /// Mean scenario payoff
    pub mean_payoff: f64,
    /// Population standard deviation of scenario payoffs
    pub stdev_payoff: f64,
    /// 5th percentile
    pub p5_payoff: f64,
    /// 95th percentile
    pub p95_payoff: f64,
    /// Scenario count
    pub n_scenarios: usize,
    /// Model name
    pub model: String,
    /// Data version
    pub data_version: String,
    /// Contract hours
    pub hours: usize,
    /// Historical spread mean
    pub spread_mean: f64,
    /// Curve mean over contract hours
    pub curve_mean: f64,
}

impl From<&ValuationResult> for ValuationRow {
    fn from(result: &ValuationResult) -> Self {
        Self {
            contract_id: result.contract_id.clone(),
            price: result.price,
            currency: result.currency.clone(),
            mean_payoff: result.mean_payoff,
            stdev_payoff: result.stdev_payoff,
            p5_payoff: result.p5_payoff,
            p95_payoff: result.p95_payoff,
            n_scenarios: result.n_scenarios,
            model: result.model.clone(),
            data_version: result.data_version.clone(),
            hours: result.metadata.hours,
            spread_mean: result.metadata.spread_mean,
            curve_mean: result.metadata.curve_mean,
        }
    }
}

impl From<ValuationRow> for ValuationResult {
    fn from(row: ValuationRow) -> Self {
        ValuationResult {
            contract_id: row.contract_id,
            price: row.price,
            currency: row.currency,
            mean_payoff: row.mean_payoff,
            stdev_payoff: row.stdev_payoff,
            p5_payoff: row.p5_payoff,
            p95_payoff: row.p95_payoff,
            n_scenarios: row.n_scenarios,
            model: row.model,
            data_version: row.data_version,
            metadata: ValuationMetadata {
                hours: row.hours,
                spread_mean: row.spread_mean,
                curve_mean: row.curve_mean,
            },
        }
    }
}

impl ReportRecord for ValuationRow {
    fn report_columns(rows: &[Self]) -> Vec<(Field, ArrayRef)> {
        vec![
            optional_text_column("contract_id", rows, |r| r.contract_id.as_deref()),
            number_column("price", rows, |r| r.price),
            text_column("currency", rows, |r| r.currency.as_str()),
            number_column("mean_payoff", rows, |r| r.mean_payoff),
            number_column("stdev_payoff", rows, |r| r.stdev_payoff),
            number_column("p5_payoff", rows, |r| r.p5_payoff),
            number_column("p95_payoff", rows, |r| r.p95_payoff),
            count_column("n_scenarios", rows, |r| r.n_scenarios),
            text_column("model", rows, |r| r.model.as_str()),
            text_column("data_version", rows, |r| r.data_version.as_str()),
            count_column("hours", rows, |r| r.hours),
            number_column("spread_mean", rows, |r| r.spread_mean),
            number_column("curve_mean", rows, |r| r.curve_mean),
        ]
    }
}

impl ReportRecord for BatchRow {
    fn report_columns(rows: &[Self]) -> Vec<(Field, ArrayRef)> {
        vec![
            optional_text_column("contract_id", rows, |r| r.contract_id.as_deref()),
            text_column("source", rows, |r| r.source.as_str()),
            text_column("sink", rows, |r| r.sink.as_str()),
            instant_column("start_utc", rows, |r| r.start_utc),
            instant_column("end_utc", rows, |r| r.end_utc),
            number_column("mw", rows, |r| r.mw),
            text_column("contract_type", rows, |r| r.contract_type.as_str()),
            number_column("price", rows, |r| r.price),
            text_column("currency", rows, |r| r.currency.as_str()),
            number_column("mean_payoff", rows, |r| r.mean_payoff),
            number_column("stdev_payoff", rows, |r| r.stdev_payoff),
            number_column("p5_payoff", rows, |r| r.p5_payoff),
            number_column("p95_payoff", rows, |r| r.p95_payoff),
            count_column("n_scenarios", rows, |r| r.n_scenarios),
            text_column("model", rows, |r| r.model.as_str()),
            text_column("data_version", rows, |r| r.data_version.as_str()),
            count_column("hours", rows, |r| r.hours),
            number_column("spread_mean", rows, |r| r.spread_mean),
            number_column("curve_mean", rows, |r| r.curve_mean),
        ]
    }
}

fn write_csv<R: Serialize>(rows: &[R], path: &Path) -> Result<(), FtrError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet<R: ReportRecord>(rows: &[R], path: &Path) -> Result<(), FtrError> {
    let (fields, columns): (Vec<Field>, Vec<ArrayRef>) =
        R::report_columns(rows).into_iter().unzip();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Writes rows as a report and returns the path.
///
/// A `.parquet` path gets a single-row-group Parquet file; any other path
/// gets CSV with a header line.
///
/// # Errors
///
/// `FtrError::Io` when the file cannot be created; CSV, Arrow or Parquet
/// encoding errors as `FtrError::Data`.
pub fn write_report<R: ReportRecord>(rows: &[R], path: &Path) -> Result<PathBuf, FtrError> {
    let parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if parquet {
        write_parquet(rows, path)?;
    } else {
        write_csv(rows, path)?;
    }
    debug!(path = %path.display(), rows = rows.len(), parquet, "wrote report");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{Float64Type, UInt64Type};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn result() -> ValuationResult {
        ValuationResult {
            contract_id: Some("FTR-7".to_string()),
            price: -15.0,
            currency: "EUR".to_string(),
            mean_payoff: -15.0,
            stdev_payoff: 0.0,
            p5_payoff: -15.0,
            p95_payoff: -15.0,
            n_scenarios: 1,
            model: "hs".to_string(),
            data_version: "deadbeef".to_string(),
            metadata: ValuationMetadata {
                hours: 3,
                spread_mean: 0.0,
                curve_mean: -5.0,
            },
        }
    }

    #[test]
    fn test_row_keeps_every_field() {
        let original = result();
        let row = ValuationRow::from(&original);
        assert_eq!(row.hours, 3);
        assert_eq!(row.curve_mean, -5.0);
        assert_eq!(ValuationResult::from(row), original);
    }

    #[test]
    fn test_csv_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let rows = vec![ValuationRow::from(&result())];
        write_report(&rows, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("contract_id,price,currency,mean_payoff"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let back: Vec<ValuationRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(back, rows);
    }

    fn read_parquet(path: &Path) -> RecordBatch {
        let file = File::open(path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(batches.len(), 1);
        batches.into_iter().next().unwrap()
    }

    #[test]
    fn test_parquet_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.parquet");
        let unnamed = ValuationRow {
            contract_id: None,
            price: 2.5,
            ..ValuationRow::from(&result())
        };
        let rows = vec![ValuationRow::from(&result()), unnamed];
        write_report(&rows, &path).unwrap();

        let batch = read_parquet(&path);
        assert_eq!(batch.num_rows(), 2);
        let names: Vec<&str> = batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        let csv_header = "contract_id,price,currency,mean_payoff,stdev_payoff,p5_payoff,\
                          p95_payoff,n_scenarios,model,data_version,hours,spread_mean,curve_mean";
        assert_eq!(names.join(","), csv_header);

        let ids = batch.column(0).as_string::<i32>();
        assert_eq!(ids.value(0), "FTR-7");
        assert!(ids.is_null(1));
        let prices = batch.column(1).as_primitive::<Float64Type>();
        assert_eq!(prices.value(0), -15.0);
        assert_eq!(prices.value(1), 2.5);
        let hours = batch.column(10).as_primitive::<UInt64Type>();
        assert_eq!(hours.value(0), 3);
        let versions = batch.column(9).as_string::<i32>();
        assert_eq!(versions.value(1), "deadbeef");
    }

    #[test]
    fn test_empty_parquet_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        write_report::<ValuationRow>(&[], &path).unwrap();
        let file = File::open(&path).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        assert_eq!(builder.schema().fields().len(), 13);
    }
}
