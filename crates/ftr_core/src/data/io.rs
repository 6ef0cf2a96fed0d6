//! Readers for prices, curves and contract specifications.
//!
//! Prices and curves are read from comma-separated files with a header row,
//! or from Parquet when the path ends in `.parquet`. Contract specifications
//! are CSV only.
//!
//! Tables keep every column in header order, extra columns included, and
//! each timestamp cell's text, so a content hash sees everything that was
//! read.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::data::tables::{
    Cell, Column, CurveRow, CurveTable, CurveValueColumn, PriceRow, PriceTable, TimestampColumn,
    CURVE_VALUE_COLUMNS, TIMESTAMP_COLUMNS,
};
use crate::types::contract::ContractSpecRecord;
use crate::types::error::DataError;
use crate::types::time::RawTimestamp;

/// On-disk table format, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Csv,
    Parquet,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Format::Parquet,
            _ => Format::Csv,
        }
    }
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|e| DataError::io(path, e))
}

/// Assigns a role to every header, first match wins.
fn resolve_layout(
    headers: &[String],
    table: &'static str,
    with_node: bool,
    value_name: &'static str,
) -> Result<(TimestampColumn, Vec<Column>), DataError> {
    let timestamp_column = TimestampColumn::pick(headers.iter().map(|h| h.trim())).ok_or_else(
        || DataError::MissingColumn {
            table,
            candidates: TIMESTAMP_COLUMNS.to_vec(),
        },
    )?;

    let (mut seen_ts, mut seen_node, mut seen_value) = (false, false, false);
    let mut layout = Vec::with_capacity(headers.len());
    for header in headers {
        let name = header.trim();
        let column = if !seen_ts && name == timestamp_column.as_str() {
            seen_ts = true;
            Column::Timestamp
        } else if with_node && !seen_node && name == "node" {
            seen_node = true;
            Column::Node
        } else if !seen_value && name == value_name {
            seen_value = true;
            Column::Value
        } else {
            Column::Extra(header.clone())
        };
        layout.push(column);
    }

    if with_node && !seen_node {
        return Err(DataError::MissingColumn {
            table,
            candidates: vec!["node"],
        });
    }
    if !seen_value {
        return Err(DataError::MissingColumn {
            table,
            candidates: vec![value_name],
        });
    }
    Ok((timestamp_column, layout))
}

fn curve_value_column(headers: &[String]) -> Result<CurveValueColumn, DataError> {
    CurveValueColumn::pick(headers.iter().map(|h| h.trim())).ok_or_else(|| {
        DataError::MissingColumn {
            table: "curve",
            candidates: CURVE_VALUE_COLUMNS.to_vec(),
        }
    })
}

/// Parses a numeric cell; an empty cell is a missing value.
fn parse_value(cell: &str, column: &str, line: u64) -> Result<f64, DataError> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>()
        .map_err(|_| DataError::Csv(format!("invalid {} value '{}' on line {}", column, cell, line)))
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// One input row with its cells sorted by role.
struct RowCells {
    timestamp: String,
    node: String,
    value: f64,
    extra: Vec<String>,
}

impl RowCells {
    fn new() -> Self {
        Self {
            timestamp: String::new(),
            node: String::new(),
            value: f64::NAN,
            extra: Vec::new(),
        }
    }

    fn set(&mut self, column: &Column, cell: Cell<'_>) {
        match (column, cell) {
            (Column::Timestamp, Cell::Text(text)) => self.timestamp = text.to_string(),
            (Column::Node, Cell::Text(text)) => self.node = text.trim().to_string(),
            (Column::Value, Cell::Number(value)) => self.value = value,
            (Column::Extra(_), Cell::Text(text)) => self.extra.push(text.to_string()),
            _ => {}
        }
    }

    fn into_price_row(self) -> Result<PriceRow, DataError> {
        Ok(PriceRow {
            timestamp: RawTimestamp::parse(&self.timestamp)?,
            timestamp_text: self.timestamp,
            node: self.node,
            price: self.value,
            extra: self.extra,
        })
    }

    fn into_curve_row(self) -> Result<CurveRow, DataError> {
        Ok(CurveRow {
            timestamp: RawTimestamp::parse(&self.timestamp)?,
            timestamp_text: self.timestamp,
            value: self.value,
            extra: self.extra,
        })
    }
}

fn header_names(headers: &csv::StringRecord) -> Vec<String> {
    headers.iter().map(str::to_string).collect()
}

fn csv_cells<R: Read>(
    rdr: &mut csv::Reader<R>,
    layout: &[Column],
    value_name: &str,
) -> Result<Vec<RowCells>, DataError> {
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = line_of(&record);
        let mut cells = RowCells::new();
        for (column, text) in layout.iter().zip(record.iter()) {
            let cell = match column {
                Column::Value => Cell::Number(parse_value(text, value_name, line)?),
                _ => Cell::Text(text),
            };
            cells.set(column, cell);
        }
        rows.push(cells);
    }
    Ok(rows)
}

/// A Parquet column cast to the type its role needs.
enum ColumnData {
    Text(StringArray),
    Number(Float64Array),
}

impl ColumnData {
    fn decode(column: &Column, array: &ArrayRef) -> Result<Self, DataError> {
        let decoded = match column {
            Column::Value => cast(array.as_ref(), &DataType::Float64)?
                .as_primitive_opt::<Float64Type>()
                .cloned()
                .map(ColumnData::Number),
            _ => cast(array.as_ref(), &DataType::Utf8)?
                .as_string_opt::<i32>()
                .cloned()
                .map(ColumnData::Text),
        };
        decoded.ok_or_else(|| {
            DataError::Parquet(format!("cannot decode {} column", array.data_type()))
        })
    }

    fn cell(&self, index: usize) -> Cell<'_> {
        match self {
            ColumnData::Text(array) if array.is_null(index) => Cell::Text(""),
            ColumnData::Text(array) => Cell::Text(array.value(index)),
            ColumnData::Number(array) if array.is_null(index) => Cell::Number(f64::NAN),
            ColumnData::Number(array) => Cell::Number(array.value(index)),
        }
    }
}

/// Reads every record batch of a Parquet file with its column names.
fn read_parquet(path: &Path) -> Result<(Vec<String>, Vec<RecordBatch>), DataError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
    Ok((headers, batches))
}

fn parquet_cells(batches: &[RecordBatch], layout: &[Column]) -> Result<Vec<RowCells>, DataError> {
    let mut rows = Vec::new();
    for batch in batches {
        let columns = layout
            .iter()
            .zip(batch.columns())
            .map(|(column, array)| ColumnData::decode(column, array))
            .collect::<Result<Vec<_>, _>>()?;
        for index in 0..batch.num_rows() {
            let mut cells = RowCells::new();
            for (column, data) in layout.iter().zip(&columns) {
                cells.set(column, data.cell(index));
            }
            rows.push(cells);
        }
    }
    Ok(rows)
}

impl PriceTable {
    /// Reads a price table from CSV text.
    ///
    /// # Errors
    ///
    /// `DataError::MissingColumn` when the timestamp, `node` or `price`
    /// column is absent; `DataError::InvalidTimestamp` or `DataError::Csv`
    /// for malformed cells.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = header_names(rdr.headers()?);
        let (column, layout) = resolve_layout(&headers, "prices", true, "price")?;
        let rows = csv_cells(&mut rdr, &layout, "price")?;
        Self::from_cells(column, layout, rows)
    }

    fn from_parquet_file(path: &Path) -> Result<Self, DataError> {
        let (headers, batches) = read_parquet(path)?;
        let (column, layout) = resolve_layout(&headers, "prices", true, "price")?;
        let rows = parquet_cells(&batches, &layout)?;
        Self::from_cells(column, layout, rows)
    }

    fn from_cells(
        column: TimestampColumn,
        layout: Vec<Column>,
        rows: Vec<RowCells>,
    ) -> Result<Self, DataError> {
        let mut table = PriceTable::default()
            .with_timestamp_column(column)
            .with_layout(layout);
        for cells in rows {
            table.push_row(cells.into_price_row()?);
        }
        Ok(table)
    }
}

impl CurveTable {
    /// Reads a forward curve from CSV text.
    ///
    /// The value column is `spread` if present, otherwise `expected_spread`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = header_names(rdr.headers()?);
        let value_column = curve_value_column(&headers)?;
        let (column, layout) = resolve_layout(&headers, "curve", false, value_column.as_str())?;
        let rows = csv_cells(&mut rdr, &layout, value_column.as_str())?;
        Self::from_cells(column, value_column, layout, rows)
    }

    fn from_parquet_file(path: &Path) -> Result<Self, DataError> {
        let (headers, batches) = read_parquet(path)?;
        let value_column = curve_value_column(&headers)?;
        let (column, layout) = resolve_layout(&headers, "curve", false, value_column.as_str())?;
        let rows = parquet_cells(&batches, &layout)?;
        Self::from_cells(column, value_column, layout, rows)
    }

    fn from_cells(
        column: TimestampColumn,
        value_column: CurveValueColumn,
        layout: Vec<Column>,
        rows: Vec<RowCells>,
    ) -> Result<Self, DataError> {
        let mut table = CurveTable::default()
            .with_timestamp_column(column)
            .with_value_column(value_column)
            .with_layout(layout);
        for cells in rows {
            table.push_row(cells.into_curve_row()?);
        }
        Ok(table)
    }
}

/// Reads contract specification records from CSV text.
///
/// Extra columns are ignored; `contract_type` and `contract_id` may be
/// absent or empty.
pub fn read_specs_from_reader<R: Read>(reader: R) -> Result<Vec<ContractSpecRecord>, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for record in rdr.deserialize::<ContractSpecRecord>() {
        let mut record = record?;
        record.contract_type = record.contract_type.filter(|s| !s.trim().is_empty());
        record.contract_id = record.contract_id.filter(|s| !s.trim().is_empty());
        records.push(record);
    }
    Ok(records)
}

/// Reads a price table from a CSV or Parquet file.
///
/// # Errors
///
/// `DataError::Io` when the file cannot be opened, `DataError::Parquet` for
/// an undecodable Parquet file, plus the column and cell errors of
/// [`PriceTable::from_csv_reader`].
///
/// # Examples
///
/// ```no_run
/// use ftr_core::data::read_prices;
///
/// let prices = read_prices("data/prices.parquet")?;
/// println!("{} rows across {:?}", prices.len(), prices.nodes());
/// # Ok::<(), ftr_core::types::DataError>(())
/// ```
pub fn read_prices(path: impl AsRef<Path>) -> Result<PriceTable, DataError> {
    let path = path.as_ref();
    match Format::of(path) {
        Format::Parquet => PriceTable::from_parquet_file(path),
        Format::Csv => PriceTable::from_csv_reader(open(path)?),
    }
}

/// Reads a forward curve from a CSV or Parquet file.
pub fn read_curve(path: impl AsRef<Path>) -> Result<CurveTable, DataError> {
    let path = path.as_ref();
    match Format::of(path) {
        Format::Parquet => CurveTable::from_parquet_file(path),
        Format::Csv => CurveTable::from_csv_reader(open(path)?),
    }
}

/// Reads contract specification records from a CSV file.
///
/// # Errors
///
/// `DataError::UnsupportedFormat` for a `.parquet` path.
pub fn read_specs(path: impl AsRef<Path>) -> Result<Vec<ContractSpecRecord>, DataError> {
    let path = path.as_ref();
    if Format::of(path) == Format::Parquet {
        return Err(DataError::UnsupportedFormat(path.display().to_string()));
    }
    read_specs_from_reader(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::time::parse_datetime_utc;
    use arrow::array::TimestampNanosecondArray;
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use parquet::arrow::arrow_writer::ArrowWriter;
    use std::sync::Arc;

    const BASE_NS: i64 = 1_704_067_200_000_000_000;
    const HOUR_NS: i64 = 3_600_000_000_000;

    fn write_parquet(path: &Path, fields: Vec<Field>, columns: Vec<ArrayRef>) {
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_prices_with_plain_timestamp_column() {
        let csv = "timestamp,node,price\n2024-01-01 00:00,FR,50.0\n2024-01-01 01:00,FR,\n";
        let table = PriceTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.timestamp_column(), TimestampColumn::Timestamp);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].price, 50.0);
        assert!(table.rows()[1].price.is_nan());
        assert!(table.rows()[0].timestamp.is_naive());
    }

    #[test]
    fn test_prices_keep_header_order_and_extras() {
        let csv = "node,unit,timestamp_utc,price\nFR,EUR,2024-01-01T00:00:00Z,50\n";
        let table = PriceTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.columns(), ["node", "unit", "timestamp_utc", "price"]);
        let row = &table.rows()[0];
        assert_eq!(row.extra, vec!["EUR".to_string()]);
        assert_eq!(row.timestamp_text, "2024-01-01T00:00:00Z");
        assert_eq!(row.node, "FR");
    }

    #[test]
    fn test_second_timestamp_column_is_extra() {
        let csv = "timestamp,timestamp_utc,node,price\n\
                   2024-01-01 01:00,2024-01-01T00:00:00Z,FR,1\n";
        let table = PriceTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.timestamp_column(), TimestampColumn::TimestampUtc);
        assert_eq!(table.layout()[0], Column::Extra("timestamp".to_string()));
        assert!(!table.rows()[0].timestamp.is_naive());
    }

    #[test]
    fn test_prices_missing_timestamp_column() {
        let csv = "time,node,price\n2024-01-01,FR,1\n";
        let err = PriceTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingColumn {
                table: "prices",
                candidates: vec!["timestamp_utc", "timestamp"],
            }
        );
    }

    #[test]
    fn test_prices_missing_node_column() {
        let csv = "timestamp_utc,zone,price\n2024-01-01T00:00:00Z,FR,1\n";
        let err = PriceTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("node"));
    }

    #[test]
    fn test_prices_invalid_number() {
        let csv = "timestamp_utc,node,price\n2024-01-01T00:00:00Z,FR,abc\n";
        let err = PriceTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }

    #[test]
    fn test_curve_prefers_spread_column() {
        let csv = "timestamp_utc,expected_spread,spread\n2024-01-01T00:00:00Z,1.0,2.0\n";
        let curve = CurveTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(curve.value_column(), CurveValueColumn::Spread);
        assert_eq!(curve.rows()[0].value, 2.0);
        assert_eq!(curve.rows()[0].extra, vec!["1.0".to_string()]);
    }

    #[test]
    fn test_curve_without_value_column() {
        let csv = "timestamp_utc,value\n2024-01-01T00:00:00Z,1.0\n";
        let err = CurveTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("spread, expected_spread"));
    }

    #[test]
    fn test_specs_optional_columns() {
        let csv = "source,sink,start_utc,end_utc,mw,contract_type\n\
                   FR,DE_LU,2024-01-01T00:00:00Z,2024-01-02T00:00:00Z,10,\n\
                   FR,BE,2024-01-01T00:00:00Z,2024-01-02T00:00:00Z,5,obligation\n";
        let specs = read_specs_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].contract_type, None);
        assert_eq!(specs[0].contract_id, None);
        assert_eq!(specs[1].contract_type.as_deref(), Some("obligation"));
    }

    #[test]
    fn test_prices_from_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.parquet");
        write_parquet(
            &path,
            vec![
                Field::new("node", DataType::Utf8, false),
                Field::new(
                    "timestamp_utc",
                    DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
                    false,
                ),
                Field::new("price", DataType::Float64, true),
                Field::new("unit", DataType::Utf8, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["FR", "FR"])),
                Arc::new(
                    TimestampNanosecondArray::from(vec![BASE_NS, BASE_NS + HOUR_NS])
                        .with_timezone("UTC"),
                ),
                Arc::new(Float64Array::from(vec![Some(50.5), None])),
                Arc::new(StringArray::from(vec![Some("EUR"), None])),
            ],
        );

        let table = read_prices(&path).unwrap();
        assert_eq!(table.columns(), ["node", "timestamp_utc", "price", "unit"]);
        assert_eq!(table.len(), 2);
        let t0 = parse_datetime_utc("2024-01-01T00:00:00Z").unwrap();
        let tz = chrono_tz::Tz::UTC;
        assert_eq!(table.rows()[0].timestamp.to_utc(tz).unwrap(), t0);
        assert_eq!(
            table.rows()[1].timestamp.to_utc(tz).unwrap(),
            t0 + chrono::Duration::hours(1)
        );
        assert_eq!(table.rows()[0].price, 50.5);
        assert!(table.rows()[1].price.is_nan());
        assert_eq!(table.rows()[0].extra, vec!["EUR".to_string()]);
        assert_eq!(table.rows()[1].extra, vec![String::new()]);
    }

    #[test]
    fn test_curve_from_parquet_text_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.parquet");
        write_parquet(
            &path,
            vec![
                Field::new("timestamp", DataType::Utf8, false),
                Field::new("expected_spread", DataType::Float64, false),
            ],
            vec![
                Arc::new(StringArray::from(vec!["2024-01-01 00:00:00"])),
                Arc::new(Float64Array::from(vec![-3.5])),
            ],
        );

        let curve = read_curve(&path).unwrap();
        assert_eq!(curve.timestamp_column(), TimestampColumn::Timestamp);
        assert_eq!(curve.value_column(), CurveValueColumn::ExpectedSpread);
        assert!(curve.rows()[0].timestamp.is_naive());
        assert_eq!(curve.rows()[0].timestamp_text, "2024-01-01 00:00:00");
        assert_eq!(curve.rows()[0].value, -3.5);
    }

    #[test]
    fn test_parquet_missing_price_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.parquet");
        write_parquet(
            &path,
            vec![
                Field::new("timestamp_utc", DataType::Utf8, false),
                Field::new("node", DataType::Utf8, false),
            ],
            vec![
                Arc::new(StringArray::from(vec!["2024-01-01T00:00:00Z"])),
                Arc::new(StringArray::from(vec!["FR"])),
            ],
        );
        let err = read_prices(&path).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { table: "prices", .. }));
    }

    #[test]
    fn test_garbage_parquet_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.parquet");
        std::fs::write(&path, b"not a parquet file").unwrap();
        assert!(matches!(read_prices(&path), Err(DataError::Parquet(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_curve(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        let err = read_prices(dir.path().join("absent.parquet")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn test_specs_parquet_rejected() {
        let err = read_specs("specs.parquet").unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat(_)));
    }
}
