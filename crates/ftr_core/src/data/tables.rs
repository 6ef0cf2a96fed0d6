//! Input tables consumed by the pricing engine.
//!
//! - [`PriceTable`]: `(timestamp, node, price)` rows for any number of zones
//! - [`CurveTable`]: `(timestamp, spread | expected_spread)` rows
//!
//! Tables keep what they were read with: the header order, any columns the
//! engine does not use, and each timestamp cell's text. Content hashes are
//! computed over [`Column`] layout and [`Cell`] values, so they change with
//! any of these.

use std::fmt;

use crate::types::time::RawTimestamp;

/// Accepted timestamp column names, in order of preference.
pub const TIMESTAMP_COLUMNS: [&str; 2] = ["timestamp_utc", "timestamp"];

/// Accepted curve value column names, in order of preference.
pub const CURVE_VALUE_COLUMNS: [&str; 2] = ["spread", "expected_spread"];

/// Name of the timestamp column in a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimestampColumn {
    /// `timestamp_utc`
    #[default]
    TimestampUtc,
    /// `timestamp`
    Timestamp,
}

impl TimestampColumn {
    /// Column header text.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampColumn::TimestampUtc => "timestamp_utc",
            TimestampColumn::Timestamp => "timestamp",
        }
    }

    /// First accepted timestamp column present in `headers`.
    pub fn pick<'a>(headers: impl IntoIterator<Item = &'a str> + Clone) -> Option<Self> {
        if headers.clone().into_iter().any(|h| h == "timestamp_utc") {
            Some(TimestampColumn::TimestampUtc)
        } else if headers.into_iter().any(|h| h == "timestamp") {
            Some(TimestampColumn::Timestamp)
        } else {
            None
        }
    }
}

impl fmt::Display for TimestampColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role of a column in an input table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    /// The timestamp column
    Timestamp,
    /// `node` (price tables only)
    Node,
    /// `price`, or the curve value column
    Value,
    /// Any other column, carried as text
    Extra(String),
}

/// A table cell as seen by content hashing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell<'a> {
    /// Text as read
    Text(&'a str),
    /// Numeric value
    Number(f64),
}

fn default_layout() -> Vec<Column> {
    vec![Column::Timestamp, Column::Node, Column::Value]
}

fn curve_layout() -> Vec<Column> {
    vec![Column::Timestamp, Column::Value]
}

/// One nodal price observation.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRow {
    /// Observation time as recorded
    pub timestamp: RawTimestamp,
    /// Timestamp cell text as read
    pub timestamp_text: String,
    /// Zone identifier
    pub node: String,
    /// Price in EUR/MWh; `NaN` when missing
    pub price: f64,
    /// Cells of the table's extra columns, in column order
    pub extra: Vec<String>,
}

impl PriceRow {
    /// Row without extra cells; the timestamp text is its canonical form.
    pub fn new(timestamp: RawTimestamp, node: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp,
            timestamp_text: timestamp.canonical(),
            node: node.into(),
            price,
            extra: Vec::new(),
        }
    }
}

/// Nodal price history for one or more zones.
///
/// Multiple rows for the same node and timestamp are allowed; they are
/// averaged when the node series is built.
///
/// # Examples
///
/// ```
/// use ftr_core::data::PriceTable;
///
/// let mut prices = PriceTable::default();
/// prices.push("2024-01-01T00:00:00Z".parse().unwrap(), "FR", 52.1);
/// prices.push("2024-01-01T00:00:00Z".parse().unwrap(), "DE_LU", 48.3);
///
/// assert_eq!(prices.len(), 2);
/// assert_eq!(prices.nodes(), vec!["DE_LU", "FR"]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PriceTable {
    timestamp_column: TimestampColumn,
    layout: Vec<Column>,
    rows: Vec<PriceRow>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PriceTable {
    /// Creates a `timestamp_utc, node, price` table from rows.
    pub fn new(rows: Vec<PriceRow>) -> Self {
        Self {
            timestamp_column: TimestampColumn::default(),
            layout: default_layout(),
            rows,
        }
    }

    /// Sets the timestamp column name recorded for this table.
    pub fn with_timestamp_column(mut self, column: TimestampColumn) -> Self {
        self.timestamp_column = column;
        self
    }

    /// Sets the column order. Readers guarantee one each of
    /// `Timestamp`, `Node` and `Value`.
    pub(crate) fn with_layout(mut self, layout: Vec<Column>) -> Self {
        self.layout = layout;
        self
    }

    /// Appends one observation.
    pub fn push(&mut self, timestamp: RawTimestamp, node: impl Into<String>, price: f64) {
        self.rows.push(PriceRow::new(timestamp, node, price));
    }

    /// Appends a row as read.
    pub fn push_row(&mut self, row: PriceRow) {
        self.rows.push(row);
    }

    /// Column headers in table order, extra columns included.
    pub fn columns(&self) -> Vec<&str> {
        self.layout
            .iter()
            .map(|column| match column {
                Column::Timestamp => self.timestamp_column.as_str(),
                Column::Node => "node",
                Column::Value => "price",
                Column::Extra(name) => name.as_str(),
            })
            .collect()
    }

    /// Column roles in table order.
    pub fn layout(&self) -> &[Column] {
        &self.layout
    }

    /// Cells of `row` in column order.
    pub fn cells<'a>(&'a self, row: &'a PriceRow) -> impl Iterator<Item = Cell<'a>> + 'a {
        let mut extra = row.extra.iter();
        self.layout.iter().map(move |column| match column {
            Column::Timestamp => Cell::Text(&row.timestamp_text),
            Column::Node => Cell::Text(&row.node),
            Column::Value => Cell::Number(row.price),
            Column::Extra(_) => Cell::Text(extra.next().map_or("", String::as_str)),
        })
    }

    /// Timestamp column name.
    pub fn timestamp_column(&self) -> TimestampColumn {
        self.timestamp_column
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to `node`, in insertion order.
    pub fn rows_for_node<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a PriceRow> + 'a {
        self.rows.iter().filter(move |row| row.node == node)
    }

    /// Distinct node identifiers, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = self.rows.iter().map(|row| row.node.as_str()).collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }
}

/// Name of the value column in a curve table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CurveValueColumn {
    /// `spread`
    #[default]
    Spread,
    /// `expected_spread`
    ExpectedSpread,
}

impl CurveValueColumn {
    /// Column header text.
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveValueColumn::Spread => "spread",
            CurveValueColumn::ExpectedSpread => "expected_spread",
        }
    }

    /// First accepted value column present in `headers`.
    pub fn pick<'a>(headers: impl IntoIterator<Item = &'a str> + Clone) -> Option<Self> {
        if headers.clone().into_iter().any(|h| h == "spread") {
            Some(CurveValueColumn::Spread)
        } else if headers.into_iter().any(|h| h == "expected_spread") {
            Some(CurveValueColumn::ExpectedSpread)
        } else {
            None
        }
    }
}

/// One forward curve point.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveRow {
    /// Delivery hour as recorded
    pub timestamp: RawTimestamp,
    /// Timestamp cell text as read
    pub timestamp_text: String,
    /// Expected spread in EUR/MWh; `NaN` when missing
    pub value: f64,
    /// Cells of the table's extra columns, in column order
    pub extra: Vec<String>,
}

impl CurveRow {
    /// Row without extra cells; the timestamp text is its canonical form.
    pub fn new(timestamp: RawTimestamp, value: f64) -> Self {
        Self {
            timestamp,
            timestamp_text: timestamp.canonical(),
            value,
            extra: Vec::new(),
        }
    }
}

/// Forward spread curve.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveTable {
    timestamp_column: TimestampColumn,
    value_column: CurveValueColumn,
    layout: Vec<Column>,
    rows: Vec<CurveRow>,
}

impl Default for CurveTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CurveTable {
    /// Creates a `timestamp_utc, spread` curve from rows.
    pub fn new(rows: Vec<CurveRow>) -> Self {
        Self {
            timestamp_column: TimestampColumn::default(),
            value_column: CurveValueColumn::default(),
            layout: curve_layout(),
            rows,
        }
    }

    /// Sets the timestamp column name recorded for this table.
    pub fn with_timestamp_column(mut self, column: TimestampColumn) -> Self {
        self.timestamp_column = column;
        self
    }

    /// Sets the value column name recorded for this table.
    pub fn with_value_column(mut self, column: CurveValueColumn) -> Self {
        self.value_column = column;
        self
    }

    /// Sets the column order. Readers guarantee one each of
    /// `Timestamp` and `Value`, and no `Node`.
    pub(crate) fn with_layout(mut self, layout: Vec<Column>) -> Self {
        self.layout = layout;
        self
    }

    /// Appends one point.
    pub fn push(&mut self, timestamp: RawTimestamp, value: f64) {
        self.rows.push(CurveRow::new(timestamp, value));
    }

    /// Appends a row as read.
    pub fn push_row(&mut self, row: CurveRow) {
        self.rows.push(row);
    }

    /// Column headers in table order, extra columns included.
    pub fn columns(&self) -> Vec<&str> {
        self.layout
            .iter()
            .map(|column| match column {
                Column::Timestamp => self.timestamp_column.as_str(),
                Column::Node => "node",
                Column::Value => self.value_column.as_str(),
                Column::Extra(name) => name.as_str(),
            })
            .collect()
    }

    /// Column roles in table order.
    pub fn layout(&self) -> &[Column] {
        &self.layout
    }

    /// Cells of `row` in column order.
    pub fn cells<'a>(&'a self, row: &'a CurveRow) -> impl Iterator<Item = Cell<'a>> + 'a {
        let mut extra = row.extra.iter();
        self.layout.iter().map(move |column| match column {
            Column::Timestamp => Cell::Text(&row.timestamp_text),
            Column::Node => Cell::Text(""),
            Column::Value => Cell::Number(row.value),
            Column::Extra(_) => Cell::Text(extra.next().map_or("", String::as_str)),
        })
    }

    /// Timestamp column name.
    pub fn timestamp_column(&self) -> TimestampColumn {
        self.timestamp_column
    }

    /// Value column name.
    pub fn value_column(&self) -> CurveValueColumn {
        self.value_column
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[CurveRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
