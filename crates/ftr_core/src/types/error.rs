//! Error types for structured error handling.
//!
//! This module provides:
//! - `ConfigError`: Invalid settings values
//! - `DataError`: Missing columns, unusable series, unknown nodes, unreadable files
//! - `ModelError`: Unsupported pricing model names
//! - `ContractError`: Contract construction failures
//! - `FtrError`: Top-level error wrapping all of the above plus I/O
//!
//! Every failure is a precondition violation of a deterministic computation.
//! None of them are retried.

use thiserror::Error;

/// Invalid configuration value.
///
/// # Examples
/// ```
/// use ftr_core::types::ConfigError;
///
/// let err = ConfigError::InvalidScenarioCount(0);
/// assert_eq!(format!("{}", err), "Invalid scenario count 0: must be >= 1");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Scenario count below one.
    #[error("Invalid scenario count {0}: must be >= 1")]
    InvalidScenarioCount(i64),

    /// Block length below one day.
    #[error("Invalid block length {0} days: must be >= 1")]
    InvalidBlockLength(i64),

    /// Negative RNG seed.
    #[error("Invalid seed {0}: must be >= 0")]
    InvalidSeed(i64),

    /// Timezone name not present in the IANA database.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Missing-hour policy other than `drop` or `ffill`.
    #[error("Invalid missing hour policy: {0}. Must be one of: drop, ffill")]
    InvalidMissingHourPolicy(String),

    /// Settings file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Input data failure.
///
/// Raised when required columns are absent, a requested node has no rows,
/// or a series is empty or entirely missing after alignment.
///
/// # Examples
/// ```
/// use ftr_core::types::DataError;
///
/// let err = DataError::NoRowsForNode("FR".to_string());
/// assert_eq!(format!("{}", err), "No prices found for node=FR");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A required column is absent from a table.
    #[error("{table} must include one of the columns: {}", .candidates.join(", "))]
    MissingColumn {
        /// Logical table name (prices, curve, specs)
        table: &'static str,
        /// Column names that would satisfy the requirement
        candidates: Vec<&'static str>,
    },

    /// No price rows exist for the requested node.
    #[error("No prices found for node={0}")]
    NoRowsForNode(String),

    /// Timestamp text could not be parsed.
    #[error("Unparseable timestamp: {0}")]
    InvalidTimestamp(String),

    /// Naive local timestamp falls in a daylight-saving overlap.
    #[error("Ambiguous local time {timestamp} in {tz}")]
    AmbiguousLocalTime {
        /// Naive timestamp as observed
        timestamp: String,
        /// Timezone used for localisation
        tz: String,
    },

    /// Naive local timestamp falls in a daylight-saving gap.
    #[error("Non-existent local time {timestamp} in {tz}")]
    NonexistentLocalTime {
        /// Naive timestamp as observed
        timestamp: String,
        /// Timezone used for localisation
        tz: String,
    },

    /// Series index and values disagree in length or order.
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Series has no finite values at the named stage.
    #[error("Empty or all-missing {0} series")]
    EmptySeries(&'static str),

    /// Contract horizon contains no hours.
    #[error("Contract horizon must contain at least one hour")]
    EmptyHorizon,

    /// File extension not handled by the readers.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Input file could not be opened or read.
    #[error("Cannot read {path}: {message}")]
    Io {
        /// Path as given by the caller
        path: String,
        /// Operating system error text
        message: String,
    },

    /// CSV decoding failure.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Parquet or Arrow decoding failure.
    #[error("Parquet error: {0}")]
    Parquet(String),
}

impl DataError {
    /// Wraps an I/O failure on `path`.
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        DataError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Unsupported pricing model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Model name does not map to an implemented model.
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),
}

/// Contract construction failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Contract type is recognised but not priceable.
    #[error("Only obligation-style FTRs are supported, got {0}")]
    UnsupportedContractType(String),

    /// Contract type string is not recognised at all.
    #[error("Unknown contract type: {0}")]
    UnknownContractType(String),

    /// Contract boundary timestamp could not be parsed.
    #[error("Invalid contract timestamp: {0}")]
    InvalidTimestamp(String),

    /// `end_utc` is not after `start_utc`.
    #[error("Contract window is empty: end {end} is not after start {start}")]
    EmptyWindow {
        /// Start instant (RFC 3339)
        start: String,
        /// End instant (RFC 3339)
        end: String,
    },
}

/// Top-level error returned by engine entry points.
#[derive(Error, Debug)]
pub enum FtrError {
    /// Invalid settings.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unusable input data.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Unsupported model.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Invalid contract.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// File system failure in cache or report I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest (de)serialisation failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

impl From<csv::Error> for FtrError {
    fn from(err: csv::Error) -> Self {
        FtrError::Data(err.into())
    }
}

impl From<parquet::errors::ParquetError> for DataError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        DataError::Parquet(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for DataError {
    fn from(err: arrow::error::ArrowError) -> Self {
        DataError::Parquet(err.to_string())
    }
}

impl From<parquet::errors::ParquetError> for FtrError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        FtrError::Data(err.into())
    }
}

impl From<arrow::error::ArrowError> for FtrError {
    fn from(err: arrow::error::ArrowError) -> Self {
        FtrError::Data(err.into())
    }
}
