//! Core contract, result, time and error types.
//!
//! This module provides:
//! - `time`: Timestamp parsing, localisation and hourly index generation
//! - `contract`: `ContractSpec` and its record shape
//! - `valuation`: `ValuationResult` and metadata
//! - `error`: The error taxonomy shared by every crate in the workspace
//!
//! # Re-exports
//!
//! Commonly used types are re-exported at this module level.

pub mod contract;
pub mod error;
pub mod time;
pub mod valuation;

pub use contract::{ContractSpec, ContractSpecRecord, ContractType};
pub use error::{ConfigError, ContractError, DataError, FtrError, ModelError};
pub use time::RawTimestamp;
pub use valuation::{ValuationMetadata, ValuationResult, CURRENCY};
