//! # ftr_core: Foundation Types for FTR Valuation
//!
//! ## Layer 1 (Foundation) Role
//!
//! ftr_core is the bottom layer of the workspace, providing:
//! - Contract and result types: `ContractSpec`, `ValuationResult` (`types`)
//! - Timestamp parsing, localisation and hourly indices (`types::time`)
//! - Error taxonomy: `ConfigError`, `DataError`, `ModelError`,
//!   `ContractError`, `FtrError` (`types::error`)
//! - Immutable pricing settings with TOML loading (`config`)
//! - Price/curve tables, CSV and Parquet readers and the `TimeSeries` container (`data`)
//!
//! ## Dependency Principle
//!
//! Layer 1 has no dependencies on other ftr_* crates, with minimal external dependencies:
//! - chrono / chrono-tz: UTC instants and IANA timezone localisation
//! - thiserror: Error enums
//! - serde / serde_json / toml: Settings and record serialisation
//! - csv: Tabular input readers
//!
//! ## Usage Examples
//!
//! ```rust
//! use ftr_core::config::Settings;
//! use ftr_core::types::{ContractSpec, ContractType};
//! use ftr_core::types::time::{hourly_index_utc, parse_datetime_utc};
//!
//! let start = parse_datetime_utc("2024-01-01T00:00:00Z").unwrap();
//! let end = parse_datetime_utc("2024-01-02T00:00:00Z").unwrap();
//!
//! let spec = ContractSpec::obligation("FR", "DE_LU", start, end, 10.0).unwrap();
//! assert_eq!(spec.contract_type(), ContractType::Obligation);
//! assert_eq!(hourly_index_utc(spec.start_utc(), spec.end_utc()).len(), 24);
//!
//! let settings = Settings::builder().n_scenarios(1000).seed(7).build().unwrap();
//! assert_eq!(settings.block_length_days(), 7);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod data;
pub mod types;
