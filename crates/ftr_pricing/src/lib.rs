//! # ftr_pricing: Historical-Simulation Valuation of FTRs
//!
//! ## Layer 3 Role
//!
//! ftr_pricing is the valuation engine built on ftr_core:
//! - Seeded, portable random number generation (`rng`)
//! - Spread and curve preparation (`features`)
//! - Circular block bootstrap of spread residuals (`models`)
//! - Payoffs, statistics, single and batch valuation (`pricing`)
//! - Data-version digests and the cache manifest (`cache`)
//! - Flat report rows and CSV or Parquet export (`reporting`)
//!
//! ## Reproducibility
//!
//! A valuation depends only on its contract, input tables, model and
//! settings. The generator is seeded from `Settings::seed` at the start of
//! every contract's valuation, so batch results are identical whether
//! contracts are priced sequentially or on the Rayon pool.
//!
//! ## Usage Example
//!
//! ```rust
//! use ftr_core::config::Settings;
//! use ftr_core::data::PriceTable;
//! use ftr_core::types::ContractSpec;
//! use ftr_core::types::time::parse_datetime_utc;
//! use ftr_pricing::models::PricingModel;
//! use ftr_pricing::pricing::price_contract;
//!
//! let t0 = parse_datetime_utc("2024-01-01T00:00:00Z").unwrap();
//! let mut prices = PriceTable::default();
//! for h in 0..(24 * 14) {
//!     let ts = t0 + chrono::Duration::hours(h);
//!     prices.push(ts.into(), "FR", 50.0 + (h % 24) as f64);
//!     prices.push(ts.into(), "DE_LU", 48.0 + (h % 12) as f64);
//! }
//!
//! let start = parse_datetime_utc("2024-02-01T00:00:00Z").unwrap();
//! let end = parse_datetime_utc("2024-02-08T00:00:00Z").unwrap();
//! let spec = ContractSpec::obligation("FR", "DE_LU", start, end, 25.0).unwrap();
//!
//! let settings = Settings::builder().n_scenarios(200).seed(42).build().unwrap();
//! let result = price_contract(&spec, &prices, None, PricingModel::HistoricalSimulation, &settings)
//!     .unwrap();
//!
//! assert_eq!(result.metadata.hours, 168);
//! assert_eq!(result.n_scenarios, 200);
//! assert!(result.p5_payoff <= result.price && result.price <= result.p95_payoff);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod cache;
pub mod features;
pub mod models;
pub mod pricing;
pub mod reporting;
pub mod rng;
