//! Valuation engine.
//!
//! This module provides:
//! - `payoff`: hourly payoff and per-scenario aggregation
//! - `stats`: mean, population standard deviation and tail percentiles
//! - `engine`: single-contract valuation
//! - `providers`: per-contract price and curve lookup for batches
//! - `batch`: sequential, error-collecting and parallel batch valuation

pub mod batch;
pub mod engine;
pub mod payoff;
pub mod providers;
pub mod stats;

pub use batch::{
    price_batch, price_batch_parallel, price_batch_records, try_price_batch, BatchRow,
};
pub use engine::{price_contract, price_contract_named};
pub use payoff::{hourly_payoff, scenario_payoffs};
pub use providers::{CurveProvider, NoCurve, PriceProvider};
pub use stats::{percentile, PayoffStats};
