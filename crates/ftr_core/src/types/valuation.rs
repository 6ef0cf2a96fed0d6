//! Valuation result types.

use serde::{Deserialize, Serialize};

/// Reporting currency of every valuation.
pub const CURRENCY: &str = "EUR";

/// Diagnostics attached to a valuation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationMetadata {
    /// Number of contract hours priced
    pub hours: usize,
    /// Mean of the historical spread series
    pub spread_mean: f64,
    /// Mean of the curve over contract hours
    pub curve_mean: f64,
}

/// Outcome of pricing one contract.
///
/// Created once per pricing call and never mutated. All payoff statistics
/// are already scaled by the contract capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Identifier copied from the contract
    pub contract_id: Option<String>,
    /// Fair value (equal to `mean_payoff`)
    pub price: f64,
    /// Always [`CURRENCY`]
    pub currency: String,
    /// Mean scenario payoff
    pub mean_payoff: f64,
    /// Population standard deviation of scenario payoffs
    pub stdev_payoff: f64,
    /// 5th percentile of scenario payoffs
    pub p5_payoff: f64,
    /// 95th percentile of scenario payoffs
    pub p95_payoff: f64,
    /// Number of Monte Carlo scenarios
    pub n_scenarios: usize,
    /// Model name
    pub model: String,
    /// Content hash of code version, settings and inputs
    pub data_version: String,
    /// Diagnostics
    pub metadata: ValuationMetadata,
}
