//! Scenario models.
//!
//! [`PricingModel`] is the closed set of models the engine can run. Model
//! names from untyped inputs are parsed at the boundary with `FromStr`.

pub mod hs;

pub use hs::{block_length_hours, bootstrap_scenarios, bootstrap_values};

use ftr_core::config::Settings;
use ftr_core::data::TimeSeries;
use ftr_core::types::{DataError, ModelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scenario-generating model.
///
/// # Examples
///
/// ```
/// use ftr_pricing::models::PricingModel;
///
/// let model: PricingModel = "hs".parse().unwrap();
/// assert_eq!(model, PricingModel::HistoricalSimulation);
/// assert!("garch".parse::<PricingModel>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingModel {
    /// Block bootstrap of historical spread residuals.
    #[default]
    #[serde(rename = "hs")]
    HistoricalSimulation,
}

impl PricingModel {
    /// Short model name recorded on results.
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::HistoricalSimulation => "hs",
        }
    }

    /// Residual paths of `n_hours` each, one per scenario.
    pub fn simulate(
        &self,
        residuals: &TimeSeries,
        n_hours: usize,
        settings: &Settings,
    ) -> Result<Vec<Vec<f64>>, DataError> {
        match self {
            PricingModel::HistoricalSimulation => {
                bootstrap_scenarios(residuals, n_hours, settings)
            }
        }
    }
}

impl FromStr for PricingModel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hs" => Ok(PricingModel::HistoricalSimulation),
            other => Err(ModelError::UnsupportedModel(other.to_string())),
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
