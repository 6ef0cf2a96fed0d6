//! Historical simulation by circular block bootstrap.
//!
//! Residual history is treated as a cycle: a block that would run past the
//! end continues from the start. Blocks are concatenated until a scenario
//! holds at least `n_hours` values and then truncated.
//!
//! One [`PricerRng`] is seeded from `Settings::seed` per call and advanced
//! across all scenarios in order.

use ftr_core::config::Settings;
use ftr_core::data::TimeSeries;
use ftr_core::types::DataError;
use tracing::debug;

use crate::rng::PricerRng;

/// Block length in hours, clamped to `[1, history_len]`.
///
/// # Examples
///
/// ```
/// use ftr_pricing::models::block_length_hours;
///
/// assert_eq!(block_length_hours(7, 10_000), 168);
/// assert_eq!(block_length_hours(7, 50), 50);
/// assert_eq!(block_length_hours(1, 0), 1);
/// ```
pub fn block_length_hours(block_length_days: usize, history_len: usize) -> usize {
    let block_len = block_length_days.saturating_mul(24).max(1);
    block_len.min(history_len.max(1))
}

/// Appends `block_len` values starting at `start`, wrapping past the end.
fn take_block(values: &[f64], start: usize, block_len: usize, out: &mut Vec<f64>) {
    let end = start + block_len;
    if end <= values.len() {
        out.extend_from_slice(&values[start..end]);
    } else {
        out.extend_from_slice(&values[start..]);
        out.extend_from_slice(&values[..end - values.len()]);
    }
}

/// Bootstraps scenarios from a residual slice with an explicit generator.
///
/// Non-finite entries are dropped before sampling.
///
/// # Errors
///
/// - `DataError::EmptyHorizon` if `n_hours` is 0
/// - `DataError::EmptySeries("residual")` if no finite value remains
pub fn bootstrap_values(
    residuals: &[f64],
    n_hours: usize,
    n_scenarios: usize,
    block_length_days: usize,
    rng: &mut PricerRng,
) -> Result<Vec<Vec<f64>>, DataError> {
    if n_hours < 1 {
        return Err(DataError::EmptyHorizon);
    }
    let values: Vec<f64> = residuals.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Err(DataError::EmptySeries("residual"));
    }

    let block_len = block_length_hours(block_length_days, values.len());
    let mut scenarios = Vec::with_capacity(n_scenarios);
    for _ in 0..n_scenarios {
        let mut draws = Vec::with_capacity(n_hours + block_len);
        while draws.len() < n_hours {
            let start = rng.gen_index(values.len());
            take_block(&values, start, block_len, &mut draws);
        }
        draws.truncate(n_hours);
        scenarios.push(draws);
    }
    Ok(scenarios)
}

/// Bootstraps `settings.n_scenarios()` residual paths of exactly `n_hours`.
///
/// A fresh generator is seeded from `settings.seed()` on every call, so
/// equal inputs always give equal scenarios.
///
/// # Arguments
///
/// * `residuals` - Historical residuals; missing values are skipped
/// * `n_hours` - Scenario length, normally the contract hour count
/// * `settings` - Supplies the scenario count, block length and seed
///
/// # Returns
///
/// `n_scenarios` vectors of `n_hours` values each, in draw order.
///
/// # Errors
///
/// - `DataError::EmptyHorizon` if `n_hours` is 0
/// - `DataError::EmptySeries("residual")` if no residual is finite
///
/// # Examples
///
/// ```
/// use ftr_core::config::Settings;
/// use ftr_core::data::TimeSeries;
/// use ftr_core::types::time::parse_datetime_utc;
/// use ftr_pricing::models::bootstrap_scenarios;
///
/// let t0 = parse_datetime_utc("2024-01-01T00:00:00Z").unwrap();
/// let residuals = TimeSeries::from_observations(
///     (0..48).map(|h| (t0 + chrono::Duration::hours(h), (h % 5) as f64 - 2.0)),
/// );
/// let settings = Settings::builder().n_scenarios(10).seed(1).build().unwrap();
///
/// let scenarios = bootstrap_scenarios(&residuals, 200, &settings).unwrap();
/// assert_eq!(scenarios.len(), 10);
/// assert!(scenarios.iter().all(|s| s.len() == 200));
/// assert_eq!(scenarios, bootstrap_scenarios(&residuals, 200, &settings).unwrap());
/// ```
pub fn bootstrap_scenarios(
    residuals: &TimeSeries,
    n_hours: usize,
    settings: &Settings,
) -> Result<Vec<Vec<f64>>, DataError> {
    debug!(
        history = residuals.len(),
        n_hours,
        n_scenarios = settings.n_scenarios(),
        seed = settings.seed(),
        "bootstrapping residual scenarios"
    );
    let mut rng = PricerRng::from_seed(settings.seed());
    bootstrap_values(
        residuals.values(),
        n_hours,
        settings.n_scenarios(),
        settings.block_length_days(),
        &mut rng,
    )
}
