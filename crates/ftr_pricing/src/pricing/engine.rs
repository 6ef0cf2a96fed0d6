//! Single-contract valuation.
//!
//! Pricing is a pure function of the contract, the input tables, the model
//! and the settings. Every step that can fail runs before any scenario is
//! drawn:
//!
//! 1. spread series for `(source, sink)`
//! 2. contract hours `[start_utc, end_utc)`
//! 3. curve on those hours (or the flat spread mean without a curve)
//! 4. residuals = spread − mean, bootstrapped to the contract length
//! 5. payoffs, statistics and the data version

use std::path::Path;

use ftr_core::config::Settings;
use ftr_core::data::{CurveTable, PriceTable};
use ftr_core::types::time::hourly_index_utc;
use ftr_core::types::{
    ContractSpec, DataError, FtrError, ValuationMetadata, ValuationResult, CURRENCY,
};
use tracing::{debug, debug_span};

use super::payoff::scenario_payoffs;
use super::stats::PayoffStats;
use crate::cache::{compute_data_version, ContentHash, CODE_VERSION};
use crate::features::{compute_spread_series, flat_curve, prepare_curve};
use crate::models::PricingModel;

/// Values one contract.
///
/// The curve is aligned to the contract hours with forward then backward
/// fill. Without a curve, every hour uses the historical spread mean.
///
/// # Arguments
///
/// * `spec` - Contract terms; the window is `[start_utc, end_utc)`
/// * `prices` - Nodal price history containing both `source` and `sink`
/// * `curve` - Optional forward spread curve covering the contract hours
/// * `model` - Scenario model
/// * `settings` - Scenario count, block length, seed, timezone and
///   missing-hour policy
///
/// # Returns
///
/// A [`ValuationResult`] with `price = mean_payoff` in EUR, the payoff
/// distribution summary, and the data version of the tables and settings.
///
/// # Errors
///
/// - `FtrError::Data` when a node has no rows, the spread or curve is empty
///   after alignment, or a naive timestamp cannot be localised
/// - `FtrError::Serialization` if the settings cannot be hashed
///
/// # Examples
///
/// ```
/// use ftr_core::config::Settings;
/// use ftr_core::data::{CurveTable, PriceTable};
/// use ftr_core::types::ContractSpec;
/// use ftr_core::types::time::parse_datetime_utc;
/// use ftr_pricing::models::PricingModel;
/// use ftr_pricing::pricing::price_contract;
///
/// let mut prices = PriceTable::default();
/// for h in 0..24 {
///     let ts = format!("2024-01-01T{:02}:00:00Z", h);
///     prices.push(ts.parse().unwrap(), "FR", 50.0);
///     prices.push(ts.parse().unwrap(), "DE_LU", 50.0);
/// }
/// let mut curve = CurveTable::default();
/// curve.push("2024-02-01T00:00:00Z".parse().unwrap(), -5.0);
///
/// let spec = ContractSpec::obligation(
///     "FR",
///     "DE_LU",
///     parse_datetime_utc("2024-02-01T00:00:00Z").unwrap(),
///     parse_datetime_utc("2024-02-01T03:00:00Z").unwrap(),
///     2.0,
/// )
/// .unwrap();
/// let settings = Settings::builder().n_scenarios(1).build().unwrap();
///
/// let result = price_contract(
///     &spec,
///     &prices,
///     Some(&curve),
///     PricingModel::HistoricalSimulation,
///     &settings,
/// )
/// .unwrap();
/// assert_eq!(result.price, -30.0);
/// assert_eq!(result.stdev_payoff, 0.0);
/// assert_eq!(result.metadata.hours, 3);
/// ```
pub fn price_contract(
    spec: &ContractSpec,
    prices: &PriceTable,
    curve: Option<&CurveTable>,
    model: PricingModel,
    settings: &Settings,
) -> Result<ValuationResult, FtrError> {
    let span = debug_span!(
        "price_contract",
        contract_id = spec.contract_id().unwrap_or(""),
        source = spec.source(),
        sink = spec.sink(),
        model = model.as_str(),
    );
    let _guard = span.enter();

    let spread = compute_spread_series(prices, spec.source(), spec.sink(), settings)?;
    let contract_hours = hourly_index_utc(spec.start_utc(), spec.end_utc());
    let curve_series = match curve {
        Some(table) => prepare_curve(table, &contract_hours, settings)?,
        None => flat_curve(&spread, &contract_hours),
    };

    let spread_mean = spread.mean();
    let residuals = spread.shifted(spread_mean);
    let scenarios = model.simulate(&residuals, contract_hours.len(), settings)?;
    let payoffs = scenario_payoffs(
        curve_series.values(),
        &scenarios,
        spec.contract_type(),
        spec.mw(),
    );
    let stats = PayoffStats::from_payoffs(&payoffs).ok_or(DataError::EmptySeries("payoff"))?;

    let mut tables: Vec<&dyn ContentHash> = vec![prices as &dyn ContentHash];
    if let Some(table) = curve {
        tables.push(table);
    }
    let data_version = compute_data_version(CODE_VERSION, settings, &[] as &[&Path], &tables)?;

    debug!(
        hours = contract_hours.len(),
        n_scenarios = payoffs.len(),
        price = stats.mean,
        %data_version,
        "priced contract"
    );

    Ok(ValuationResult {
        contract_id: spec.contract_id().map(str::to_string),
        price: stats.mean,
        currency: CURRENCY.to_string(),
        mean_payoff: stats.mean,
        stdev_payoff: stats.stdev,
        p5_payoff: stats.p5,
        p95_payoff: stats.p95,
        n_scenarios: payoffs.len(),
        model: model.as_str().to_string(),
        data_version,
        metadata: ValuationMetadata {
            hours: contract_hours.len(),
            spread_mean,
            curve_mean: curve_series.mean(),
        },
    })
}

/// Values one contract with the model given by name.
///
/// The name is checked before any data is touched.
///
/// # Errors
///
/// `FtrError::Model` for any name other than `"hs"`, otherwise as
/// [`price_contract`].
pub fn price_contract_named(
    spec: &ContractSpec,
    prices: &PriceTable,
    curve: Option<&CurveTable>,
    model: &str,
    settings: &Settings,
) -> Result<ValuationResult, FtrError> {
    let model: PricingModel = model.parse()?;
    price_contract(spec, prices, curve, model, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ftr_core::types::time::parse_datetime_utc;
    use ftr_core::types::ModelError;

    fn history(hours: i64, source: f64, sink: impl Fn(i64) -> f64) -> PriceTable {
        let t0 = parse_datetime_utc("2024-01-01T00:00:00Z").unwrap();
        let mut prices = PriceTable::default();
        for h in 0..hours {
            let ts = t0 + chrono::Duration::hours(h);
            prices.push(ts.into(), "SRC", source);
            prices.push(ts.into(), "SNK", sink(h));
        }
        prices
    }

    fn spec(hours: i64, mw: f64) -> ContractSpec {
        let start = parse_datetime_utc("2024-03-01T00:00:00Z").unwrap();
        ContractSpec::obligation("SRC", "SNK", start, start + chrono::Duration::hours(hours), mw)
            .unwrap()
    }

    #[test]
    fn test_unknown_model_rejected_before_data() {
        let empty = PriceTable::default();
        let err = price_contract_named(&spec(3, 1.0), &empty, None, "garch", &Settings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FtrError::Model(ModelError::UnsupportedModel(ref name)) if name == "garch"
        ));
    }

    #[test]
    fn test_flat_curve_fallback_prices_mean_spread() {
        // alternating spread 0/4 has mean 2; a 24-hour block keeps the pattern
        let prices = history(240, 10.0, |h| if h % 2 == 0 { 10.0 } else { 14.0 });
        let settings = Settings::builder()
            .n_scenarios(20)
            .block_length_days(1)
            .build()
            .unwrap();
        let result = price_contract(
            &spec(24, 1.0),
            &prices,
            None,
            PricingModel::HistoricalSimulation,
            &settings,
        )
        .unwrap();
        assert_relative_eq!(result.metadata.spread_mean, 2.0);
        assert_relative_eq!(result.metadata.curve_mean, 2.0);
        assert_relative_eq!(result.price, 48.0, epsilon = 1e-9);
        assert_eq!(result.n_scenarios, 20);
        assert_eq!(result.model, "hs");
        assert_eq!(result.currency, "EUR");
    }

    #[test]
    fn test_deterministic_repeat() {
        let prices = history(500, 20.0, |h| 20.0 + ((h * 7919) % 23) as f64 - 11.0);
        let settings = Settings::builder().n_scenarios(200).build().unwrap();
        let price = |s: &Settings| {
            price_contract(
                &spec(72, 5.0),
                &prices,
                None,
                PricingModel::HistoricalSimulation,
                s,
            )
            .unwrap()
        };
        let first = price(&settings);
        assert_eq!(first, price(&settings));
        assert!(first.stdev_payoff > 0.0);
        assert!(first.p5_payoff <= first.p95_payoff);

        let reseeded = Settings::builder().n_scenarios(200).seed(7).build().unwrap();
        let other = price(&reseeded);
        assert_ne!(first.data_version, other.data_version);
        assert_ne!(first.stdev_payoff, other.stdev_payoff);
    }

    #[test]
    fn test_curve_participates_in_data_version() {
        let prices = history(48, 1.0, |_| 2.0);
        let settings = Settings::builder().n_scenarios(1).build().unwrap();
        let mut curve = CurveTable::default();
        curve.push("2024-03-01T00:00:00Z".parse().unwrap(), 1.0);
        let model = PricingModel::HistoricalSimulation;

        let with_curve = price_contract(&spec(3, 1.0), &prices, Some(&curve), model, &settings)
            .unwrap();
        let without = price_contract(&spec(3, 1.0), &prices, None, model, &settings).unwrap();
        assert_ne!(with_curve.data_version, without.data_version);
        assert_relative_eq!(with_curve.price, 3.0);
        assert_relative_eq!(without.price, 3.0);
    }
}
