//! Batch valuation.
//!
//! Every contract is valued independently with its own generator seeded
//! from `Settings::seed`, so a contract's result does not depend on its
//! position in the batch or on the thread that priced it.
//!
//! Three entry points:
//! - [`price_batch`]: sequential, stops at the first failure
//! - [`try_price_batch`]: sequential, one `Result` per contract
//! - [`price_batch_parallel`]: Rayon, same rows in the same order as
//!   [`price_batch`]

use chrono::{DateTime, Utc};
use ftr_core::config::Settings;
use ftr_core::types::{ContractSpec, ContractSpecRecord, FtrError, ValuationResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use super::engine::price_contract;
use super::providers::{CurveProvider, PriceProvider};
use crate::models::PricingModel;

/// Flattened contract and valuation fields for one batch entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    /// Contract identifier
    pub contract_id: Option<String>,
    /// Source zone
    pub source: String,
    /// Sink zone
    pub sink: String,
    /// Window start
    pub start_utc: DateTime<Utc>,
    /// Window end, exclusive
    pub end_utc: DateTime<Utc>,
    /// Capacity in MW
    pub mw: f64,
    /// Contract type name
    pub contract_type: String,
    /// Fair value
    pub price: f64,
    /// Reporting currency
    pub currency: String,
    /// Mean scenario payoff
    pub mean_payoff: f64,
    /// Population standard deviation of scenario payoffs
    pub stdev_payoff: f64,
    /// 5th percentile
    pub p5_payoff: f64,
    /// 95th percentile
    pub p95_payoff: f64,
    /// Scenario count
    pub n_scenarios: usize,
    /// Model name
    pub model: String,
    /// Data version
    pub data_version: String,
    /// Contract hours
    pub hours: usize,
    /// Historical spread mean
    pub spread_mean: f64,
    /// Curve mean over contract hours
    pub curve_mean: f64,
}

impl BatchRow {
    /// Combines a contract with its valuation.
    pub fn new(spec: &ContractSpec, result: &ValuationResult) -> Self {
        Self {
            contract_id: spec.contract_id().map(str::to_string),
            source: spec.source().to_string(),
            sink: spec.sink().to_string(),
            start_utc: spec.start_utc(),
            end_utc: spec.end_utc(),
            mw: spec.mw(),
            contract_type: spec.contract_type().to_string(),
            price: result.price,
            currency: result.currency.clone(),
            mean_payoff: result.mean_payoff,
            stdev_payoff: result.stdev_payoff,
            p5_payoff: result.p5_payoff,
            p95_payoff: result.p95_payoff,
            n_scenarios: result.n_scenarios,
            model: result.model.clone(),
            data_version: result.data_version.clone(),
            hours: result.metadata.hours,
            spread_mean: result.metadata.spread_mean,
            curve_mean: result.metadata.curve_mean,
        }
    }
}

fn price_one<P, C>(
    spec: &ContractSpec,
    prices: &P,
    curve: &C,
    model: PricingModel,
    settings: &Settings,
) -> Result<BatchRow, FtrError>
where
    P: PriceProvider + ?Sized,
    C: CurveProvider + ?Sized,
{
    let price_table = prices.prices_for(spec)?;
    let curve_table = curve.curve_for(spec)?;
    let result = price_contract(spec, &price_table, curve_table.as_deref(), model, settings)?;
    Ok(BatchRow::new(spec, &result))
}

/// Values every contract in order, stopping at the first failure.
///
/// # Examples
///
/// ```
/// use ftr_core::config::Settings;
/// use ftr_core::data::PriceTable;
/// use ftr_core::types::ContractSpec;
/// use ftr_core::types::time::parse_datetime_utc;
/// use ftr_pricing::models::PricingModel;
/// use ftr_pricing::pricing::{price_batch, NoCurve};
///
/// let mut prices = PriceTable::default();
/// for h in 0..48 {
///     let ts = format!("2024-01-{:02}T{:02}:00:00Z", 1 + h / 24, h % 24);
///     prices.push(ts.parse().unwrap(), "FR", 40.0);
///     prices.push(ts.parse().unwrap(), "DE_LU", 43.0);
/// }
/// let start = parse_datetime_utc("2024-02-01T00:00:00Z").unwrap();
/// let end = parse_datetime_utc("2024-02-02T00:00:00Z").unwrap();
/// let specs = vec![
///     ContractSpec::obligation("FR", "DE_LU", start, end, 1.0).unwrap().with_contract_id("a"),
///     ContractSpec::obligation("DE_LU", "FR", start, end, 1.0).unwrap().with_contract_id("b"),
/// ];
///
/// let settings = Settings::builder().n_scenarios(10).build().unwrap();
/// let rows = price_batch(&specs, &prices, &NoCurve, PricingModel::HistoricalSimulation, &settings)
///     .unwrap();
/// assert_eq!(rows[0].contract_id.as_deref(), Some("a"));
/// assert!((rows[0].price - 72.0).abs() < 1e-9);
/// assert!((rows[1].price + 72.0).abs() < 1e-9);
/// ```
pub fn price_batch<P, C>(
    specs: &[ContractSpec],
    prices: &P,
    curve: &C,
    model: PricingModel,
    settings: &Settings,
) -> Result<Vec<BatchRow>, FtrError>
where
    P: PriceProvider + ?Sized,
    C: CurveProvider + ?Sized,
{
    let span = debug_span!("price_batch", contracts = specs.len(), model = model.as_str());
    let _guard = span.enter();

    let rows = specs
        .iter()
        .map(|spec| price_one(spec, prices, curve, model, settings))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(rows = rows.len(), "batch complete");
    Ok(rows)
}

/// Builds contracts from records, then values them as [`price_batch`].
///
/// # Errors
///
/// `FtrError::Contract` for the first record that does not describe a
/// valid obligation, before any contract is priced.
pub fn price_batch_records<P, C>(
    records: &[ContractSpecRecord],
    prices: &P,
    curve: &C,
    model: PricingModel,
    settings: &Settings,
) -> Result<Vec<BatchRow>, FtrError>
where
    P: PriceProvider + ?Sized,
    C: CurveProvider + ?Sized,
{
    let specs = records
        .iter()
        .map(ContractSpec::from_record)
        .collect::<Result<Vec<_>, _>>()?;
    price_batch(&specs, prices, curve, model, settings)
}

/// Values every contract, keeping each contract's outcome.
///
/// The output has one entry per input spec, in input order.
pub fn try_price_batch<P, C>(
    specs: &[ContractSpec],
    prices: &P,
    curve: &C,
    model: PricingModel,
    settings: &Settings,
) -> Vec<Result<BatchRow, FtrError>>
where
    P: PriceProvider + ?Sized,
    C: CurveProvider + ?Sized,
{
    let span = debug_span!("try_price_batch", contracts = specs.len(), model = model.as_str());
    let _guard = span.enter();

    let outcomes: Vec<_> = specs
        .iter()
        .map(|spec| price_one(spec, prices, curve, model, settings))
        .collect();
    debug!(
        failed = outcomes.iter().filter(|o| o.is_err()).count(),
        "batch complete"
    );
    outcomes
}

/// Values contracts on the Rayon pool.
///
/// Rows match [`price_batch`] exactly and keep input order. When several
/// contracts fail, which error is returned is unspecified.
pub fn price_batch_parallel<P, C>(
    specs: &[ContractSpec],
    prices: &P,
    curve: &C,
    model: PricingModel,
    settings: &Settings,
) -> Result<Vec<BatchRow>, FtrError>
where
    P: PriceProvider + Sync + ?Sized,
    C: CurveProvider + Sync + ?Sized,
{
    debug!(contracts = specs.len(), model = model.as_str(), "parallel batch");
    specs
        .par_iter()
        .map(|spec| price_one(spec, prices, curve, model, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::providers::NoCurve;
    use ftr_core::data::PriceTable;
    use ftr_core::types::time::parse_datetime_utc;
    use ftr_core::types::{ContractError, DataError};

    fn prices() -> PriceTable {
        let t0 = parse_datetime_utc("2024-01-01T00:00:00Z").unwrap();
        let mut table = PriceTable::default();
        for h in 0..336 {
            let ts = t0 + chrono::Duration::hours(h);
            let wobble = ((h * 37) % 11) as f64;
            table.push(ts.into(), "FR", 50.0 + wobble);
            table.push(ts.into(), "BE", 52.0 - wobble);
            table.push(ts.into(), "NL", 49.0);
        }
        table
    }

    fn spec(source: &str, sink: &str, id: &str) -> ContractSpec {
        let start = parse_datetime_utc("2024-02-01T00:00:00Z").unwrap();
        let end = parse_datetime_utc("2024-02-03T00:00:00Z").unwrap();
        ContractSpec::obligation(source, sink, start, end, 10.0)
            .unwrap()
            .with_contract_id(id)
    }

    fn settings() -> Settings {
        Settings::builder().n_scenarios(50).build().unwrap()
    }

    #[test]
    fn test_rows_follow_input_order() {
        let specs = vec![spec("FR", "BE", "1"), spec("BE", "NL", "2"), spec("NL", "FR", "3")];
        let rows = price_batch(
            &specs,
            &prices(),
            &NoCurve,
            PricingModel::HistoricalSimulation,
            &settings(),
        )
        .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.contract_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(rows[1].source, "BE");
        assert_eq!(rows[1].contract_type, "obligation");
        assert_eq!(rows[2].hours, 48);
    }

    #[test]
    fn test_batch_row_matches_single_valuation() {
        let table = prices();
        let s = spec("FR", "BE", "x");
        let single = price_contract(
            &s,
            &table,
            None,
            PricingModel::HistoricalSimulation,
            &settings(),
        )
        .unwrap();
        let rows = price_batch(
            &[spec("NL", "BE", "y"), s.clone()],
            &table,
            &NoCurve,
            PricingModel::HistoricalSimulation,
            &settings(),
        )
        .unwrap();
        assert_eq!(rows[1], BatchRow::new(&s, &single));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let specs: Vec<_> = (0..12)
            .map(|i| {
                let (a, b) = [("FR", "BE"), ("BE", "NL"), ("NL", "FR")][i % 3];
                spec(a, b, &i.to_string())
            })
            .collect();
        let table = prices();
        let model = PricingModel::HistoricalSimulation;
        let sequential = price_batch(&specs, &table, &NoCurve, model, &settings()).unwrap();
        let parallel = price_batch_parallel(&specs, &table, &NoCurve, model, &settings()).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_fail_fast_and_collecting() {
        let specs = vec![spec("FR", "BE", "ok"), spec("FR", "XX", "bad"), spec("BE", "NL", "ok2")];
        let table = prices();
        let model = PricingModel::HistoricalSimulation;

        let err = price_batch(&specs, &table, &NoCurve, model, &settings()).unwrap_err();
        assert!(matches!(err, FtrError::Data(DataError::NoRowsForNode(ref n)) if n == "XX"));

        let outcomes = try_price_batch(&specs, &table, &NoCurve, model, &settings());
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
        assert!(outcomes[2].is_ok());
    }

    #[test]
    fn test_per_spec_provider() {
        let table = prices();
        let provider = |spec: &ContractSpec| -> Result<PriceTable, FtrError> {
            let mut subset = PriceTable::default();
            for row in table.rows() {
                if row.node == spec.source() || row.node == spec.sink() {
                    subset.push(row.timestamp, row.node.clone(), row.price);
                }
            }
            Ok(subset)
        };
        let specs = vec![spec("FR", "BE", "1")];
        let model = PricingModel::HistoricalSimulation;
        let via_provider = price_batch(&specs, &provider, &NoCurve, model, &settings()).unwrap();
        let via_table = price_batch(&specs, &table, &NoCurve, model, &settings()).unwrap();
        assert_eq!(via_provider[0].price, via_table[0].price);
        assert_ne!(via_provider[0].data_version, via_table[0].data_version);
    }

    #[test]
    fn test_records_with_option_rejected() {
        let mut record = spec("FR", "BE", "opt").to_record();
        record.contract_type = Some("option".to_string());
        let err = price_batch_records(
            &[record],
            &prices(),
            &NoCurve,
            PricingModel::HistoricalSimulation,
            &settings(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FtrError::Contract(ContractError::UnsupportedContractType(_))
        ));
    }
}
