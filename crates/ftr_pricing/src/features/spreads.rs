//! Spread and curve construction.
//!
//! Timestamps are coerced to UTC with `Settings::tz` before any alignment.
//! Duplicate timestamps are averaged and every series is sorted ascending.

use chrono::{DateTime, Utc};
use ftr_core::config::{MissingHourPolicy, Settings};
use ftr_core::data::{CurveTable, PriceTable, TimeSeries};
use ftr_core::types::DataError;

/// Hourly price series for one node.
///
/// Under [`MissingHourPolicy::Ffill`] the series is reindexed onto the
/// hourly grid spanning its first and last observation and forward-filled;
/// leading gaps stay missing. Under [`MissingHourPolicy::Drop`] it is
/// returned as observed.
///
/// # Errors
///
/// `DataError::NoRowsForNode` when the table has no rows for `node`, or a
/// localisation error for naive timestamps that do not exist once in
/// `tz_in`.
pub fn prepare_node_prices(
    prices: &PriceTable,
    node: &str,
    settings: &Settings,
) -> Result<TimeSeries, DataError> {
    let tz = settings.tz();
    let observations = prices
        .rows_for_node(node)
        .map(|row| Ok((row.timestamp.to_utc(tz)?, row.price)))
        .collect::<Result<Vec<_>, DataError>>()?;
    if observations.is_empty() {
        return Err(DataError::NoRowsForNode(node.to_string()));
    }

    let series = TimeSeries::from_observations(observations);
    Ok(match settings.missing_hour_policy() {
        MissingHourPolicy::Drop => series,
        MissingHourPolicy::Ffill => series.reindex_hourly().ffill(),
    })
}

/// Sink price minus source price over the hours both nodes share.
///
/// # Errors
///
/// Fails if either node has no rows, or with `DataError::EmptySeries` when
/// the aligned spread has no finite value.
///
/// # Examples
///
/// ```
/// use ftr_core::config::Settings;
/// use ftr_core::data::PriceTable;
/// use ftr_pricing::features::compute_spread_series;
///
/// let mut prices = PriceTable::default();
/// for (ts, node, price) in [
///     ("2024-01-01T00:00:00Z", "FR", 40.0),
///     ("2024-01-01T00:00:00Z", "DE_LU", 45.0),
///     ("2024-01-01T01:00:00Z", "FR", 42.0),
/// ] {
///     prices.push(ts.parse().unwrap(), node, price);
/// }
///
/// let spread = compute_spread_series(&prices, "FR", "DE_LU", &Settings::default()).unwrap();
/// assert_eq!(spread.values(), &[5.0]);
/// ```
pub fn compute_spread_series(
    prices: &PriceTable,
    source: &str,
    sink: &str,
    settings: &Settings,
) -> Result<TimeSeries, DataError> {
    let source_series = prepare_node_prices(prices, source, settings)?;
    let sink_series = prepare_node_prices(prices, sink, settings)?;
    let spread = sink_series.inner_difference(&source_series);
    if !spread.has_finite() {
        return Err(DataError::EmptySeries("spread"));
    }
    Ok(spread)
}

/// Curve values on exactly `contract_hours`.
///
/// Hours without a curve point are filled forward, then backward.
///
/// # Errors
///
/// `DataError::EmptySeries("curve")` when no curve point can reach the
/// contract hours, so some hour would stay missing.
pub fn prepare_curve(
    curve: &CurveTable,
    contract_hours: &[DateTime<Utc>],
    settings: &Settings,
) -> Result<TimeSeries, DataError> {
    let tz = settings.tz();
    let observations = curve
        .rows()
        .iter()
        .map(|row| Ok((row.timestamp.to_utc(tz)?, row.value)))
        .collect::<Result<Vec<_>, DataError>>()?;

    let prepared = TimeSeries::from_observations(observations)
        .reindex(contract_hours)
        .ffill()
        .bfill();
    if prepared.has_missing() {
        return Err(DataError::EmptySeries("curve"));
    }
    Ok(prepared)
}

/// Historical spread mean repeated over every contract hour.
pub fn flat_curve(spread: &TimeSeries, contract_hours: &[DateTime<Utc>]) -> TimeSeries {
    TimeSeries::constant(contract_hours, spread.mean())
}
