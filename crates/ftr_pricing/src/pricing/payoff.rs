//! Hourly and scenario payoffs.

use ftr_core::types::ContractType;

/// Payoff for one hour at the given spread.
///
/// Obligations settle the spread as is, positive or negative. Options are
/// floored at zero; `ContractSpec` does not currently admit them, so only
/// direct callers reach that branch.
///
/// # Examples
///
/// ```
/// use ftr_core::types::ContractType;
/// use ftr_pricing::pricing::hourly_payoff;
///
/// assert_eq!(hourly_payoff(-4.0, ContractType::Obligation), -4.0);
/// assert_eq!(hourly_payoff(-4.0, ContractType::Option), 0.0);
/// ```
#[inline]
pub fn hourly_payoff(spread: f64, contract_type: ContractType) -> f64 {
    match contract_type {
        ContractType::Obligation => spread,
        ContractType::Option => spread.max(0.0),
    }
}

/// Total payoff per scenario, scaled by `mw` after summing.
///
/// Each scenario's hour `h` spread is `curve[h] + scenario[h]`. Scenarios are
/// expected to be as long as the curve; surplus entries on either side are
/// ignored.
pub fn scenario_payoffs(
    curve: &[f64],
    scenarios: &[Vec<f64>],
    contract_type: ContractType,
    mw: f64,
) -> Vec<f64> {
    scenarios
        .iter()
        .map(|scenario| {
            let total: f64 = curve
                .iter()
                .zip(scenario)
                .map(|(base, residual)| hourly_payoff(base + residual, contract_type))
                .sum();
            total * mw
        })
        .collect()
}
