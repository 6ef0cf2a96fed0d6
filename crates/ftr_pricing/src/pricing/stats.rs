//! Summary statistics of a scenario payoff distribution.

use serde::{Deserialize, Serialize};

/// Mean, population standard deviation and tail percentiles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayoffStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation (divisor `n`)
    pub stdev: f64,
    /// 5th percentile, linear interpolation
    pub p5: f64,
    /// 95th percentile, linear interpolation
    pub p95: f64,
}

impl PayoffStats {
    /// Summarises `payoffs`; `None` when the slice is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ftr_pricing::pricing::PayoffStats;
    ///
    /// let stats = PayoffStats::from_payoffs(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    /// assert_eq!(stats.mean, 3.0);
    /// assert!((stats.stdev - 2.0_f64.sqrt()).abs() < 1e-12);
    /// assert!((stats.p5 - 1.2).abs() < 1e-12);
    /// assert!((stats.p95 - 4.8).abs() < 1e-12);
    /// ```
    pub fn from_payoffs(payoffs: &[f64]) -> Option<Self> {
        if payoffs.is_empty() {
            return None;
        }
        let n = payoffs.len() as f64;
        let mean = payoffs.iter().sum::<f64>() / n;
        let variance = payoffs.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = payoffs.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            mean,
            stdev: variance.sqrt(),
            p5: percentile(&sorted, 0.05),
            p95: percentile(&sorted, 0.95),
        })
    }
}

/// Linear-interpolated quantile of ascending `sorted` at `q` in `[0, 1]`.
///
/// Position is `q * (n - 1)`; returns `NaN` for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let weight = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_single_payoff() {
        let stats = PayoffStats::from_payoffs(&[-15.0]).unwrap();
        assert_eq!(stats.mean, -15.0);
        assert_eq!(stats.stdev, 0.0);
        assert_eq!(stats.p5, -15.0);
        assert_eq!(stats.p95, -15.0);
    }

    #[test]
    fn test_empty_payoffs() {
        assert!(PayoffStats::from_payoffs(&[]).is_none());
        assert!(percentile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted: Vec<f64> = (0..=20).map(f64::from).collect();
        assert_relative_eq!(percentile(&sorted, 0.05), 1.0);
        assert_relative_eq!(percentile(&sorted, 0.95), 19.0);
        assert_relative_eq!(percentile(&[0.0, 10.0], 0.05), 0.5);
    }

    #[test]
    fn test_population_stdev() {
        let stats = PayoffStats::from_payoffs(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(stats.mean, 5.0);
        assert_relative_eq!(stats.stdev, 2.0);
    }

    proptest! {
        #[test]
        fn prop_percentiles_within_range(values in prop::collection::vec(-1e3f64..1e3, 1..200)) {
            let stats = PayoffStats::from_payoffs(&values).unwrap();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(stats.p5 <= stats.p95);
            prop_assert!(stats.p5 >= min - 1e-9 && stats.p95 <= max + 1e-9);
            prop_assert!(stats.stdev >= 0.0);
        }
    }
}
