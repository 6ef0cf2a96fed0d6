//! UTC-indexed numeric series.
//!
//! [`TimeSeries`] is a strictly increasing UTC index with one `f64` per
//! entry. Non-finite values (`NaN`, `±inf`) are treated as missing by every
//! statistic and fill operation.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::types::error::DataError;

/// Strictly time-ordered series keyed by UTC instant.
///
/// # Examples
///
/// ```
/// use ftr_core::data::TimeSeries;
/// use ftr_core::types::time::parse_datetime_utc;
///
/// let t0 = parse_datetime_utc("2024-01-01T00:00:00Z").unwrap();
/// let t1 = parse_datetime_utc("2024-01-01T01:00:00Z").unwrap();
///
/// // Duplicates collapse to their mean, output is sorted
/// let series = TimeSeries::from_observations(vec![(t1, 4.0), (t0, 1.0), (t1, 6.0)]);
/// assert_eq!(series.index(), &[t0, t1]);
/// assert_eq!(series.values(), &[1.0, 5.0]);
/// assert_eq!(series.mean(), 3.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeries {
    index: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Creates a series from parallel index and value vectors.
    ///
    /// # Errors
    ///
    /// Returns `DataError::InvalidSeries` if the lengths differ or the index
    /// is not strictly increasing.
    pub fn new(index: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self, DataError> {
        if index.len() != values.len() {
            return Err(DataError::InvalidSeries(format!(
                "index has {} entries, values have {}",
                index.len(),
                values.len()
            )));
        }
        if let Some(pos) = index.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DataError::InvalidSeries(format!(
                "index not strictly increasing at position {}",
                pos + 1
            )));
        }
        Ok(Self { index, values })
    }

    /// Collapses observations into a sorted series, averaging duplicates.
    ///
    /// Missing values are skipped when averaging; a timestamp whose
    /// observations are all missing keeps a `NaN`.
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        let mut groups: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
        for (ts, value) in observations {
            let slot = groups.entry(ts).or_insert((0.0, 0));
            if value.is_finite() {
                slot.0 += value;
                slot.1 += 1;
            }
        }

        let mut index = Vec::with_capacity(groups.len());
        let mut values = Vec::with_capacity(groups.len());
        for (ts, (sum, count)) in groups {
            index.push(ts);
            values.push(if count > 0 { sum / count as f64 } else { f64::NAN });
        }
        Self { index, values }
    }

    /// Repeats `value` at every instant of `index`.
    pub fn constant(index: &[DateTime<Utc>], value: f64) -> Self {
        Self {
            index: index.to_vec(),
            values: vec![value; index.len()],
        }
    }

    /// Number of entries, including missing ones.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true when the series has no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// UTC index.
    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// Values aligned with [`TimeSeries::index`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates `(instant, value)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `ts`, if the instant is present.
    pub fn get(&self, ts: DateTime<Utc>) -> Option<f64> {
        self.index
            .binary_search(&ts)
            .ok()
            .map(|pos| self.values[pos])
    }

    /// Returns true if at least one value is finite.
    pub fn has_finite(&self) -> bool {
        self.values.iter().any(|v| v.is_finite())
    }

    /// Returns true if any value is missing.
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Mean of finite values, `NaN` if there are none.
    pub fn mean(&self) -> f64 {
        let (sum, count) = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }

    /// Subtracts `offset` from every value.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            index: self.index.clone(),
            values: self.values.iter().map(|v| v - offset).collect(),
        }
    }

    /// Looks up every instant of `index` exactly; absent instants become `NaN`.
    pub fn reindex(&self, index: &[DateTime<Utc>]) -> Self {
        let values = index
            .iter()
            .map(|ts| self.get(*ts).unwrap_or(f64::NAN))
            .collect();
        Self {
            index: index.to_vec(),
            values,
        }
    }

    /// Reindexes onto the hourly grid from the first to the last instant.
    ///
    /// The grid is anchored at the first instant; observations off the grid
    /// are dropped.
    pub fn reindex_hourly(&self) -> Self {
        let (Some(&first), Some(&last)) = (self.index.first(), self.index.last()) else {
            return self.clone();
        };
        let mut grid = Vec::new();
        let mut cursor = first;
        while cursor <= last {
            grid.push(cursor);
            cursor += Duration::hours(1);
        }
        self.reindex(&grid)
    }

    /// Propagates the last finite value forward over missing entries.
    ///
    /// Leading missing entries stay missing.
    pub fn ffill(&self) -> Self {
        let mut last = None;
        let values = self
            .values
            .iter()
            .map(|&v| {
                if v.is_finite() {
                    last = Some(v);
                    v
                } else {
                    last.unwrap_or(v)
                }
            })
            .collect();
        Self {
            index: self.index.clone(),
            values,
        }
    }

    /// Propagates the next finite value backward over missing entries.
    ///
    /// Trailing missing entries stay missing.
    pub fn bfill(&self) -> Self {
        let mut next = None;
        let mut values: Vec<f64> = self
            .values
            .iter()
            .rev()
            .map(|&v| {
                if v.is_finite() {
                    next = Some(v);
                    v
                } else {
                    next.unwrap_or(v)
                }
            })
            .collect();
        values.reverse();
        Self {
            index: self.index.clone(),
            values,
        }
    }

    /// `self - other` over the instants present in both series.
    ///
    /// # Examples
    ///
    /// ```
    /// use ftr_core::data::TimeSeries;
    /// use ftr_core::types::time::parse_datetime_utc;
    ///
    /// let t = |h: u32| parse_datetime_utc(&format!("2024-01-01T{:02}:00:00Z", h)).unwrap();
    /// let sink = TimeSeries::from_observations(vec![(t(0), 10.0), (t(1), 12.0)]);
    /// let source = TimeSeries::from_observations(vec![(t(1), 2.0), (t(2), 3.0)]);
    ///
    /// let spread = sink.inner_difference(&source);
    /// assert_eq!(spread.index(), &[t(1)]);
    /// assert_eq!(spread.values(), &[10.0]);
    /// ```
    pub fn inner_difference(&self, other: &TimeSeries) -> Self {
        let mut index = Vec::new();
        let mut values = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            match self.index[i].cmp(&other.index[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    index.push(self.index[i]);
                    values.push(self.values[i] - other.values[j]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Self { index, values }
    }
}
