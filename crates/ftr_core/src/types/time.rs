//! UTC-safe time utilities for hourly electricity market data.
//!
//! This module provides:
//! - `RawTimestamp`: A timestamp as observed in an input table, naive or zoned
//! - Localisation of naive timestamps with daylight-saving awareness
//! - Hourly UTC index generation (`hourly_index_utc`)
//! - Local-day to UTC hour conversion (`utc_index_for_local_day`)
//! - Calendar-month splitting of UTC windows (`iter_month_ranges`)
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use ftr_core::types::time::{parse_timezone, utc_index_for_local_day};
//!
//! let brussels = parse_timezone("Europe/Brussels").unwrap();
//! let spring_forward = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
//! let hours = utc_index_for_local_day(spring_forward, brussels).unwrap();
//! assert_eq!(hours.len(), 23);
//! ```

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

use super::error::{ConfigError, DataError};

/// Zoned formats tried after RFC 3339.
const ZONED_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Naive datetime formats, most specific first.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A timestamp as it appears in an input table.
///
/// Naive values carry no offset and are localised with the configured input
/// timezone before use. Zoned values are absolute instants.
///
/// # Examples
///
/// ```
/// use ftr_core::types::time::RawTimestamp;
///
/// let naive: RawTimestamp = "2024-01-01 13:00:00".parse().unwrap();
/// assert!(naive.is_naive());
///
/// let zoned: RawTimestamp = "2024-01-01T13:00:00+01:00".parse().unwrap();
/// assert!(!zoned.is_naive());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawTimestamp {
    /// Wall-clock time without offset.
    Naive(NaiveDateTime),
    /// Absolute instant with a fixed offset.
    Zoned(DateTime<FixedOffset>),
}

impl RawTimestamp {
    /// Parses ISO 8601 text (zoned or naive), a bare date, or integer epoch seconds.
    ///
    /// Epoch seconds are absolute instants and are never re-localised.
    pub fn parse(s: &str) -> Result<Self, DataError> {
        let text = s.trim();
        if text.is_empty() {
            return Err(DataError::InvalidTimestamp(s.to_string()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(RawTimestamp::Zoned(dt));
        }
        for fmt in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
                return Ok(RawTimestamp::Zoned(dt));
            }
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
                return Ok(RawTimestamp::Naive(naive));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(RawTimestamp::Naive(naive));
            }
        }
        if let Ok(secs) = text.parse::<i64>() {
            if let LocalResult::Single(dt) = Utc.timestamp_opt(secs, 0) {
                return Ok(RawTimestamp::Zoned(dt.into()));
            }
        }

        Err(DataError::InvalidTimestamp(s.to_string()))
    }

    /// Returns true when the timestamp carries no offset.
    pub fn is_naive(&self) -> bool {
        matches!(self, RawTimestamp::Naive(_))
    }

    /// Converts to UTC, localising naive values in `tz_in`.
    ///
    /// # Errors
    ///
    /// Returns `DataError` when a naive value is ambiguous or non-existent in
    /// `tz_in` (daylight-saving overlap or gap).
    pub fn to_utc(&self, tz_in: Tz) -> Result<DateTime<Utc>, DataError> {
        match self {
            RawTimestamp::Naive(naive) => localize(*naive, tz_in),
            RawTimestamp::Zoned(dt) => Ok(dt.with_timezone(&Utc)),
        }
    }

    /// Canonical ISO 8601 text; the recorded text of rows built in memory.
    pub fn canonical(&self) -> String {
        match self {
            RawTimestamp::Naive(naive) => naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            RawTimestamp::Zoned(dt) => dt.to_rfc3339(),
        }
    }
}

impl FromStr for RawTimestamp {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RawTimestamp::parse(s)
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        RawTimestamp::Zoned(dt.into())
    }
}

impl From<NaiveDateTime> for RawTimestamp {
    fn from(naive: NaiveDateTime) -> Self {
        RawTimestamp::Naive(naive)
    }
}

/// Parses an IANA timezone name.
///
/// # Examples
///
/// ```
/// use ftr_core::types::time::parse_timezone;
///
/// assert!(parse_timezone("Europe/Paris").is_ok());
/// assert!(parse_timezone("Mars/Olympus").is_err());
/// ```
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}

/// Localises a naive wall-clock time in `tz` and converts it to UTC.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, DataError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, _) => Err(DataError::AmbiguousLocalTime {
            timestamp: naive.to_string(),
            tz: tz.name().to_string(),
        }),
        LocalResult::None => Err(DataError::NonexistentLocalTime {
            timestamp: naive.to_string(),
            tz: tz.name().to_string(),
        }),
    }
}

/// Treats a naive timestamp as UTC; converts a zoned one.
pub fn ensure_utc(ts: RawTimestamp) -> DateTime<Utc> {
    match ts {
        RawTimestamp::Naive(naive) => Utc.from_utc_datetime(&naive),
        RawTimestamp::Zoned(dt) => dt.with_timezone(&Utc),
    }
}

/// Parses timestamp text into a UTC instant, reading naive text as UTC.
///
/// # Examples
///
/// ```
/// use ftr_core::types::time::parse_datetime_utc;
///
/// let a = parse_datetime_utc("2024-01-01T00:00:00").unwrap();
/// let b = parse_datetime_utc("2024-01-01T01:00:00+01:00").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_datetime_utc(s: &str) -> Result<DateTime<Utc>, DataError> {
    RawTimestamp::parse(s).map(ensure_utc)
}

/// Every UTC hour in `[start, end)`, anchored at `start`.
///
/// Returns an empty index when `end <= start`.
pub fn hourly_index_utc(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut index = Vec::new();
    let mut cursor = start;
    while cursor < end {
        index.push(cursor);
        cursor += Duration::hours(1);
    }
    index
}

/// UTC instants of every local hour of `local_day` in `tz`.
///
/// The result has 23 entries on a spring-forward day, 25 on a fall-back day
/// and 24 otherwise.
pub fn utc_index_for_local_day(
    local_day: NaiveDate,
    tz: Tz,
) -> Result<Vec<DateTime<Utc>>, DataError> {
    let start = local_day_start(local_day, tz)?;
    let next_day = local_day
        .succ_opt()
        .ok_or_else(|| DataError::InvalidTimestamp(local_day.to_string()))?;
    let end = local_day_start(next_day, tz)?;
    Ok(hourly_index_utc(start, end))
}

/// First existing instant of a local calendar day.
fn local_day_start(day: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, DataError> {
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DataError::InvalidTimestamp(day.to_string()))?;
    // Some zones skip midnight itself; take the first hour that exists.
    for hour in 0..3 {
        let candidate = midnight + Duration::hours(hour);
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    Err(DataError::NonexistentLocalTime {
        timestamp: midnight.to_string(),
        tz: tz.name().to_string(),
    })
}

/// Iterator over `[start, end)` chunks split at UTC calendar-month boundaries.
///
/// # Examples
///
/// ```
/// use ftr_core::types::time::{iter_month_ranges, parse_datetime_utc};
///
/// let start = parse_datetime_utc("2024-01-15T00:00:00Z").unwrap();
/// let end = parse_datetime_utc("2024-03-02T00:00:00Z").unwrap();
/// let chunks: Vec<_> = iter_month_ranges(start, end).collect();
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[0].0, start);
/// assert_eq!(chunks[2].1, end);
/// ```
pub fn iter_month_ranges(start: DateTime<Utc>, end: DateTime<Utc>) -> MonthRanges {
    MonthRanges { cursor: start, end }
}

/// Iterator returned by [`iter_month_ranges`].
#[derive(Clone, Debug)]
pub struct MonthRanges {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Iterator for MonthRanges {
    type Item = (DateTime<Utc>, DateTime<Utc>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }
        let (year, month) = if self.cursor.month() == 12 {
            (self.cursor.year() + 1, 1)
        } else {
            (self.cursor.year(), self.cursor.month() + 1)
        };
        let next_month = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
        let chunk_end = Utc.from_utc_datetime(&next_month).min(self.end);
        let chunk = (self.cursor, chunk_end);
        self.cursor = chunk_end;
        Some(chunk)
    }
}
