//! Pricing settings.
//!
//! [`Settings`] is an immutable value threaded explicitly through every
//! pricing call. Construct it with [`Settings::builder`], from a TOML
//! document, or take [`Settings::default`].

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::types::error::ConfigError;
use crate::types::time::parse_timezone;

/// Default number of Monte Carlo scenarios.
pub const DEFAULT_N_SCENARIOS: usize = 500;

/// Default bootstrap block length in days.
pub const DEFAULT_BLOCK_LENGTH_DAYS: usize = 7;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 123;

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".ftr_cache/ftr";

/// Gap handling for a node's hourly price series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingHourPolicy {
    /// Keep the series exactly as observed.
    #[default]
    Drop,
    /// Reindex onto a contiguous hourly grid and forward-fill.
    Ffill,
}

impl MissingHourPolicy {
    /// Lowercase policy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingHourPolicy::Drop => "drop",
            MissingHourPolicy::Ffill => "ffill",
        }
    }
}

impl FromStr for MissingHourPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(MissingHourPolicy::Drop),
            "ffill" => Ok(MissingHourPolicy::Ffill),
            _ => Err(ConfigError::InvalidMissingHourPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for MissingHourPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable pricing configuration.
///
/// # Examples
///
/// ```rust
/// use ftr_core::config::{MissingHourPolicy, Settings};
///
/// let settings = Settings::builder()
///     .tz_in("Europe/Brussels")
///     .n_scenarios(1_000)
///     .block_length_days(3)
///     .seed(42)
///     .missing_hour_policy(MissingHourPolicy::Ffill)
///     .build()
///     .expect("valid settings");
///
/// assert_eq!(settings.n_scenarios(), 1_000);
/// assert_eq!(settings.tz().name(), "Europe/Brussels");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Settings {
    cache_dir: PathBuf,
    tz_in: String,
    #[serde(skip)]
    tz: Tz,
    n_scenarios: usize,
    block_length_days: usize,
    seed: u64,
    missing_hour_policy: MissingHourPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            tz_in: "UTC".to_string(),
            tz: Tz::UTC,
            n_scenarios: DEFAULT_N_SCENARIOS,
            block_length_days: DEFAULT_BLOCK_LENGTH_DAYS,
            seed: DEFAULT_SEED,
            missing_hour_policy: MissingHourPolicy::Drop,
        }
    }
}

impl Settings {
    /// Creates a builder seeded with default values.
    #[inline]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Creates a builder holding this configuration.
    pub fn to_builder(&self) -> SettingsBuilder {
        SettingsBuilder {
            cache_dir: Some(self.cache_dir.clone()),
            tz_in: Some(self.tz_in.clone()),
            n_scenarios: Some(self.n_scenarios as i64),
            block_length_days: Some(self.block_length_days as i64),
            seed: Some(self.seed as i64),
            missing_hour_policy: self.missing_hour_policy,
        }
    }

    /// Parses settings from a TOML document. Absent keys take defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ftr_core::config::Settings;
    ///
    /// let settings = Settings::from_toml_str("n_scenarios = 50\nseed = 7").unwrap();
    /// assert_eq!(settings.n_scenarios(), 50);
    /// assert_eq!(settings.seed(), 7);
    /// assert!(Settings::from_toml_str("seed = -1").is_err());
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        file.into_builder()?.build()
    }

    /// Loads settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Cache root directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Timezone name applied to naive input timestamps.
    pub fn tz_in(&self) -> &str {
        &self.tz_in
    }

    /// Parsed form of [`Settings::tz_in`].
    ///
    /// The name is validated when the settings are built, so this never
    /// fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ftr_core::config::Settings;
    ///
    /// let settings = Settings::builder().tz_in("Europe/Paris").build().unwrap();
    /// assert_eq!(settings.tz(), chrono_tz::Europe::Paris);
    /// ```
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Number of bootstrap scenarios per contract.
    pub fn n_scenarios(&self) -> usize {
        self.n_scenarios
    }

    /// Bootstrap block size in days.
    pub fn block_length_days(&self) -> usize {
        self.block_length_days
    }

    /// Deterministic RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Gap handling for node price series.
    pub fn missing_hour_policy(&self) -> MissingHourPolicy {
        self.missing_hour_policy
    }

    /// JSON with sorted keys; the form hashed into data versions.
    ///
    /// # Returns
    ///
    /// Compact JSON text. Two settings values produce the same text exactly
    /// when every field is equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use ftr_core::config::Settings;
    ///
    /// let json = Settings::default().canonical_json().unwrap();
    /// assert!(json.starts_with("{\"block_length_days\":7,"));
    /// ```
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        // Round-tripping through Value sorts object keys.
        let value = serde_json::to_value(self)?;
        serde_json::to_string(&value)
    }

    /// Canonical settings as a JSON value.
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Builder for [`Settings`].
///
/// Numeric options are taken as signed integers so that out-of-range values
/// from untyped sources surface as `ConfigError` rather than wrapping.
#[derive(Clone, Debug, Default)]
pub struct SettingsBuilder {
    cache_dir: Option<PathBuf>,
    tz_in: Option<String>,
    n_scenarios: Option<i64>,
    block_length_days: Option<i64>,
    seed: Option<i64>,
    missing_hour_policy: MissingHourPolicy,
}

impl SettingsBuilder {
    /// Sets the cache root directory.
    #[inline]
    pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    /// Sets the timezone for naive timestamps.
    #[inline]
    pub fn tz_in(mut self, tz_in: impl Into<String>) -> Self {
        self.tz_in = Some(tz_in.into());
        self
    }

    /// Sets the scenario count (>= 1).
    #[inline]
    pub fn n_scenarios(mut self, n_scenarios: i64) -> Self {
        self.n_scenarios = Some(n_scenarios);
        self
    }

    /// Sets the block length in days (>= 1).
    #[inline]
    pub fn block_length_days(mut self, block_length_days: i64) -> Self {
        self.block_length_days = Some(block_length_days);
        self
    }

    /// Sets the RNG seed (>= 0).
    #[inline]
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the missing-hour policy.
    #[inline]
    pub fn missing_hour_policy(mut self, policy: MissingHourPolicy) -> Self {
        self.missing_hour_policy = policy;
        self
    }

    /// Validates and builds the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `n_scenarios` < 1
    /// - `block_length_days` < 1
    /// - `seed` < 0
    /// - `tz_in` is not an IANA timezone name
    pub fn build(self) -> Result<Settings, ConfigError> {
        let n_scenarios = self.n_scenarios.unwrap_or(DEFAULT_N_SCENARIOS as i64);
        if n_scenarios < 1 {
            return Err(ConfigError::InvalidScenarioCount(n_scenarios));
        }
        let block_length_days = self
            .block_length_days
            .unwrap_or(DEFAULT_BLOCK_LENGTH_DAYS as i64);
        if block_length_days < 1 {
            return Err(ConfigError::InvalidBlockLength(block_length_days));
        }
        let seed = self.seed.unwrap_or(DEFAULT_SEED as i64);
        if seed < 0 {
            return Err(ConfigError::InvalidSeed(seed));
        }
        let tz_in = self.tz_in.unwrap_or_else(|| "UTC".to_string());
        let tz = parse_timezone(&tz_in)?;

        Ok(Settings {
            cache_dir: self
                .cache_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            tz_in,
            tz,
            n_scenarios: n_scenarios as usize,
            block_length_days: block_length_days as usize,
            seed: seed as u64,
            missing_hour_policy: self.missing_hour_policy,
        })
    }
}

/// TOML document shape.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    cache_dir: Option<PathBuf>,
    tz_in: Option<String>,
    n_scenarios: Option<i64>,
    block_length_days: Option<i64>,
    seed: Option<i64>,
    missing_hour_policy: Option<String>,
}

impl SettingsFile {
    fn into_builder(self) -> Result<SettingsBuilder, ConfigError> {
        let missing_hour_policy = match self.missing_hour_policy {
            Some(raw) => raw.parse()?,
            None => MissingHourPolicy::default(),
        };
        Ok(SettingsBuilder {
            cache_dir: self.cache_dir,
            tz_in: self.tz_in,
            n_scenarios: self.n_scenarios,
            block_length_days: self.block_length_days,
            seed: self.seed,
            missing_hour_policy,
        })
    }
}
