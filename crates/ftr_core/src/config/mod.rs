//! Pricing configuration.

pub mod settings;

pub use settings::{
    MissingHourPolicy, Settings, SettingsBuilder, DEFAULT_BLOCK_LENGTH_DAYS, DEFAULT_CACHE_DIR,
    DEFAULT_N_SCENARIOS, DEFAULT_SEED,
};
