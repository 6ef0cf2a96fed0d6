//! Data-version cache.
//!
//! This module provides:
//! - `version`: content hashing of tables and files, and the data-version
//!   digest that tags every valuation
//! - `manifest`: the on-disk manifest and input ingestion under
//!   `<cache_dir>/<data_version>/`

pub mod manifest;
pub mod version;

pub use manifest::{
    cache_inputs, ensure_cache_dir, read_cache_manifest, write_cache_manifest, CacheManifest,
    CachedInputs, MANIFEST_FILE,
};
pub use version::{compute_data_version, hash_file, ContentHash, CODE_VERSION};
