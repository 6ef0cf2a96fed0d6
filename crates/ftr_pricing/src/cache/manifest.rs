//! Cache manifest and input ingestion.
//!
//! Layout under the configured cache root:
//!
//! ```text
//! <cache_dir>/
//!   <data_version>/
//!     prices.csv
//!     curve.csv
//!     manifest.json
//! ```
//!
//! A manifest is written once per data version. Writing again at the same
//! location replaces the previous manifest without merging.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ftr_core::config::Settings;
use ftr_core::types::FtrError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::version::{compute_data_version, posix_path, CODE_VERSION};

/// Manifest file name inside a cache directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Persisted audit record for one data version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Digest the cached inputs were recorded under
    pub data_version: String,
    /// Settings in effect, sorted-key JSON object
    pub settings: serde_json::Value,
    /// Source file paths, `/`-separated
    pub files: Vec<String>,
}

/// Outcome of [`cache_inputs`].
#[derive(Clone, Debug, PartialEq)]
pub struct CachedInputs {
    /// Digest of code, settings and file contents
    pub data_version: String,
    /// `<cache_dir>/<data_version>`
    pub directory: PathBuf,
    /// Path of the written manifest
    pub manifest_path: PathBuf,
    /// Copies of the input files inside `directory`
    pub files: Vec<PathBuf>,
}

/// Creates the configured cache root if needed and returns it.
pub fn ensure_cache_dir(settings: &Settings) -> Result<PathBuf, FtrError> {
    let cache_dir = settings.cache_dir().to_path_buf();
    fs::create_dir_all(&cache_dir)?;
    Ok(cache_dir)
}

/// Writes `manifest.json` into `cache_dir`, replacing any existing one.
///
/// The JSON is pretty-printed with two-space indentation.
///
/// # Examples
///
/// ```
/// use ftr_core::config::Settings;
/// use ftr_pricing::cache::{read_cache_manifest, write_cache_manifest};
///
/// let dir = tempfile::tempdir().unwrap();
/// let settings = Settings::default();
/// write_cache_manifest(dir.path(), "abc123", &settings, &["data/prices.csv"]).unwrap();
///
/// let manifest = read_cache_manifest(dir.path()).unwrap();
/// assert_eq!(manifest.data_version, "abc123");
/// assert_eq!(manifest.files, vec!["data/prices.csv".to_string()]);
/// ```
pub fn write_cache_manifest<P: AsRef<Path>>(
    cache_dir: &Path,
    data_version: &str,
    settings: &Settings,
    file_paths: &[P],
) -> Result<PathBuf, FtrError> {
    let manifest = CacheManifest {
        data_version: data_version.to_string(),
        settings: settings.to_json_value()?,
        files: file_paths.iter().map(|p| posix_path(p.as_ref())).collect(),
    };
    fs::create_dir_all(cache_dir)?;
    let manifest_path = cache_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    debug!(path = %manifest_path.display(), data_version, "wrote cache manifest");
    Ok(manifest_path)
}

/// Reads `manifest.json` from `cache_dir`.
pub fn read_cache_manifest(cache_dir: &Path) -> Result<CacheManifest, FtrError> {
    let content = fs::read_to_string(cache_dir.join(MANIFEST_FILE))?;
    Ok(serde_json::from_str(&content)?)
}

/// Copies input files under `<cache_dir>/<data_version>/` and records a
/// manifest beside them.
///
/// The data version covers the code version, the settings, and each file's
/// path and bytes.
///
/// # Errors
///
/// `FtrError::Io` when a file cannot be read or copied, or a path has no
/// file name.
pub fn cache_inputs<P: AsRef<Path>>(
    file_paths: &[P],
    settings: &Settings,
) -> Result<CachedInputs, FtrError> {
    let root = ensure_cache_dir(settings)?;
    let data_version = compute_data_version(CODE_VERSION, settings, file_paths, &[])?;
    let directory = root.join(&data_version);
    fs::create_dir_all(&directory)?;

    let mut files = Vec::with_capacity(file_paths.len());
    for path in file_paths {
        let path = path.as_ref();
        let name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("input path has no file name: {}", path.display()),
            )
        })?;
        let target = directory.join(name);
        fs::copy(path, &target)?;
        files.push(target);
    }

    let manifest_path = write_cache_manifest(&directory, &data_version, settings, file_paths)?;
    debug!(directory = %directory.display(), %data_version, "cached inputs");
    Ok(CachedInputs {
        data_version,
        directory,
        manifest_path,
        files,
    })
}
