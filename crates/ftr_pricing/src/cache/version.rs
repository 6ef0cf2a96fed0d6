//! Data-version digests.
//!
//! A data version is the hex SHA-256 of, in order:
//! 1. the code version string
//! 2. the settings as sorted-key JSON
//! 3. for each input file, its `/`-separated path and the hex digest of its bytes
//! 4. the hex content hash of each in-memory table
//!
//! Table hashes cover the header in source order, then every cell of every
//! row in that order: timestamp text as read, extra columns included.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use ftr_core::config::Settings;
use ftr_core::data::{Cell, CurveTable, PriceTable};
use ftr_core::types::FtrError;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Version string mixed into every data version.
pub const CODE_VERSION: &str = env!("CARGO_PKG_VERSION");

const READ_CHUNK: usize = 1024 * 1024;

/// Order-sensitive content digest of a table.
pub trait ContentHash {
    /// Hex SHA-256 over the table's columns and rows.
    fn content_hash(&self) -> String;
}

fn empty_hash() -> String {
    hex::encode(Sha256::digest(b"empty"))
}

/// Length-prefixed so adjacent strings cannot run together.
fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn update_columns(hasher: &mut Sha256, columns: &[&str]) {
    hasher.update((columns.len() as u64).to_le_bytes());
    for column in columns {
        update_str(hasher, column);
    }
}

/// Tagged so a text cell can never collide with a number.
fn update_cell(hasher: &mut Sha256, cell: Cell<'_>) {
    match cell {
        Cell::Text(text) => {
            hasher.update([0u8]);
            update_str(hasher, text);
        }
        Cell::Number(value) => {
            hasher.update([1u8]);
            hasher.update(value.to_le_bytes());
        }
    }
}

impl ContentHash for PriceTable {
    fn content_hash(&self) -> String {
        if self.is_empty() {
            return empty_hash();
        }
        let mut hasher = Sha256::new();
        update_columns(&mut hasher, &self.columns());
        for row in self.rows() {
            for cell in self.cells(row) {
                update_cell(&mut hasher, cell);
            }
        }
        hex::encode(hasher.finalize())
    }
}

impl ContentHash for CurveTable {
    fn content_hash(&self) -> String {
        if self.is_empty() {
            return empty_hash();
        }
        let mut hasher = Sha256::new();
        update_columns(&mut hasher, &self.columns());
        for row in self.rows() {
            for cell in self.cells(row) {
                update_cell(&mut hasher, cell);
            }
        }
        hex::encode(hasher.finalize())
    }
}

/// Hex SHA-256 of a file's bytes, read in 1 MiB chunks.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Path text with `/` separators.
pub(crate) fn posix_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Digest identifying code, settings and inputs together.
///
/// Any change to the code version, a setting, a file's path or bytes, or a
/// table's header or cells yields a different digest.
///
/// # Arguments
///
/// * `code_version` - Release identifier, normally [`CODE_VERSION`]
/// * `settings` - Engine settings, hashed as sorted-key JSON
/// * `file_paths` - Input files, hashed in the order given
/// * `tables` - In-memory tables, hashed in the order given
///
/// # Returns
///
/// The 64-character lowercase hex SHA-256 digest.
///
/// # Errors
///
/// `FtrError::Io` if an input file cannot be read;
/// `FtrError::Serialization` if settings cannot be serialised.
///
/// # Examples
///
/// ```
/// use ftr_core::config::Settings;
/// use ftr_core::data::PriceTable;
/// use ftr_pricing::cache::{compute_data_version, ContentHash, CODE_VERSION};
///
/// let mut prices = PriceTable::default();
/// prices.push("2024-01-01T00:00:00Z".parse().unwrap(), "FR", 50.0);
///
/// let settings = Settings::default();
/// let tables: [&dyn ContentHash; 1] = [&prices];
/// let a = compute_data_version(CODE_VERSION, &settings, &[] as &[&str], &tables).unwrap();
/// let b = compute_data_version(CODE_VERSION, &settings, &[] as &[&str], &tables).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn compute_data_version<P: AsRef<Path>>(
    code_version: &str,
    settings: &Settings,
    file_paths: &[P],
    tables: &[&dyn ContentHash],
) -> Result<String, FtrError> {
    let mut hasher = Sha256::new();
    hasher.update(code_version.as_bytes());
    hasher.update(settings.canonical_json()?.as_bytes());

    for path in file_paths {
        let path = path.as_ref();
        hasher.update(posix_path(path).as_bytes());
        hasher.update(hash_file(path)?.as_bytes());
    }
    for table in tables {
        hasher.update(table.content_hash().as_bytes());
    }

    let data_version = hex::encode(hasher.finalize());
    debug!(
        files = file_paths.len(),
        tables = tables.len(),
        %data_version,
        "computed data version"
    );
    Ok(data_version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prices(rows: &[(&str, &str, f64)]) -> PriceTable {
        let mut table = PriceTable::default();
        for (ts, node, price) in rows {
            table.push(ts.parse().unwrap(), *node, *price);
        }
        table
    }

    fn version(settings: &Settings, tables: &[&dyn ContentHash]) -> String {
        compute_data_version(CODE_VERSION, settings, &[] as &[&Path], tables).unwrap()
    }

    #[test]
    fn test_empty_table_hash() {
        assert_eq!(PriceTable::default().content_hash(), empty_hash());
        assert_eq!(CurveTable::default().content_hash(), empty_hash());
        assert_ne!(
            prices(&[("2024-01-01T00:00:00Z", "FR", 0.0)]).content_hash(),
            empty_hash()
        );
    }

    #[test]
    fn test_row_order_matters() {
        let a = prices(&[
            ("2024-01-01T00:00:00Z", "FR", 1.0),
            ("2024-01-01T01:00:00Z", "FR", 2.0),
        ]);
        let b = prices(&[
            ("2024-01-01T01:00:00Z", "FR", 2.0),
            ("2024-01-01T00:00:00Z", "FR", 1.0),
        ]);
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_naive_and_zoned_hash_differently() {
        let zoned = prices(&[("2024-01-01T00:00:00Z", "FR", 1.0)]);
        let naive = prices(&[("2024-01-01T00:00:00", "FR", 1.0)]);
        assert_ne!(zoned.content_hash(), naive.content_hash());
    }

    fn from_csv(text: &str) -> PriceTable {
        PriceTable::from_csv_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_column_order_matters() {
        let a = from_csv("timestamp_utc,node,price\n2024-01-01T00:00:00Z,FR,1\n");
        let b = from_csv("node,timestamp_utc,price\nFR,2024-01-01T00:00:00Z,1\n");
        assert_eq!(a.rows()[0].price, b.rows()[0].price);
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_extra_column_bytes_matter() {
        let eur = from_csv("timestamp_utc,node,price,unit\n2024-01-01T00:00:00Z,FR,1,EUR\n");
        let usd = from_csv("timestamp_utc,node,price,unit\n2024-01-01T00:00:00Z,FR,1,USD\n");
        let bare = from_csv("timestamp_utc,node,price\n2024-01-01T00:00:00Z,FR,1\n");
        assert_ne!(eur.content_hash(), usd.content_hash());
        assert_ne!(eur.content_hash(), bare.content_hash());
    }

    #[test]
    fn test_timestamp_text_matters() {
        let zulu = from_csv("timestamp_utc,node,price\n2024-01-01T00:00:00Z,FR,1\n");
        let offset = from_csv("timestamp_utc,node,price\n2024-01-01T00:00:00+00:00,FR,1\n");
        assert_eq!(zulu.rows()[0].timestamp, offset.rows()[0].timestamp);
        assert_ne!(zulu.content_hash(), offset.content_hash());
    }

    #[test]
    fn test_curve_extra_column_changes_data_version() {
        let read = |text: &str| CurveTable::from_csv_reader(text.as_bytes()).unwrap();
        let a = read("timestamp_utc,spread,source\n2024-01-01T00:00:00Z,-5,desk-a\n");
        let b = read("timestamp_utc,spread,source\n2024-01-01T00:00:00Z,-5,desk-b\n");
        let settings = Settings::default();
        assert_ne!(version(&settings, &[&a]), version(&settings, &[&b]));
    }

    #[test]
    fn test_settings_and_code_version_change_digest() {
        let table = prices(&[("2024-01-01T00:00:00Z", "FR", 1.0)]);
        let base = Settings::default();
        let reseeded = Settings::builder().seed(124).build().unwrap();
        assert_ne!(version(&base, &[&table]), version(&reseeded, &[&table]));

        let other_code =
            compute_data_version("0.0.0-other", &base, &[] as &[&Path], &[&table]).unwrap();
        assert_ne!(version(&base, &[&table]), other_code);
    }

    #[test]
    fn test_file_bytes_change_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "timestamp_utc,node,price\n").unwrap();
        let settings = Settings::default();
        let first = compute_data_version(CODE_VERSION, &settings, &[&path], &[]).unwrap();
        let again = compute_data_version(CODE_VERSION, &settings, &[&path], &[]).unwrap();
        assert_eq!(first, again);

        std::fs::write(&path, "timestamp_utc,node,price\r\n").unwrap();
        let changed = compute_data_version(CODE_VERSION, &settings, &[&path], &[]).unwrap();
        assert_ne!(first, changed);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = compute_data_version(
            CODE_VERSION,
            &Settings::default(),
            &[Path::new("/nonexistent/prices.csv")],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, FtrError::Io(_)));
    }

    proptest! {
        #[test]
        fn prop_price_change_changes_hash(price in -1e6f64..1e6, delta in 1e-6f64..1.0) {
            let a = prices(&[("2024-01-01T00:00:00Z", "FR", price)]);
            let b = prices(&[("2024-01-01T00:00:00Z", "FR", price + delta)]);
            prop_assume!(price != price + delta);
            prop_assert_ne!(a.content_hash(), b.content_hash());
            prop_assert_eq!(a.content_hash(), a.clone().content_hash());
        }
    }
}
