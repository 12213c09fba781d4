use std::env;
use std::path::PathBuf;

const DATA_DIR_ENV: &str = "BURROW_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "burrow_data";

/// Configuration for a store instance.
///
/// The root directory holds `applications.json` and the `db/` tree. It is
/// created on first use, so pointing at a nonexistent directory is fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the store root from `BURROW_DATA_DIR`, falling back to the
    /// default relative directory.
    pub fn from_env() -> Self {
        match env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }
}
