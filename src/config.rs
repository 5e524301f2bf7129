use std::env;
use std::path::PathBuf;

use crate::features::STORE_KEY;

pub const DEFAULT_STORAGE_DIR: &str = "./.stellar-save";

/// Where the persisted store lives.
///
/// Environment variables:
/// - `STELLAR_SAVE_DIR`: directory holding one JSON file per storage key
/// - `STELLAR_SAVE_KEY`: storage key of the persisted partition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_dir: PathBuf,
    pub store_key: String,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let storage_dir = lookup("STELLAR_SAVE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let store_key = match lookup("STELLAR_SAVE_KEY") {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            Some(_) => {
                warn!("Ignoring empty STELLAR_SAVE_KEY, using {STORE_KEY}");
                STORE_KEY.to_string()
            }
            None => STORE_KEY.to_string(),
        };

        debug!("Storage: {} (key {store_key})", storage_dir.display());

        Self {
            storage_dir,
            store_key,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            store_key: STORE_KEY.to_string(),
        }
    }
}
