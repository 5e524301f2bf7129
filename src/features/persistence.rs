use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::savings::{GroupId, SavingsGroup};
use super::wallet::WalletState;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A string-keyed durable slot, shaped after browser local storage.
pub trait Storage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// In-memory storage. Clones share the same backing map, so a second store
/// opened on a clone sees what the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a base directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_path
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path)?;
        fs::write(self.item_path(key), value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = self.item_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// The persisted subset of store state. Notifications and the menu flag are
/// never part of it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub wallet: WalletState,
    pub groups: Vec<SavingsGroup>,
    pub active_group_id: Option<GroupId>,
}

impl PersistedState {
    pub fn to_json(&self) -> StorageResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored payload. Each field falls back to its default on its
    /// own when missing or malformed; only unparseable JSON is an error.
    pub fn from_json(payload: &str) -> StorageResult<Self> {
        let value: Value = serde_json::from_str(payload)?;

        let wallet = field(&value, "wallet").unwrap_or_default();
        let groups = field::<Vec<Value>>(&value, "groups")
            .unwrap_or_default()
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| group(index, raw))
            .collect();
        let active_group_id = field(&value, "activeGroupId").unwrap_or_default();

        Ok(Self {
            wallet,
            groups: dedup_groups(groups),
            active_group_id,
        })
    }
}

fn field<T: serde::de::DeserializeOwned>(value: &Value, name: &str) -> Option<T> {
    let raw = value.get(name)?;
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring stored field {name}: {e}");
            None
        }
    }
}

/// One malformed entry is dropped without taking the rest of the list with it.
fn group(index: usize, raw: &Value) -> Option<SavingsGroup> {
    match serde_json::from_value(raw.clone()) {
        Ok(group) => Some(group),
        Err(e) => {
            warn!("Ignoring stored group #{index}: {e}");
            None
        }
    }
}

/// First occurrence of an id wins; totals are floored at zero.
fn dedup_groups(groups: Vec<SavingsGroup>) -> Vec<SavingsGroup> {
    let mut seen = HashSet::new();
    groups
        .into_iter()
        .filter(|group| seen.insert(group.id().clone()))
        .map(SavingsGroup::sanitized)
        .collect()
}
