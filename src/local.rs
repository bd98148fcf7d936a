//! Client-scoped string key/value persistence.
//!
//! Holds the locally saved settings blob and the cookie-consent choice.
//! `FileStore` keeps every key in one JSON object on disk; `MemoryStore` is
//! process-local, with an optional byte quota so callers can exercise
//! persistence failures.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Key of the locally saved settings blob.
pub const SETTINGS_KEY: &str = "site-settings";

/// Key of the cookie-consent choice.
pub const CONSENT_KEY: &str = "cookie-consent";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {0}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("local store {0} is not a JSON object of strings")]
    Corrupt(PathBuf, #[source] serde_json::Error),

    #[error("failed to serialize local store")]
    Serialize(#[from] serde_json::Error),

    #[error("quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },
}

/// String key/value store.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ============================================================================
// FileStore
// ============================================================================

/// All keys in a single JSON object file.
///
/// ```json
/// { "cookie-consent": "accepted", "site-settings": "{\"siteTitle\":...}" }
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json =
            fs::read_to_string(&self.path).map_err(|e| StoreError::Io(self.path.clone(), e))?;
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&json).map_err(|e| StoreError::Corrupt(self.path.clone(), e))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(parent.to_path_buf(), e))?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(self.path.clone(), e))?;

        crate::debug!("local"; "saved {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_all()?;
        if entries.get(key).is_some_and(|existing| existing == value) {
            return Ok(());
        }
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_all()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&entries)
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<FxHashMap<String, String>>,
    /// Maximum total bytes of keys plus values.
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes growing it beyond `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota: Some(limit),
        }
    }

    fn usage(entries: &FxHashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();

        if let Some(limit) = self.quota {
            let current = entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = Self::usage(&entries) - current + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded { needed, limit });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
