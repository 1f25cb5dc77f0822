//! JSON file-based storage medium.
//!
//! This module provides a human-readable [`KeyValueStore`] backed by a single
//! JSON file. It uses atomic file writes (write-to-temp + rename) so the file
//! is never left half-written.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(1) - the file is loaded into memory once, on open
//! - **Write**: O(n) - serializes and rewrites the whole file
//! - **Best for**: a handful of keys holding small collections

use crate::domain::error::{PopcornError, Result};
use crate::storage::backend::{KeyRegistry, KeyValueStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Current on-disk format version.
const STORAGE_VERSION: u32 = 1;

/// JSON storage container format.
///
/// Top-level structure serialized to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    /// Version of the storage format for future migrations.
    version: u32,

    /// Unix timestamp of the last successful write.
    #[serde(default)]
    saved_at: Option<i64>,

    /// Stored values by logical key.
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION,
            saved_at: None,
            entries: BTreeMap::new(),
        }
    }
}

/// JSON file storage medium.
///
/// The whole file is cached in memory. A `set` writes the updated document to
/// disk first and only then replaces the cache, so readers never observe a
/// value that failed to persist.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "saved_at": 1700000000,
///   "entries": {
///     "watched": [
///       { "imdbID": "tt0096895", "Title": "Batman", "userRating": 8, ... }
///     ]
///   }
/// }
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    /// Path to the JSON file on disk.
    file_path: PathBuf,

    /// In-memory copy of the file, loaded on creation.
    data: Mutex<StorageData>,

    keys: KeyRegistry,
}

impl JsonFileStore {
    /// Creates or opens a JSON storage file.
    ///
    /// If the file exists, loads existing data. Otherwise starts empty without
    /// writing. Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - File exists but contains invalid JSON
    /// - File permissions prevent reading
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use popcorn::storage::JsonFileStore;
    /// use std::path::PathBuf;
    ///
    /// let store = JsonFileStore::new(PathBuf::from("/tmp/popcorn.json"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON storage");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            tracing::debug!("loading existing data");
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty storage");
            StorageData::default()
        };

        tracing::debug!(entry_count = data.entries.len(), "storage initialized");

        Ok(Self {
            file_path,
            data: Mutex::new(data),
            keys: KeyRegistry::default(),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| PopcornError::Storage(format!("failed to parse JSON: {e}")))?;

        if data.version > STORAGE_VERSION {
            tracing::warn!(
                version = data.version,
                supported = STORAGE_VERSION,
                "storage file written by a newer version"
            );
        }

        tracing::debug!(
            version = data.version,
            entries = data.entries.len(),
            "loaded storage data"
        );

        Ok(data)
    }

    /// Writes `data` to disk using write-to-temp + rename.
    fn save_to_file(&self, data: &StorageData) -> Result<()> {
        tracing::debug!(path = ?self.file_path, "saving storage data");

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| PopcornError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;

        tracing::trace!("renaming temporary file to final location");
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::debug!("storage saved successfully");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StorageData>> {
        self.data
            .lock()
            .map_err(|e| PopcornError::Storage(format!("storage lock poisoned: {e}")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let data = self.lock()?;
        Ok(data.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let _span = tracing::debug_span!("json_set", key = %key).entered();

        let mut data = self.lock()?;
        let mut next = data.clone();
        next.version = STORAGE_VERSION;
        next.saved_at = Some(chrono::Utc::now().timestamp());
        next.entries.insert(key.to_string(), value);

        self.save_to_file(&next)?;
        *data = next;
        Ok(())
    }

    fn claim(&self, key: &str) -> Result<()> {
        self.keys.claim(key)
    }

    fn release(&self, key: &str) {
        self.keys.release(key);
    }
}
