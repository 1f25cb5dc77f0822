//! In-memory storage medium.
//!
//! Used by tests and as the fallback when no data directory is available.
//! Nothing survives the process.

use crate::domain::error::{PopcornError, Result};
use crate::storage::backend::{KeyRegistry, KeyValueStore};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Process-local [`KeyValueStore`].
///
/// [`set_unavailable`](Self::set_unavailable) makes every read and write fail,
/// which lets callers exercise the degraded-storage paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
    unavailable: AtomicBool,
    keys: KeyRegistry,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Toggles simulated unavailability of the medium.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(PopcornError::Storage("storage medium unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|e| PopcornError::Storage(format!("storage lock poisoned: {e}")))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.check_available()?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.check_available()?;
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn claim(&self, key: &str) -> Result<()> {
        self.keys.claim(key)
    }

    fn release(&self, key: &str) {
        self.keys.release(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unavailable_store_rejects_io() {
        let store = MemoryStore::with_entries([("k".to_string(), json!(1))]);
        store.set_unavailable(true);
        assert!(store.get("k").is_err());
        assert!(store.set("k", json!(2)).is_err());
        store.set_unavailable(false);
        assert_eq!(store.get("k").expect("get"), Some(json!(1)));
    }
}
