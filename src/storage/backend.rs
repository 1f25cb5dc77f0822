//! Durable key-value medium abstraction.
//!
//! This module defines the [`KeyValueStore`] trait that the persistent
//! stores write through. Values are whole JSON documents addressed by a
//! logical key; there is no partial update.

use crate::domain::error::{PopcornError, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;

/// Abstraction over a durable key-value medium.
///
/// Reads and writes are synchronous. A `set` either stores the full value or
/// fails without changing what a later `get` returns.
///
/// # Implementations
///
/// - [`crate::storage::JsonFileStore`]: One JSON file with atomic writes (default)
/// - [`crate::storage::MemoryStore`]: Process-local map, used in tests and as a fallback
///
/// # Examples
///
/// ```
/// use popcorn::storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("watched", serde_json::json!([]))?;
/// assert_eq!(store.get("watched")?, Some(serde_json::json!([])));
/// # Ok::<(), popcorn::PopcornError>(())
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium is unavailable. The previous value is
    /// kept in that case.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Reserves `key` for a single owner.
    ///
    /// # Errors
    ///
    /// Returns [`PopcornError::StorageKeyInUse`] if the key is already held.
    fn claim(&self, key: &str) -> Result<()>;

    /// Releases a key reserved with [`claim`](Self::claim).
    fn release(&self, key: &str);
}

/// Set of keys currently owned by live stores on one medium.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    claimed: Mutex<HashSet<String>>,
}

impl KeyRegistry {
    /// Reserves `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is held or the registry lock is poisoned.
    pub fn claim(&self, key: &str) -> Result<()> {
        let mut claimed = self
            .claimed
            .lock()
            .map_err(|e| PopcornError::Storage(format!("key registry poisoned: {e}")))?;

        if claimed.insert(key.to_string()) {
            tracing::trace!(key = %key, "storage key claimed");
            Ok(())
        } else {
            Err(PopcornError::StorageKeyInUse(key.to_string()))
        }
    }

    pub fn release(&self, key: &str) {
        if let Ok(mut claimed) = self.claimed.lock() {
            claimed.remove(key);
            tracing::trace!(key = %key, "storage key released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_can_be_claimed_once_until_released() {
        let registry = KeyRegistry::default();
        registry.claim("watched").expect("first claim");
        assert!(matches!(
            registry.claim("watched"),
            Err(PopcornError::StorageKeyInUse(_))
        ));
        registry.claim("other").expect("distinct key");
        registry.release("watched");
        registry.claim("watched").expect("reclaim");
    }
}
