//! Value backed by a durable key-value medium.
//!
//! A [`PersistentStore`] owns one storage key. It loads its value from the
//! medium on creation and writes the full value back on every mutation. A
//! failing medium never surfaces as an error to readers: they keep seeing
//! the last value that was successfully written.
//!
//! A stored value is never overwritten unseen. If it fails to deserialize it
//! is copied to `<key>.unreadable` before the first write replaces it; if the
//! medium could not be read at all, writes are refused.

use crate::domain::error::{PopcornError, Result};
use crate::storage::backend::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Suffix of the key an unreadable stored value is preserved under.
pub const BACKUP_SUFFIX: &str = ".unreadable";

/// What the medium held for the key when the store was created.
#[derive(Debug)]
enum Loaded {
    /// The stored value (or its absence) was read successfully.
    Clean,
    /// A value was stored but did not deserialize.
    Unreadable(Value),
    /// The medium failed to read.
    Unavailable,
}

/// A value of type `T` persisted under a single storage key.
///
/// # Examples
///
/// ```
/// use popcorn::storage::{MemoryStore, PersistentStore};
/// use std::sync::Arc;
///
/// let medium = Arc::new(MemoryStore::new());
/// let mut counter = PersistentStore::create(medium.clone(), "counter", 0u32)?;
/// counter.update(|n| n + 1);
/// assert_eq!(*counter.read(), 1);
/// drop(counter);
///
/// let reopened = PersistentStore::create(medium, "counter", 0u32)?;
/// assert_eq!(*reopened.read(), 1);
/// # Ok::<(), popcorn::PopcornError>(())
/// ```
pub struct PersistentStore<T> {
    medium: Arc<dyn KeyValueStore>,
    key: String,
    value: T,
    loaded: Loaded,
}

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens the store for `key`, loading the stored value.
    ///
    /// Falls back to `default` without writing when the key is absent, the
    /// medium cannot be read, or the stored value does not deserialize.
    /// Writes are refused after a failed read until the store is reopened.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PopcornError::StorageKeyInUse`] if another live store
    /// already owns `key` on this medium.
    pub fn create(medium: Arc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Result<Self> {
        let key = key.into();
        let _span = tracing::debug_span!("persistent_store_create", key = %key).entered();

        medium.claim(&key)?;

        let (value, loaded) = match medium.get(&key) {
            Ok(Some(raw)) => match T::deserialize(&raw) {
                Ok(value) => {
                    tracing::debug!("loaded stored value");
                    (value, Loaded::Clean)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored value unreadable, using default");
                    (default, Loaded::Unreadable(raw))
                }
            },
            Ok(None) => {
                tracing::debug!("no stored value, using default");
                (default, Loaded::Clean)
            }
            Err(e) => {
                tracing::warn!(error = %e, "storage read failed, using default");
                (default, Loaded::Unavailable)
            }
        };

        Ok(Self {
            medium,
            key,
            value,
            loaded,
        })
    }

    /// Current value, as of the last successful write.
    #[must_use]
    pub fn read(&self) -> &T {
        &self.value
    }

    /// Replaces the value and persists it.
    ///
    /// Returns `false` when the value could not be serialized or stored, in
    /// which case the previous value is kept.
    pub fn write(&mut self, value: T) -> bool {
        if !self.preserve_stored_value() {
            return false;
        }

        let persisted = serde_json::to_value(&value)
            .map_err(PopcornError::from)
            .and_then(|json| self.medium.set(&self.key, json));

        match persisted {
            Ok(()) => {
                self.value = value;
                tracing::debug!(key = %self.key, "value persisted");
                true
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "write discarded, keeping previous value");
                false
            }
        }
    }

    /// Computes the next value from the current one and persists it.
    ///
    /// Same failure behavior as [`write`](Self::write).
    pub fn update<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.write(next)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Makes sure a value loaded on creation survives the next write.
    fn preserve_stored_value(&mut self) -> bool {
        match &self.loaded {
            Loaded::Clean => true,
            Loaded::Unavailable => {
                tracing::warn!(key = %self.key, "stored value was never read, refusing to overwrite it");
                false
            }
            Loaded::Unreadable(raw) => {
                let backup = format!("{}{BACKUP_SUFFIX}", self.key);
                match self.medium.set(&backup, raw.clone()) {
                    Ok(()) => {
                        tracing::warn!(key = %self.key, backup = %backup, "unreadable value moved aside");
                        self.loaded = Loaded::Clean;
                        true
                    }
                    Err(e) => {
                        tracing::warn!(key = %self.key, error = %e, "backup failed, refusing to overwrite");
                        false
                    }
                }
            }
        }
    }
}

impl<T> Drop for PersistentStore<T> {
    fn drop(&mut self) {
        self.medium.release(&self.key);
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentStore")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn absent_key_uses_default_without_writing() {
        let medium = Arc::new(MemoryStore::new());
        let store = PersistentStore::create(medium.clone(), "list", vec![1, 2]).expect("create");
        assert_eq!(store.read(), &vec![1, 2]);
        assert_eq!(medium.get("list").expect("get"), None);
    }

    #[test]
    fn write_is_visible_in_memory_and_medium() {
        let medium = Arc::new(MemoryStore::new());
        let mut store = PersistentStore::create(medium.clone(), "list", Vec::<u32>::new()).expect("create");
        assert!(store.update(|v| {
            let mut next = v.clone();
            next.push(7);
            next
        }));
        assert_eq!(store.read(), &vec![7]);
        assert_eq!(medium.get("list").expect("get"), Some(json!([7])));
    }

    #[test]
    fn unavailable_medium_keeps_previous_value() {
        let medium = Arc::new(MemoryStore::new());
        let mut store = PersistentStore::create(medium.clone(), "list", vec![1]).expect("create");
        medium.set_unavailable(true);
        assert!(!store.write(vec![1, 2]));
        assert_eq!(store.read(), &vec![1]);
    }

    #[test]
    fn unreadable_value_falls_back_to_default() {
        let medium = Arc::new(MemoryStore::with_entries([(
            "list".to_string(),
            json!("not a list"),
        )]));
        let store = PersistentStore::create(medium, "list", vec![0u8]).expect("create");
        assert_eq!(store.read(), &vec![0]);
    }

    #[test]
    fn unavailable_medium_on_create_uses_default() {
        let medium = Arc::new(MemoryStore::with_entries([("n".to_string(), json!(5))]));
        medium.set_unavailable(true);
        let store = PersistentStore::create(medium, "n", 1u8).expect("create");
        assert_eq!(*store.read(), 1);
    }

    #[test]
    fn unread_value_is_never_overwritten() {
        let medium = Arc::new(MemoryStore::with_entries([("n".to_string(), json!(5))]));
        medium.set_unavailable(true);
        let mut store = PersistentStore::create(medium.clone(), "n", 1u8).expect("create");
        medium.set_unavailable(false);

        assert!(!store.write(2));
        assert_eq!(*store.read(), 1);
        assert_eq!(medium.get("n").expect("get"), Some(json!(5)));
    }

    #[test]
    fn unreadable_value_is_backed_up_once() {
        let medium = Arc::new(MemoryStore::with_entries([(
            "list".to_string(),
            json!("not a list"),
        )]));
        let mut store = PersistentStore::create(medium.clone(), "list", Vec::<u8>::new()).expect("create");

        medium.set_unavailable(true);
        assert!(!store.write(vec![1]));
        medium.set_unavailable(false);
        assert_eq!(medium.get("list").expect("get"), Some(json!("not a list")));

        assert!(store.write(vec![1]));
        assert!(store.write(vec![1, 2]));
        assert_eq!(medium.get("list.unreadable").expect("get"), Some(json!("not a list")));
        assert_eq!(medium.get("list").expect("get"), Some(json!([1, 2])));
    }

    #[test]
    fn two_stores_cannot_share_a_key() {
        let medium: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = PersistentStore::create(medium.clone(), "k", 0u8).expect("create");
        assert!(matches!(
            PersistentStore::create(medium.clone(), "k", 0u8),
            Err(PopcornError::StorageKeyInUse(_))
        ));
        drop(first);
        PersistentStore::create(medium, "k", 0u8).expect("key released on drop");
    }
}
