//! The user's watched-movie collection.
//!
//! [`WatchedListStore`] is a [`PersistentStore`] of [`WatchedEntry`] values
//! under the fixed key [`WATCHED_KEY`]. Entries keep insertion order and are
//! unique on movie id; adding a movie that is already present is rejected.
//! Summary statistics are derived on demand by [`WatchedListStore::aggregates`].

use crate::domain::error::{PopcornError, Result};
use crate::domain::{WatchedEntry, MAX_USER_RATING};
use crate::storage::backend::KeyValueStore;
use crate::storage::persistent::PersistentStore;
use std::sync::Arc;

/// Storage key of the watched collection.
pub const WATCHED_KEY: &str = "watched";

/// Summary statistics over the watched collection.
///
/// Averages are `None` when no entry carries the value, including the empty
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregates {
    pub count: usize,
    pub average_external_rating: Option<f64>,
    pub average_user_rating: Option<f64>,
    pub average_runtime: Option<f64>,
}

impl Aggregates {
    /// Computes the statistics for `entries`.
    #[must_use]
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        Self {
            count: entries.len(),
            average_external_rating: mean(entries.iter().filter_map(|e| e.external_rating)),
            average_user_rating: mean(entries.iter().map(|e| f64::from(e.user_rating))),
            average_runtime: mean(entries.iter().filter_map(|e| e.runtime_minutes).map(f64::from)),
        }
    }

    /// Formats an average with one decimal place, or `"-"` when absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use popcorn::storage::Aggregates;
    ///
    /// assert_eq!(Aggregates::display(Some(7.26)), "7.3");
    /// assert_eq!(Aggregates::display(None), "-");
    /// ```
    #[must_use]
    pub fn display(average: Option<f64>) -> String {
        average.map_or_else(|| "-".to_string(), |value| format!("{value:.1}"))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

/// Persistent, ordered, id-unique collection of watched movies.
///
/// # Examples
///
/// ```
/// use popcorn::domain::WatchedEntry;
/// use popcorn::storage::{MemoryStore, WatchedListStore};
/// use std::sync::Arc;
///
/// let mut watched = WatchedListStore::open(Arc::new(MemoryStore::new()))?;
/// watched.add(WatchedEntry {
///     movie_id: "tt0096895".to_string(),
///     title: "Batman".to_string(),
///     poster_url: "N/A".to_string(),
///     external_rating: Some(7.5),
///     runtime_minutes: Some(126),
///     user_rating: 8,
///     rating_revision_count: 1,
/// })?;
/// assert_eq!(watched.aggregates().count, 1);
/// # Ok::<(), popcorn::PopcornError>(())
/// ```
#[derive(Debug)]
pub struct WatchedListStore {
    store: PersistentStore<Vec<WatchedEntry>>,
}

impl WatchedListStore {
    /// Opens the collection on `medium`, starting empty if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if another live store already owns [`WATCHED_KEY`].
    pub fn open(medium: Arc<dyn KeyValueStore>) -> Result<Self> {
        let store = PersistentStore::create(medium, WATCHED_KEY, Vec::new())?;
        tracing::debug!(count = store.read().len(), "watched list opened");
        Ok(Self { store })
    }

    /// Appends `entry` and persists the collection.
    ///
    /// Returns `Ok(false)` if the medium rejects the write; the collection is
    /// left unchanged in that case.
    ///
    /// # Errors
    ///
    /// - [`PopcornError::InvalidEntry`] if the movie id is empty
    /// - [`PopcornError::InvalidRating`] if the user rating is not in `1..=10`
    /// - [`PopcornError::AlreadyWatched`] if the movie is already present
    pub fn add(&mut self, entry: WatchedEntry) -> Result<bool> {
        let _span = tracing::debug_span!("watched_add", movie_id = %entry.movie_id).entered();

        if entry.movie_id.trim().is_empty() {
            return Err(PopcornError::InvalidEntry("movie id is empty".to_string()));
        }
        if entry.user_rating == 0 || entry.user_rating > MAX_USER_RATING {
            return Err(PopcornError::InvalidRating(entry.user_rating));
        }
        if self.contains(&entry.movie_id) {
            tracing::debug!("rejecting duplicate");
            return Err(PopcornError::AlreadyWatched(entry.movie_id));
        }

        let persisted = self.store.update(|entries| {
            let mut next = entries.clone();
            next.push(entry);
            next
        });
        tracing::debug!(persisted, count = self.len(), "watched entry added");
        Ok(persisted)
    }

    /// Removes every entry for `movie_id` and persists the collection.
    ///
    /// Removing an id that is not present does nothing. Returns `true` when
    /// an entry was removed and the change persisted.
    pub fn remove(&mut self, movie_id: &str) -> bool {
        let _span = tracing::debug_span!("watched_remove", movie_id = %movie_id).entered();

        if !self.contains(movie_id) {
            tracing::debug!("movie not in watched list");
            return false;
        }

        let persisted = self.store.update(|entries| {
            entries
                .iter()
                .filter(|e| e.movie_id != movie_id)
                .cloned()
                .collect()
        });
        tracing::debug!(persisted, count = self.len(), "watched entry removed");
        persisted
    }

    #[must_use]
    pub fn entries(&self) -> &[WatchedEntry] {
        self.store.read()
    }

    #[must_use]
    pub fn get(&self, movie_id: &str) -> Option<&WatchedEntry> {
        self.entries().iter().find(|e| e.movie_id == movie_id)
    }

    #[must_use]
    pub fn contains(&self, movie_id: &str) -> bool {
        self.get(movie_id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Statistics over the current collection.
    #[must_use]
    pub fn aggregates(&self) -> Aggregates {
        Aggregates::from_entries(self.entries())
    }
}
