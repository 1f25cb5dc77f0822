//! Live title search with last-query-wins semantics.
//!
//! Every query change starts a new search cycle with a higher generation
//! number and cancels the previous cycle's request. Settlements are applied
//! only when their generation matches the current one, so a slow response
//! for an old query can never overwrite the results of a newer one.
//!
//! Observers that live outside the event loop can follow the controller
//! through [`SearchController::subscribe`], which yields a
//! [`tokio::sync::watch`] receiver of [`SearchSnapshot`] values.

use crate::api::{CancelToken, FetchResult};
use crate::domain::{FetchError, MovieSummary};
use crate::worker::WorkerMessage;
use tokio::sync::watch;

/// Queries shorter than this many characters clear the results instead of
/// searching.
pub const MIN_QUERY_LEN: usize = 3;

/// Observable outcome of the current search cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchResult {
    /// No search has run for the current query.
    #[default]
    Idle,

    /// A request is in flight.
    Loading,

    /// The request succeeded.
    Success(Vec<MovieSummary>),

    /// The request failed with a user-facing message.
    Failure(String),

    /// The request was aborted without being superseded.
    Aborted,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchSnapshot {
    pub generation: u64,
    pub query: String,
    pub result: SearchResult,
}

impl SearchSnapshot {
    /// Results of the cycle, empty unless it succeeded.
    #[must_use]
    pub fn movies(&self) -> &[MovieSummary] {
        match &self.result {
            SearchResult::Success(movies) => movies.as_slice(),
            _ => &[],
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.result, SearchResult::Loading)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.result {
            SearchResult::Failure(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Drives search cycles for the query input.
///
/// # Examples
///
/// ```
/// use popcorn::app::search::SearchController;
/// use popcorn::worker::WorkerMessage;
///
/// let mut search = SearchController::new();
/// assert!(search.set_query("ba").is_none());
///
/// let Some(WorkerMessage::Search { generation, query, .. }) = search.set_query("bat") else {
///     panic!("expected a search request");
/// };
/// assert_eq!(query, "bat");
/// assert!(search.is_loading());
///
/// search.settle(generation, Ok(vec![]));
/// assert!(!search.is_loading());
/// ```
#[derive(Debug)]
pub struct SearchController {
    query: String,
    generation: u64,
    result: SearchResult,
    in_flight: Option<CancelToken>,
    updates: watch::Sender<SearchSnapshot>,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchController {
    #[must_use]
    pub fn new() -> Self {
        let (updates, _) = watch::channel(SearchSnapshot::default());
        Self {
            query: String::new(),
            generation: 0,
            result: SearchResult::Idle,
            in_flight: None,
            updates,
        }
    }

    /// Starts a new search cycle for `query`.
    ///
    /// Cancels the in-flight request of the previous cycle. Returns the
    /// request to dispatch, or `None` when the query is shorter than
    /// [`MIN_QUERY_LEN`] characters, in which case results are cleared.
    /// Setting the query it already holds does nothing.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<WorkerMessage> {
        let query = query.into();
        if query == self.query {
            return None;
        }

        self.abort_in_flight();
        self.generation += 1;
        self.query = query;

        let _span = tracing::debug_span!(
            "search_cycle",
            generation = self.generation,
            query = %self.query
        )
        .entered();

        let request = if self.query.chars().count() < MIN_QUERY_LEN {
            tracing::debug!("query too short, clearing results");
            self.result = SearchResult::Idle;
            None
        } else {
            let request = WorkerMessage::search(self.generation, self.query.clone());
            self.in_flight = Some(request.cancel_token().clone());
            self.result = SearchResult::Loading;
            tracing::debug!("search dispatched");
            Some(request)
        };

        self.publish();
        request
    }

    /// Applies the settlement of the cycle `generation`.
    ///
    /// Returns `false` and changes nothing when the generation is stale.
    pub fn settle(&mut self, generation: u64, outcome: FetchResult<Vec<MovieSummary>>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale search settlement"
            );
            return false;
        }

        self.in_flight = None;
        self.result = match outcome {
            Ok(movies) => {
                tracing::debug!(generation, count = movies.len(), "search succeeded");
                SearchResult::Success(movies)
            }
            Err(FetchError::Aborted) => {
                tracing::debug!(generation, "search aborted");
                SearchResult::Aborted
            }
            Err(e) => {
                tracing::debug!(generation, error = %e, "search failed");
                SearchResult::Failure(e.to_string())
            }
        };

        self.publish();
        true
    }

    /// Aborts the current cycle.
    ///
    /// Any settlement still on its way is discarded. Returns `true` when a
    /// request was in flight.
    pub fn cancel(&mut self) -> bool {
        let had_request = self.abort_in_flight();
        self.generation += 1;
        if had_request {
            self.result = SearchResult::Aborted;
        }
        self.publish();
        had_request
    }

    /// Receiver that observes every state change of this controller.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.updates.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            generation: self.generation,
            query: self.query.clone(),
            result: self.result.clone(),
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn result(&self) -> &SearchResult {
        &self.result
    }

    /// Results of the current cycle, empty unless it succeeded.
    #[must_use]
    pub fn movies(&self) -> &[MovieSummary] {
        match &self.result {
            SearchResult::Success(movies) => movies.as_slice(),
            _ => &[],
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.result, SearchResult::Loading)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.result {
            SearchResult::Failure(message) => Some(message.as_str()),
            _ => None,
        }
    }

    fn abort_in_flight(&mut self) -> bool {
        self.in_flight.take().is_some_and(|token| {
            token.cancel();
            tracing::trace!(generation = self.generation, "previous search cancelled");
            true
        })
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str) -> MovieSummary {
        MovieSummary::new(id, format!("Movie {id}"), "1989", "N/A")
    }

    fn start(search: &mut SearchController, query: &str) -> (u64, CancelToken) {
        match search.set_query(query) {
            Some(WorkerMessage::Search { generation, cancel, .. }) => (generation, cancel),
            other => panic!("expected search request, got {other:?}"),
        }
    }

    #[test]
    fn short_query_clears_without_fetching() {
        let mut search = SearchController::new();
        let (generation, _) = start(&mut search, "batman");
        search.settle(generation, Ok(vec![movie("a")]));
        assert_eq!(search.movies().len(), 1);

        assert!(search.set_query("ba").is_none());
        assert!(search.movies().is_empty());
        assert!(!search.is_loading());
        assert_eq!(search.error(), None);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut search = SearchController::new();
        assert!(search.set_query("été").is_some());
        assert!(search.set_query("é").is_none());
    }

    #[test]
    fn new_query_cancels_previous_request() {
        let mut search = SearchController::new();
        let (_, first) = start(&mut search, "bat");
        let (_, second) = start(&mut search, "batm");
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn stale_settlement_is_discarded() {
        let mut search = SearchController::new();
        let (old, _) = start(&mut search, "bat");
        let (current, _) = start(&mut search, "batman");

        assert!(search.settle(current, Ok(vec![movie("new")])));
        assert!(!search.settle(old, Ok(vec![movie("old")])));
        assert_eq!(search.movies()[0].id, "new");
    }

    #[test]
    fn failure_surfaces_message() {
        let mut search = SearchController::new();
        let (generation, _) = start(&mut search, "qwzx");
        search.settle(generation, Err(FetchError::Domain("Movie not found!".to_string())));
        assert_eq!(search.error(), Some("Movie not found!"));
        assert!(search.movies().is_empty());
        assert!(!search.is_loading());
    }

    #[test]
    fn aborted_current_cycle_is_not_an_error() {
        let mut search = SearchController::new();
        let (generation, _) = start(&mut search, "batman");
        search.settle(generation, Err(FetchError::Aborted));
        assert_eq!(search.result(), &SearchResult::Aborted);
        assert_eq!(search.error(), None);
        assert!(!search.is_loading());
    }

    #[test]
    fn cancel_discards_late_settlement() {
        let mut search = SearchController::new();
        let (generation, token) = start(&mut search, "batman");
        assert!(search.cancel());
        assert!(token.is_cancelled());
        assert!(!search.settle(generation, Ok(vec![movie("late")])));
        assert_eq!(search.result(), &SearchResult::Aborted);
    }

    #[test]
    fn same_query_does_not_restart_cycle() {
        let mut search = SearchController::new();
        let (generation, token) = start(&mut search, "batman");
        assert!(search.set_query("batman").is_none());
        assert_eq!(search.generation(), generation);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn subscribers_observe_latest_snapshot() {
        let mut search = SearchController::new();
        let receiver = search.subscribe();
        let (generation, _) = start(&mut search, "batman");
        assert!(receiver.borrow().is_loading());

        search.settle(generation, Ok(vec![movie("a"), movie("b")]));
        let snapshot = receiver.borrow().clone();
        assert_eq!(snapshot.query, "batman");
        assert_eq!(snapshot.movies().len(), 2);
        assert_eq!(snapshot.error(), None);
    }
}
