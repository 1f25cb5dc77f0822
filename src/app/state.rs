//! Application state container and view model computation.
//!
//! [`AppState`] owns the three stateful pieces of the application (the
//! search controller, the detail fetcher, and the watched collection) plus
//! input focus and the global key bindings. It is the single source of truth
//! for everything the front end renders.
//!
//! # Key bindings
//!
//! - `Enter` is bound for the lifetime of the state and focuses the search
//!   input, clearing the query, unless the input already has focus.
//! - `Escape` is bound only while a movie is selected and closes the detail
//!   view. The binding guard is dropped as soon as the selection clears.

use crate::app::detail::DetailFetcher;
use crate::app::handler::Event;
use crate::app::keys::{Key, KeyBinding, KeyDispatcher, KeyFilter};
use crate::app::modes::Focus;
use crate::app::search::{SearchController, SearchResult};
use crate::app::title::TitleContext;
use crate::app::view::{AppView, DetailPane, SearchPane};
use crate::domain::error::{PopcornError, Result};
use crate::storage::WatchedListStore;
use crate::worker::WorkerMessage;

/// Central application state.
#[derive(Debug)]
pub struct AppState {
    pub search: SearchController,
    pub detail: DetailFetcher,
    pub watched: WatchedListStore,

    /// Where keyboard input currently goes.
    pub focus: Focus,

    keys: KeyDispatcher,
    _focus_search: KeyBinding,
    close_details: Option<KeyBinding>,
}

impl AppState {
    /// Creates the state around an opened watched collection.
    ///
    /// `title` receives document title changes from the detail view.
    #[must_use]
    pub fn new(watched: WatchedListStore, title: Box<dyn TitleContext>) -> Self {
        let keys = KeyDispatcher::new();
        let focus_search = keys.bind(Key::Enter, KeyFilter::UnlessTyping, || Event::FocusSearch);

        Self {
            search: SearchController::new(),
            detail: DetailFetcher::new(title),
            watched,
            focus: Focus::default(),
            keys,
            _focus_search: focus_search,
            close_details: None,
        }
    }

    #[must_use]
    pub const fn keys(&self) -> &KeyDispatcher {
        &self.keys
    }

    /// Toggles the selection of `id`, returning the detail request to
    /// dispatch when a movie opens.
    pub fn select_movie(&mut self, id: &str) -> Option<WorkerMessage> {
        let request = self.detail.select(id);
        self.sync_detail_binding();
        request
    }

    /// Closes the detail view. Returns `true` when one was open.
    pub fn close_details(&mut self) -> bool {
        let closed = self.detail.close();
        self.sync_detail_binding();
        closed
    }

    /// Sets the tentative rating of the open movie.
    ///
    /// # Errors
    ///
    /// Returns [`PopcornError::AlreadyWatched`] when the open movie is
    /// already in the watched collection, and the rating errors of
    /// [`DetailFetcher::set_rating`] otherwise.
    pub fn rate_movie(&mut self, rating: u8) -> Result<()> {
        if let Some(id) = self.detail.selected_id().filter(|id| self.watched.contains(id)) {
            return Err(PopcornError::AlreadyWatched(id.to_string()));
        }
        self.detail.set_rating(rating)
    }

    /// Adds the open movie with its session rating to the watched collection
    /// and closes the detail view.
    ///
    /// # Errors
    ///
    /// Returns an error if no record is loaded, no rating was given, or the
    /// movie is already watched. The view stays open in that case, and also
    /// when the storage medium rejects the write.
    pub fn add_watched(&mut self) -> Result<()> {
        let entry = self.detail.confirm()?;
        let movie_id = entry.movie_id.clone();
        if !self.watched.add(entry)? {
            tracing::warn!(movie_id = %movie_id, "watched list not saved, keeping detail view open");
            return Ok(());
        }
        tracing::info!(movie_id = %movie_id, "movie added to watched list");
        self.close_details();
        Ok(())
    }

    /// Rating saved for the selected movie, when it is already watched.
    #[must_use]
    pub fn watched_rating(&self) -> Option<u8> {
        self.detail
            .selected_id()
            .and_then(|id| self.watched.get(id))
            .map(|entry| entry.user_rating)
    }

    /// Cancels every in-flight request and closes the detail view.
    pub fn shutdown(&mut self) {
        self.search.cancel();
        self.close_details();
    }

    /// Computes the view model for the current state.
    #[must_use]
    pub fn view(&self) -> AppView {
        let search = match self.search.result() {
            SearchResult::Idle | SearchResult::Aborted => SearchPane::Empty,
            SearchResult::Loading => SearchPane::Loading,
            SearchResult::Failure(message) => SearchPane::Error(message.clone()),
            SearchResult::Success(movies) => SearchPane::Results {
                movies: movies.clone(),
                selected: self.detail.selected_id().map(str::to_string),
            },
        };

        AppView {
            query: self.search.query().to_string(),
            search,
            detail: DetailPane::from_state(
                self.detail.state(),
                self.detail.user_rating(),
                self.watched_rating(),
            ),
            watched: self.watched.entries().to_vec(),
            stats: self.watched.aggregates(),
        }
    }

    fn sync_detail_binding(&mut self) {
        let selected = self.detail.selected_id().is_some();
        match (selected, self.close_details.is_some()) {
            (true, false) => {
                self.close_details = Some(self.keys.bind(
                    Key::Escape,
                    KeyFilter::Always,
                    || Event::CloseDetails,
                ));
            }
            (false, true) => {
                self.close_details = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::title::{DocumentTitle, DEFAULT_TITLE};
    use crate::domain::MovieDetail;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn state() -> (DocumentTitle, AppState) {
        let title = DocumentTitle::default();
        let watched = WatchedListStore::open(Arc::new(MemoryStore::new())).expect("open");
        (title.clone(), AppState::new(watched, Box::new(title)))
    }

    fn loaded(state: &mut AppState, id: &str) {
        state.select_movie(id).expect("request");
        state.detail.settle(
            id,
            Ok(MovieDetail {
                id: id.to_string(),
                title: format!("Movie {id}"),
                runtime_minutes: Some(100),
                external_rating: Some(7.0),
                ..MovieDetail::default()
            }),
        );
    }

    #[test]
    fn escape_is_bound_only_while_selected() {
        let (_, mut state) = state();
        assert!(!state.keys().is_bound(Key::Escape));
        state.select_movie("A").expect("request");
        assert!(state.keys().is_bound(Key::Escape));
        state.select_movie("B").expect("request");
        assert!(state.keys().is_bound(Key::Escape));
        state.close_details();
        assert!(!state.keys().is_bound(Key::Escape));
    }

    #[test]
    fn add_watched_closes_view_and_records_rating() {
        let (title, mut state) = state();
        loaded(&mut state, "A");
        state.detail.set_rating(8).expect("rate");
        state.add_watched().expect("add");

        assert_eq!(state.detail.selected_id(), None);
        assert_eq!(title.current(), DEFAULT_TITLE);
        assert_eq!(state.watched.get("A").map(|e| e.user_rating), Some(8));
        assert!(!state.keys().is_bound(Key::Escape));
    }

    #[test]
    fn already_watched_shows_saved_rating() {
        let (_, mut state) = state();
        loaded(&mut state, "A");
        state.detail.set_rating(6).expect("rate");
        state.add_watched().expect("add");

        loaded(&mut state, "A");
        assert_eq!(state.watched_rating(), Some(6));
        assert!(matches!(state.rate_movie(9), Err(PopcornError::AlreadyWatched(_))));
        assert!(matches!(state.add_watched(), Err(PopcornError::InvalidRating(0))));
        assert_eq!(state.detail.selected_id(), Some("A"));
    }

    #[test]
    fn view_marks_selected_result() {
        let (_, mut state) = state();
        let Some(WorkerMessage::Search { generation, .. }) = state.search.set_query("bat") else {
            panic!("expected search");
        };
        state.search.settle(
            generation,
            Ok(vec![crate::domain::MovieSummary::new("A", "Batman", "1989", "N/A")]),
        );
        state.select_movie("A").expect("request");

        let view = state.view();
        assert_eq!(
            view.search,
            SearchPane::Results {
                movies: state.search.movies().to_vec(),
                selected: Some("A".to_string()),
            }
        );
        assert_eq!(view.detail, Some(DetailPane::Loading));
        assert!(view.to_string().contains("found 1 results"));
    }

    #[test]
    fn aborted_selection_keeps_an_empty_pane() {
        let (_, mut state) = state();
        state.select_movie("A").expect("request");
        assert!(state.detail.settle("A", Err(crate::domain::FetchError::Aborted)));

        let view = state.view();
        assert_eq!(view.detail, Some(DetailPane::Empty));
        assert!(view.to_string().contains("detail: -"));
        assert!(state.keys().is_bound(Key::Escape));
    }

    #[test]
    fn unsaved_add_keeps_rating_open() {
        let medium = Arc::new(MemoryStore::new());
        let watched = WatchedListStore::open(medium.clone()).expect("open");
        let mut state = AppState::new(watched, Box::new(DocumentTitle::default()));
        loaded(&mut state, "A");
        state.detail.set_rating(7).expect("rate");

        medium.set_unavailable(true);
        state.add_watched().expect("add");
        assert!(state.watched.is_empty());
        assert_eq!(state.detail.selected_id(), Some("A"));
        assert_eq!(state.detail.user_rating(), Some(7));

        medium.set_unavailable(false);
        state.add_watched().expect("retry");
        assert_eq!(state.watched.get("A").map(|e| e.user_rating), Some(7));
        assert_eq!(state.detail.selected_id(), None);
    }
}
