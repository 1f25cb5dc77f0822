//! Event handling and state transition logic.
//!
//! This module implements the event handler that processes user input, key
//! presses, and fetch settlements, translating them into state changes and
//! action sequences.
//!
//! # Architecture
//!
//! 1. Events arrive from the front end or the fetch worker
//! 2. [`handle_event`] pattern-matches the event type
//! 3. State mutations occur via [`AppState`] and its controllers
//! 4. Actions are collected and returned for execution
//!
//! A raw [`Event::Key`] is routed through the key bindings first and the
//! event they produce is handled in its place.
//!
//! # Example
//!
//! ```rust
//! use popcorn::app::{handle_event, Action, AppState, Event};
//! use popcorn::storage::{MemoryStore, WatchedListStore};
//! use std::sync::Arc;
//!
//! let watched = WatchedListStore::open(Arc::new(MemoryStore::new()))?;
//! let mut state = AppState::new(watched, Box::new(|_: &str| {}));
//!
//! let (render, actions) = handle_event(&mut state, &Event::QueryChanged("batman".into()))?;
//! assert!(render);
//! assert!(matches!(actions.as_slice(), [Action::Fetch(_)]));
//! # Ok::<(), popcorn::PopcornError>(())
//! ```

use crate::app::keys::Key;
use crate::app::modes::Focus;
use crate::app::{Action, AppState};
use crate::domain::error::Result;
use crate::worker::WorkerResponse;

/// Events triggered by user input or fetch settlements.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The search input text changed. Implies the input has focus.
    QueryChanged(String),

    /// Focus the search input and clear the query.
    FocusSearch,

    /// Focus left the search input.
    Blur,

    /// A search result was clicked. Selecting the open movie closes it.
    SelectMovie(String),

    /// Close the detail view.
    CloseDetails,

    /// Set the tentative rating of the open movie; `0` clears it.
    RateMovie(u8),

    /// Add the open movie with its rating to the watched collection.
    AddWatched,

    /// Remove a movie from the watched collection.
    RemoveWatched(String),

    /// A key was pressed outside any text handling.
    Key(Key),

    /// Wraps a settlement from the fetch worker.
    WorkerResponse(WorkerResponse),

    /// Cancel all work and stop.
    Shutdown,
}

/// Processes an event, mutates application state, and returns whether a
/// re-render is needed along with the actions to execute.
///
/// # Errors
///
/// Returns errors from rejected user operations: rating out of range or
/// before the detail loaded, adding without a rating, or adding a movie that
/// is already watched. State is unchanged in those cases.
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::QueryChanged(query) => {
            state.focus = Focus::SearchInput;
            let actions = state
                .search
                .set_query(query.clone())
                .map(Action::Fetch)
                .into_iter()
                .collect();
            Ok((true, actions))
        }
        Event::FocusSearch => {
            tracing::debug!("focusing search input");
            state.focus = Focus::SearchInput;
            let mut actions = vec![Action::FocusSearchInput];
            actions.extend(state.search.set_query(String::new()).map(Action::Fetch));
            Ok((true, actions))
        }
        Event::Blur => {
            state.focus = Focus::Elsewhere;
            Ok((false, vec![]))
        }
        Event::SelectMovie(id) => {
            state.focus = Focus::Elsewhere;
            let actions = state
                .select_movie(id)
                .map(Action::Fetch)
                .into_iter()
                .collect();
            Ok((true, actions))
        }
        Event::CloseDetails => Ok((state.close_details(), vec![])),
        Event::RateMovie(rating) => {
            state.rate_movie(*rating)?;
            Ok((true, vec![]))
        }
        Event::AddWatched => {
            state.add_watched()?;
            Ok((true, vec![]))
        }
        Event::RemoveWatched(id) => Ok((state.watched.remove(id), vec![])),
        Event::Key(key) => {
            let Some(bound) = state.keys().dispatch(*key, state.focus) else {
                return Ok((false, vec![]));
            };
            tracing::debug!(%key, event = ?bound, "key binding fired");
            handle_event(state, &bound)
        }
        Event::WorkerResponse(response) => handle_worker_response(state, response),
        Event::Shutdown => {
            tracing::debug!("shutting down");
            state.shutdown();
            Ok((false, vec![Action::Quit]))
        }
    }
}

fn handle_worker_response(state: &mut AppState, response: &WorkerResponse) -> Result<(bool, Vec<Action>)> {
    let applied = match response {
        WorkerResponse::SearchSettled { generation, outcome } => {
            state.search.settle(*generation, outcome.clone())
        }
        WorkerResponse::DetailSettled { id, outcome } => state.detail.settle(id, outcome.clone()),
    };
    Ok((applied, vec![]))
}
