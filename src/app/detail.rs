//! Detail view of the selected movie.
//!
//! [`DetailFetcher`] loads the full record for the selected movie id and
//! holds the rating session of the open view: the user's tentative rating
//! and how many times it changed. The movie id is the generation token of a
//! detail cycle; a settlement is applied only while its id is still the
//! selected one.
//!
//! While a record is loaded the injected [`TitleContext`] shows
//! `"Movie: <title>"`, and it reverts to [`DEFAULT_TITLE`] when the view
//! closes or switches to another movie.

use crate::api::{CancelToken, FetchResult};
use crate::app::title::{movie_title, TitleContext, DEFAULT_TITLE};
use crate::domain::error::{PopcornError, Result};
use crate::domain::{FetchError, MovieDetail, WatchedEntry, MAX_USER_RATING};
use crate::worker::WorkerMessage;
use std::fmt;

/// Observable state of the detail view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    /// No movie is selected.
    #[default]
    Closed,

    /// The record of the selected movie is being fetched.
    Loading,

    /// The record of the selected movie is available.
    Loaded(MovieDetail),

    /// The fetch failed with a user-facing message.
    Failed(String),

    /// The fetch was aborted while the movie stayed selected.
    Aborted,
}

/// Loads and presents the selected movie.
pub struct DetailFetcher {
    selected: Option<String>,
    state: DetailState,
    in_flight: Option<CancelToken>,
    user_rating: Option<u8>,
    rating_revisions: u32,
    title: Box<dyn TitleContext>,
    title_shown: bool,
}

impl DetailFetcher {
    #[must_use]
    pub fn new(title: Box<dyn TitleContext>) -> Self {
        Self {
            selected: None,
            state: DetailState::Closed,
            in_flight: None,
            user_rating: None,
            rating_revisions: 0,
            title,
            title_shown: false,
        }
    }

    /// Toggles the selection of `id`.
    ///
    /// Selecting the open movie again closes the view. Selecting any other
    /// movie opens it and returns the detail request to dispatch.
    pub fn select(&mut self, id: &str) -> Option<WorkerMessage> {
        if self.selected.as_deref() == Some(id) {
            tracing::debug!(movie_id = %id, "selection toggled off");
            self.close();
            None
        } else {
            Some(self.open(id))
        }
    }

    /// Opens the view for `id`, superseding any current selection.
    ///
    /// Resets the rating session and returns the detail request to dispatch.
    pub fn open(&mut self, id: &str) -> WorkerMessage {
        let _span = tracing::debug_span!("detail_open", movie_id = %id).entered();

        self.abort_in_flight();
        self.reset_session();
        self.revert_title();

        let request = WorkerMessage::detail(id.to_string());
        self.in_flight = Some(request.cancel_token().clone());
        self.selected = Some(id.to_string());
        self.state = DetailState::Loading;
        tracing::debug!("detail dispatched");
        request
    }

    /// Closes the view, cancelling any in-flight fetch.
    ///
    /// Returns `true` when a movie was selected.
    pub fn close(&mut self) -> bool {
        let Some(id) = self.selected.take() else {
            return false;
        };
        tracing::debug!(movie_id = %id, "detail closed");

        self.abort_in_flight();
        self.reset_session();
        self.revert_title();
        self.state = DetailState::Closed;
        true
    }

    /// Applies the settlement of the fetch for `id`.
    ///
    /// Returns `false` and changes nothing when `id` is no longer selected.
    pub fn settle(&mut self, id: &str, outcome: FetchResult<MovieDetail>) -> bool {
        if self.selected.as_deref() != Some(id) {
            tracing::debug!(movie_id = %id, "discarding stale detail settlement");
            return false;
        }

        self.in_flight = None;
        self.state = match outcome {
            Ok(detail) => {
                tracing::debug!(movie_id = %id, title = %detail.title, "detail loaded");
                if !detail.title.is_empty() {
                    self.title.set_title(&movie_title(&detail.title));
                    self.title_shown = true;
                }
                DetailState::Loaded(detail)
            }
            Err(FetchError::Aborted) => {
                tracing::debug!(movie_id = %id, "detail aborted");
                DetailState::Aborted
            }
            Err(e) => {
                tracing::debug!(movie_id = %id, error = %e, "detail failed");
                DetailState::Failed(e.to_string())
            }
        };
        true
    }

    /// Sets the tentative rating of the open movie.
    ///
    /// `0` clears the rating. Each change to a different non-zero rating
    /// counts as one revision.
    ///
    /// # Errors
    ///
    /// - [`PopcornError::InvalidRating`] if `rating` exceeds the maximum
    /// - [`PopcornError::DetailNotReady`] if no record is loaded
    pub fn set_rating(&mut self, rating: u8) -> Result<()> {
        if rating > MAX_USER_RATING {
            return Err(PopcornError::InvalidRating(rating));
        }
        if self.detail().is_none() {
            return Err(PopcornError::DetailNotReady);
        }

        if rating == 0 {
            self.user_rating = None;
        } else if self.user_rating != Some(rating) {
            self.user_rating = Some(rating);
            self.rating_revisions += 1;
        }
        tracing::debug!(
            rating,
            revisions = self.rating_revisions,
            "user rating changed"
        );
        Ok(())
    }

    /// Builds the watched entry for the open movie from the rating session.
    ///
    /// # Errors
    ///
    /// - [`PopcornError::DetailNotReady`] if no record is loaded
    /// - [`PopcornError::InvalidRating`] if no rating has been given
    pub fn confirm(&self) -> Result<WatchedEntry> {
        let detail = self.detail().ok_or(PopcornError::DetailNotReady)?;
        let rating = self.user_rating.ok_or(PopcornError::InvalidRating(0))?;
        Ok(WatchedEntry::from_detail(detail, rating, self.rating_revisions))
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub const fn state(&self) -> &DetailState {
        &self.state
    }

    #[must_use]
    pub const fn detail(&self) -> Option<&MovieDetail> {
        match &self.state {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, DetailState::Loading)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            DetailState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn user_rating(&self) -> Option<u8> {
        self.user_rating
    }

    #[must_use]
    pub const fn rating_revisions(&self) -> u32 {
        self.rating_revisions
    }

    fn abort_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
            tracing::trace!("previous detail fetch cancelled");
        }
    }

    fn reset_session(&mut self) {
        self.user_rating = None;
        self.rating_revisions = 0;
    }

    fn revert_title(&mut self) {
        if self.title_shown {
            self.title.set_title(DEFAULT_TITLE);
            self.title_shown = false;
        }
    }
}

impl Drop for DetailFetcher {
    fn drop(&mut self) {
        self.abort_in_flight();
        self.revert_title();
    }
}

impl fmt::Debug for DetailFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailFetcher")
            .field("selected", &self.selected)
            .field("state", &self.state)
            .field("user_rating", &self.user_rating)
            .field("rating_revisions", &self.rating_revisions)
            .finish_non_exhaustive()
    }
}
