//! View model representing renderable application state.
//!
//! [`AppView`] is an immutable snapshot computed by [`AppState::view`]. It
//! carries display-ready data only and formats itself as plain text for the
//! line-oriented front end.
//!
//! [`AppState::view`]: crate::app::AppState::view

use crate::app::detail::DetailState;
use crate::domain::{MovieDetail, MovieSummary, WatchedEntry};
use crate::storage::Aggregates;
use std::fmt;

/// Complete view model.
#[derive(Debug, Clone, PartialEq)]
pub struct AppView {
    pub query: String,
    pub search: SearchPane,
    pub detail: Option<DetailPane>,
    pub watched: Vec<WatchedEntry>,
    pub stats: Aggregates,
}

/// Left pane: search results.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPane {
    Empty,
    Loading,
    Error(String),
    Results {
        movies: Vec<MovieSummary>,
        selected: Option<String>,
    },
}

/// Right pane content while a movie is selected.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPane {
    /// The fetch was aborted without a replacement; nothing to show yet.
    Empty,
    Loading,
    Error(String),
    Movie {
        detail: MovieDetail,
        /// Tentative rating of the open session.
        user_rating: Option<u8>,
        /// Rating saved earlier, when the movie is already watched.
        watched_rating: Option<u8>,
    },
}

impl DetailPane {
    pub(crate) fn from_state(
        state: &DetailState,
        user_rating: Option<u8>,
        watched_rating: Option<u8>,
    ) -> Option<Self> {
        match state {
            DetailState::Closed => None,
            DetailState::Aborted => Some(Self::Empty),
            DetailState::Loading => Some(Self::Loading),
            DetailState::Failed(message) => Some(Self::Error(message.clone())),
            DetailState::Loaded(detail) => Some(Self::Movie {
                detail: detail.clone(),
                user_rating,
                watched_rating,
            }),
        }
    }
}

impl fmt::Display for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "search: {:?}", self.query)?;
        match &self.search {
            SearchPane::Empty => {}
            SearchPane::Loading => writeln!(f, "  Loading...")?,
            SearchPane::Error(message) => writeln!(f, "  ⛔️ {message}")?,
            SearchPane::Results { movies, selected } => {
                writeln!(f, "  found {} results", movies.len())?;
                for movie in movies {
                    let marker = if selected.as_deref() == Some(movie.id.as_str()) { '>' } else { ' ' };
                    writeln!(f, "  {marker} {} {} ({})", movie.id, movie.title, movie.year)?;
                }
            }
        }

        match &self.detail {
            None => {}
            Some(DetailPane::Empty) => writeln!(f, "detail: -")?,
            Some(DetailPane::Loading) => writeln!(f, "detail: Loading...")?,
            Some(DetailPane::Error(message)) => writeln!(f, "detail: ⛔️ {message}")?,
            Some(DetailPane::Movie {
                detail,
                user_rating,
                watched_rating,
            }) => {
                writeln!(f, "detail: {} ({})", detail.title, detail.release_date)?;
                writeln!(f, "  {} | {}", detail.runtime, detail.genre)?;
                writeln!(f, "  ⭐️ {} IMDb rating", detail.external_rating_text)?;
                writeln!(f, "  {}", detail.plot)?;
                writeln!(f, "  Starring {}", detail.actors)?;
                writeln!(f, "  Directed by {}", detail.director)?;
                match (watched_rating, user_rating) {
                    (Some(rating), _) => writeln!(f, "  You rated this movie {rating} ⭐️")?,
                    (None, Some(rating)) => writeln!(f, "  Your rating: {rating} (add to list)")?,
                    (None, None) => writeln!(f, "  Your rating: -")?,
                }
            }
        }

        writeln!(
            f,
            "watched: #️⃣ {} movies | ⭐️ {} | 🌟 {} | ⏳ {} min",
            self.stats.count,
            Aggregates::display(self.stats.average_external_rating),
            Aggregates::display(self.stats.average_user_rating),
            Aggregates::display(self.stats.average_runtime),
        )?;
        for entry in &self.watched {
            let runtime = entry
                .runtime_minutes
                .map_or_else(|| "-".to_string(), |m| m.to_string());
            writeln!(
                f,
                "  {} {} | ⭐️ {} | 🌟 {} | ⏳ {runtime} min",
                entry.movie_id,
                entry.title,
                Aggregates::display(entry.external_rating),
                entry.user_rating,
            )?;
        }
        Ok(())
    }
}
