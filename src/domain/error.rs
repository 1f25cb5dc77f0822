//! Error types for the popcorn crate.
//!
//! This module defines the crate-wide error type [`PopcornError`], the
//! network-level [`FetchError`] taxonomy, and a [`Result`] alias. All errors
//! are implemented with `thiserror`.

use thiserror::Error;

/// Failure classification for a single network fetch.
///
/// Transport and domain failures both reach the user as a message; an
/// aborted fetch never does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network, DNS, timeout, non-2xx status or an unparseable body.
    #[error("{0}")]
    Transport(String),

    /// The API answered but reported a domain condition such as
    /// "Movie not found!" or "Incorrect IMDb ID.".
    #[error("{0}")]
    Domain(String),

    /// The request was cancelled before it settled.
    #[error("request aborted")]
    Aborted,
}

impl FetchError {
    /// Returns `true` for the cancellation outcome.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Message shown to the user, or `None` for an aborted request.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Transport(msg) | Self::Domain(msg) => Some(msg.clone()),
            Self::Aborted => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// The main error type for popcorn operations.
#[derive(Debug, Error)]
pub enum PopcornError {
    /// Reading from or writing to the storage medium failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized or deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A network fetch failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The movie is already in the watched collection.
    #[error("Movie already in watched list: {0}")]
    AlreadyWatched(String),

    /// A watched entry failed validation.
    #[error("Invalid watched entry: {0}")]
    InvalidEntry(String),

    /// A user rating outside `0..=10`.
    #[error("Invalid rating {0}: expected 0-10")]
    InvalidRating(u8),

    /// Confirmation was attempted before the detail loaded or a rating was set.
    #[error("Movie details are not ready to be added")]
    DetailNotReady,

    /// Two persistent stores tried to share one storage key.
    #[error("Storage key already in use: {0}")]
    StorageKeyInUse(String),
}

/// A specialized `Result` type for popcorn operations.
pub type Result<T> = std::result::Result<T, PopcornError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_has_no_user_message() {
        assert_eq!(FetchError::Aborted.user_message(), None);
        assert!(FetchError::Aborted.is_aborted());
    }

    #[test]
    fn transport_and_domain_render_the_same_way() {
        let transport = FetchError::Transport("HTTP 503".to_string());
        let domain = FetchError::Domain("Movie not found!".to_string());
        assert_eq!(transport.user_message().as_deref(), Some("HTTP 503"));
        assert_eq!(domain.user_message().as_deref(), Some("Movie not found!"));
        assert_eq!(domain.to_string(), "Movie not found!");
    }
}
