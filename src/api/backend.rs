//! Movie database abstraction.
//!
//! [`MovieApi`] is the seam between the fetch worker and the remote movie
//! database, so tests can script responses and latency without a network.

use crate::api::cancel::CancelToken;
use crate::domain::{FetchError, MovieDetail, MovieSummary};
use futures_util::future::BoxFuture;

/// Result of one fetch against the movie database.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Abstraction over the remote movie database.
///
/// Implementations must observe `cancel` and settle with
/// [`FetchError::Aborted`] once it fires. They may still complete on the
/// remote side; the caller discards the outcome either way.
///
/// # Implementations
///
/// - [`crate::api::OmdbClient`]: HTTP client for omdbapi.com
pub trait MovieApi: Send + Sync {
    /// Searches titles matching `query`, in the order the database returns.
    fn search(&self, query: &str, cancel: CancelToken) -> BoxFuture<'static, FetchResult<Vec<MovieSummary>>>;

    /// Fetches the full record for one movie id.
    fn detail(&self, id: &str, cancel: CancelToken) -> BoxFuture<'static, FetchResult<MovieDetail>>;
}
