//! Domain layer for popcorn.
//!
//! Core movie and watched-list types plus the error taxonomy, independent of
//! the network client, the storage medium and the event loop.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`movie`]: Movie summaries, detail records and watched entries
//!
//! # Examples
//!
//! ```
//! use popcorn::domain::{MovieSummary, Result};
//!
//! fn summary() -> Result<MovieSummary> {
//!     Ok(MovieSummary::new("tt0096895", "Batman", "1989", "N/A"))
//! }
//! ```

pub mod error;
pub mod movie;

pub use error::{FetchError, PopcornError, Result};
pub use movie::{MovieDetail, MovieSummary, WatchedEntry, MAX_USER_RATING};
