//! Network collaborator for the movie database.
//!
//! The application layer never talks HTTP directly. It emits fetch requests
//! which the worker executes against a [`MovieApi`] implementation, passing a
//! [`CancelToken`] the implementation must observe.
//!
//! # Modules
//!
//! - [`backend`]: The `MovieApi` trait
//! - [`cancel`]: Cooperative cancellation token
//! - [`models`]: OMDb wire payloads and their conversion to domain types
//! - [`omdb`]: `reqwest`-based OMDb client

pub mod backend;
pub mod cancel;
pub mod models;
pub mod omdb;

pub use backend::{FetchResult, MovieApi};
pub use cancel::CancelToken;
pub use omdb::OmdbClient;
