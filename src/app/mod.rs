//! Application layer coordinating state, events, and actions.
//!
//! This module sits between the runtime (main.rs) and the domain, storage,
//! and worker layers.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! User Input → Events → Event Handler → State Mutations → Actions → Side Effects
//!                           ↑                                  ↓
//!                           └──────── Worker Responses ────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`detail`]: Detail fetcher and rating session of the selected movie
//! - [`handler`]: Event processing logic and state transition coordinator
//! - [`keys`]: Scoped global key bindings
//! - [`modes`]: Input focus
//! - [`search`]: Live search controller with last-query-wins semantics
//! - [`state`]: Central application state container
//! - [`title`]: Document title context
//! - [`view`]: View model computed from state

pub mod actions;
pub mod detail;
pub mod handler;
pub mod keys;
pub mod modes;
pub mod search;
pub mod state;
pub mod title;
pub mod view;

pub use actions::Action;
pub use detail::{DetailFetcher, DetailState};
pub use handler::{handle_event, Event};
pub use keys::{Key, KeyBinding, KeyDispatcher, KeyFilter};
pub use modes::Focus;
pub use search::{SearchController, SearchResult, SearchSnapshot, MIN_QUERY_LEN};
pub use state::AppState;
pub use title::{DocumentTitle, TitleContext, DEFAULT_TITLE};
pub use view::AppView;
