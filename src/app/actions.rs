//! Actions representing side effects to be executed by the runtime.
//!
//! This module defines the [`Action`] type, the imperative commands produced
//! by the event handler after processing user input or worker settlements.
//! Actions bridge pure state transitions and effectful operations such as
//! network fetches or moving input focus.
//!
//! # Example
//!
//! ```rust
//! use popcorn::app::Action;
//! use popcorn::worker::WorkerMessage;
//!
//! let actions = vec![
//!     Action::Fetch(WorkerMessage::search(1, "batman".to_string())),
//!     Action::FocusSearchInput,
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use crate::worker::WorkerMessage;

/// Commands produced by the event handler and executed by the runtime.
#[derive(Debug, Clone)]
pub enum Action {
    /// Hands a request to the fetch worker.
    ///
    /// The settlement comes back as an [`crate::app::Event::WorkerResponse`].
    Fetch(WorkerMessage),

    /// Moves keyboard focus to the search input.
    FocusSearchInput,

    /// Stops the runtime. In-flight requests are already cancelled.
    Quit,
}
