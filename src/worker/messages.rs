//! Request and response protocol between the event loop and the fetch worker.
//!
//! Every request carries the [`CancelToken`] of its cycle and the token that
//! identifies which cycle it belongs to: a generation number for searches and
//! the movie id for details. Responses echo that token back so the receiving
//! controller can discard settlements from superseded cycles.

use crate::api::{CancelToken, FetchResult};
use crate::domain::{MovieDetail, MovieSummary};

/// Macro to generate builder methods for `WorkerMessage` variants.
///
/// Each builder creates a fresh [`CancelToken`] for the request.
macro_rules! worker_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " message with a fresh cancel token")]
                #[must_use]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        cancel: CancelToken::new(),
                    }
                }
            )*
        }
    };
}

worker_message_builders! {
    search(Search { generation: u64, query: String }),
    detail(Detail { id: String }),
}

/// Requests sent from the event loop to the fetch worker.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Run a title search for one search cycle.
    Search {
        /// Generation of the cycle that issued the request.
        generation: u64,

        /// Query text, already validated as long enough.
        query: String,

        /// Cancelled when the cycle is superseded.
        cancel: CancelToken,
    },

    /// Load the full record of one movie.
    Detail {
        /// Movie id; doubles as the generation token of the detail cycle.
        id: String,

        /// Cancelled when the selection changes or closes.
        cancel: CancelToken,
    },
}

impl WorkerMessage {
    /// Cancellation token of the request.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancelToken {
        match self {
            Self::Search { cancel, .. } | Self::Detail { cancel, .. } => cancel,
        }
    }
}

/// Settlements sent from the fetch worker back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerResponse {
    /// A search request finished, failed, or was aborted.
    SearchSettled {
        generation: u64,
        outcome: FetchResult<Vec<MovieSummary>>,
    },

    /// A detail request finished, failed, or was aborted.
    DetailSettled {
        id: String,
        outcome: FetchResult<MovieDetail>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_attach_independent_tokens() {
        let first = WorkerMessage::search(1, "batman".to_string());
        let second = WorkerMessage::detail("tt0096895".to_string());
        first.cancel_token().cancel();
        assert!(first.cancel_token().is_cancelled());
        assert!(!second.cancel_token().is_cancelled());
    }
}
