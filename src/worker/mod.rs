//! Fetch worker for asynchronous network requests.
//!
//! - `messages`: Request/response protocol with per-request cancel tokens
//! - `handler`: Worker that runs requests as tokio tasks

pub mod handler;
pub mod messages;

pub use handler::{classify, FetchWorker};
pub use messages::{WorkerMessage, WorkerResponse};
