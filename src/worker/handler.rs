//! Fetch worker executing network requests off the event loop.
//!
//! [`FetchWorker`] runs each [`WorkerMessage`] as its own tokio task against
//! a [`MovieApi`] and posts the settlement back over an unbounded channel.
//! The event loop never awaits a fetch directly; it only reacts to
//! [`WorkerResponse`] values arriving on the channel.

use crate::api::{CancelToken, FetchResult, MovieApi};
use crate::domain::FetchError;
use crate::worker::{WorkerMessage, WorkerResponse};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Dispatches fetch requests and reports their settlements.
#[derive(Clone)]
pub struct FetchWorker {
    api: Arc<dyn MovieApi>,
    responses: mpsc::UnboundedSender<WorkerResponse>,
}

impl FetchWorker {
    #[must_use]
    pub fn new(api: Arc<dyn MovieApi>, responses: mpsc::UnboundedSender<WorkerResponse>) -> Self {
        Self { api, responses }
    }

    /// Creates a worker together with the receiver of its settlements.
    #[must_use]
    pub fn channel(api: Arc<dyn MovieApi>) -> (Self, mpsc::UnboundedReceiver<WorkerResponse>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(api, tx), rx)
    }

    /// Runs `message` on a new task and posts its settlement.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, message: WorkerMessage) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let responses = self.responses.clone();
        let span = tracing::debug_span!("worker_handle_message", message_type = ?message);

        tokio::spawn(
            async move {
                let response = Self::execute(api.as_ref(), message).await;
                if responses.send(response).is_err() {
                    tracing::debug!("response receiver dropped, settlement discarded");
                }
            }
            .instrument(span),
        )
    }

    /// Executes `message` to completion and returns its settlement.
    ///
    /// A request whose token is cancelled settles as
    /// [`FetchError::Aborted`] whatever the remote outcome was.
    pub async fn execute(api: &dyn MovieApi, message: WorkerMessage) -> WorkerResponse {
        match message {
            WorkerMessage::Search {
                generation,
                query,
                cancel,
            } => {
                let outcome = race_cancel(&cancel, api.search(&query, cancel.clone())).await;
                tracing::debug!(generation, ok = outcome.is_ok(), "search settled");
                WorkerResponse::SearchSettled { generation, outcome }
            }
            WorkerMessage::Detail { id, cancel } => {
                let outcome = race_cancel(&cancel, api.detail(&id, cancel.clone())).await;
                tracing::debug!(movie_id = %id, ok = outcome.is_ok(), "detail settled");
                WorkerResponse::DetailSettled { id, outcome }
            }
        }
    }
}

async fn race_cancel<T, F>(cancel: &CancelToken, fetch: F) -> FetchResult<T>
where
    F: std::future::Future<Output = FetchResult<T>>,
{
    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(FetchError::Aborted),
        outcome = fetch => outcome,
    };
    classify(outcome, cancel)
}

/// Reclassifies the outcome of a cancelled request as aborted.
pub fn classify<T>(outcome: FetchResult<T>, cancel: &CancelToken) -> FetchResult<T> {
    if cancel.is_cancelled() {
        Err(FetchError::Aborted)
    } else {
        outcome
    }
}
