//! End-to-end flows through the event handler and the fetch worker, driven by
//! a scripted movie database with controllable latency.

use futures_util::future::{BoxFuture, FutureExt};
use popcorn::api::{CancelToken, FetchResult, MovieApi};
use popcorn::app::{DocumentTitle, SearchResult, DEFAULT_TITLE};
use popcorn::storage::{MemoryStore, WatchedListStore};
use popcorn::worker::{FetchWorker, WorkerMessage, WorkerResponse};
use popcorn::{handle_event, Action, AppState, Event, FetchError, MovieDetail, MovieSummary};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Default)]
struct ScriptedApi {
    searches: HashMap<String, (u64, FetchResult<Vec<MovieSummary>>)>,
    details: HashMap<String, (u64, FetchResult<MovieDetail>)>,
}

impl ScriptedApi {
    fn search(mut self, query: &str, delay_ms: u64, outcome: FetchResult<Vec<MovieSummary>>) -> Self {
        self.searches.insert(query.to_string(), (delay_ms, outcome));
        self
    }

    fn detail(mut self, id: &str, delay_ms: u64, outcome: FetchResult<MovieDetail>) -> Self {
        self.details.insert(id.to_string(), (delay_ms, outcome));
        self
    }
}

fn scripted<T: Clone + Send + 'static>(
    script: Option<&(u64, FetchResult<T>)>,
) -> BoxFuture<'static, FetchResult<T>> {
    let (delay, outcome) = script
        .cloned()
        .unwrap_or((0, Err(FetchError::Transport("unscripted request".to_string()))));
    async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        outcome
    }
    .boxed()
}

impl MovieApi for ScriptedApi {
    fn search(&self, query: &str, _cancel: CancelToken) -> BoxFuture<'static, FetchResult<Vec<MovieSummary>>> {
        scripted(self.searches.get(query))
    }

    fn detail(&self, id: &str, _cancel: CancelToken) -> BoxFuture<'static, FetchResult<MovieDetail>> {
        scripted(self.details.get(id))
    }
}

fn movie(id: &str, title: &str) -> MovieSummary {
    MovieSummary::new(id, title, "1989", "N/A")
}

fn detail(id: &str, title: &str, runtime: u32, rating: f64) -> MovieDetail {
    MovieDetail {
        id: id.to_string(),
        title: title.to_string(),
        runtime: format!("{runtime} min"),
        runtime_minutes: Some(runtime),
        external_rating_text: rating.to_string(),
        external_rating: Some(rating),
        ..MovieDetail::default()
    }
}

struct Harness {
    state: AppState,
    title: DocumentTitle,
    worker: FetchWorker,
    responses: UnboundedReceiver<WorkerResponse>,
    dispatched: Vec<WorkerMessage>,
}

impl Harness {
    fn new(api: ScriptedApi) -> Self {
        let title = DocumentTitle::default();
        let watched = WatchedListStore::open(Arc::new(MemoryStore::new())).expect("open watched");
        let state = AppState::new(watched, Box::new(title.clone()));
        let (worker, responses) = FetchWorker::channel(Arc::new(api));
        Self {
            state,
            title,
            worker,
            responses,
            dispatched: Vec::new(),
        }
    }

    fn send(&mut self, event: Event) -> popcorn::Result<()> {
        let (_, actions) = handle_event(&mut self.state, &event)?;
        for action in actions {
            if let Action::Fetch(message) = action {
                self.dispatched.push(message.clone());
                self.worker.dispatch(message);
            }
        }
        Ok(())
    }

    /// Receives and applies the next settlement.
    async fn settle_next(&mut self) -> WorkerResponse {
        let response = self.responses.recv().await.expect("worker response");
        handle_event(&mut self.state, &Event::WorkerResponse(response.clone())).expect("settle");
        response
    }
}

#[tokio::test(start_paused = true)]
async fn typing_fetches_once_and_latest_query_wins() {
    let api = ScriptedApi::default()
        .search("bat", 300, Ok(vec![movie("tt1", "Old Bat")]))
        .search("batman", 50, Ok(vec![movie("tt2", "Batman")]));
    let mut h = Harness::new(api);

    for query in ["b", "ba", "bat"] {
        h.send(Event::QueryChanged(query.to_string())).expect("query");
    }
    assert_eq!(h.dispatched.len(), 1);
    h.send(Event::QueryChanged("batman".to_string())).expect("query");
    assert_eq!(h.dispatched.len(), 2);

    let first = h.settle_next().await;
    assert!(matches!(
        first,
        WorkerResponse::SearchSettled { outcome: Err(FetchError::Aborted), .. }
    ));
    assert!(h.state.search.is_loading());

    h.settle_next().await;
    assert_eq!(h.state.search.query(), "batman");
    assert_eq!(h.state.search.movies(), [movie("tt2", "Batman")].as_slice());
    assert_eq!(h.state.search.error(), None);
}

#[tokio::test(start_paused = true)]
async fn search_rate_and_add_records_revisions() {
    let api = ScriptedApi::default()
        .search("bat", 20, Ok(vec![movie("tt001", "Batman"), movie("tt002", "Batman Returns")]))
        .detail("tt002", 20, Ok(detail("tt002", "Batman Returns", 126, 7.0)));
    let mut h = Harness::new(api);

    for query in ["b", "ba", "bat"] {
        h.send(Event::QueryChanged(query.to_string())).expect("query");
    }
    h.settle_next().await;
    assert_eq!(h.state.search.movies().len(), 2);

    h.send(Event::SelectMovie("tt002".to_string())).expect("select");
    assert!(h.state.detail.is_loading());
    h.settle_next().await;
    assert_eq!(h.title.current(), "Movie: Batman Returns");

    h.send(Event::RateMovie(7)).expect("rate");
    h.send(Event::RateMovie(9)).expect("rate");
    h.send(Event::AddWatched).expect("add");

    let entry = h.state.watched.get("tt002").expect("watched entry");
    assert_eq!(entry.user_rating, 9);
    assert_eq!(entry.rating_revision_count, 2);
    assert_eq!(entry.runtime_minutes, Some(126));
    assert_eq!(h.state.detail.selected_id(), None);
    assert_eq!(h.title.current(), DEFAULT_TITLE);

    let stats = h.state.watched.aggregates();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.average_user_rating, Some(9.0));
    assert_eq!(stats.average_external_rating, Some(7.0));
    assert_eq!(stats.average_runtime, Some(126.0));
}

#[tokio::test(start_paused = true)]
async fn later_detail_selection_wins() {
    let api = ScriptedApi::default()
        .detail("A", 500, Ok(detail("A", "Alpha", 90, 6.0)))
        .detail("B", 100, Ok(detail("B", "Beta", 100, 8.0)));
    let mut h = Harness::new(api);

    h.send(Event::SelectMovie("A".to_string())).expect("select A");
    h.send(Event::SelectMovie("B".to_string())).expect("select B");

    // A settles first as aborted and is discarded; B follows.
    h.settle_next().await;
    assert!(h.state.detail.is_loading());
    h.settle_next().await;

    assert_eq!(h.state.detail.detail().map(|d| d.title.as_str()), Some("Beta"));
    assert_eq!(h.title.current(), "Movie: Beta");
}

#[tokio::test(start_paused = true)]
async fn escape_closes_details_and_cancels_fetch() {
    let api = ScriptedApi::default().detail("A", 500, Ok(detail("A", "Alpha", 90, 6.0)));
    let mut h = Harness::new(api);

    h.send(Event::SelectMovie("A".to_string())).expect("select");
    h.send(Event::Key(popcorn::Key::Escape)).expect("escape");
    assert!(h.dispatched[0].cancel_token().is_cancelled());

    let response = h.settle_next().await;
    assert_eq!(
        response,
        WorkerResponse::DetailSettled {
            id: "A".to_string(),
            outcome: Err(FetchError::Aborted),
        }
    );
    assert_eq!(h.state.detail.selected_id(), None);
    assert_eq!(h.title.current(), DEFAULT_TITLE);
}

#[tokio::test(start_paused = true)]
async fn domain_failure_surfaces_message() {
    let api = ScriptedApi::default().search(
        "qwzx",
        10,
        Err(FetchError::Domain("Movie not found!".to_string())),
    );
    let mut h = Harness::new(api);

    h.send(Event::QueryChanged("qwzx".to_string())).expect("query");
    h.settle_next().await;

    assert_eq!(h.state.search.error(), Some("Movie not found!"));
    assert!(h.state.search.movies().is_empty());
    assert!(!h.state.search.is_loading());
}

#[tokio::test(start_paused = true)]
async fn cancelled_search_is_aborted_not_failed() {
    let api = ScriptedApi::default().search("heat", 1_000, Ok(vec![movie("tt3", "Heat")]));
    let mut h = Harness::new(api);
    let mut updates = h.state.search.subscribe();

    h.send(Event::QueryChanged("heat".to_string())).expect("query");
    assert!(updates.borrow_and_update().is_loading());

    assert!(h.state.search.cancel());
    h.settle_next().await;

    assert_eq!(h.state.search.result(), &SearchResult::Aborted);
    assert_eq!(h.state.search.error(), None);
    assert!(updates.has_changed().expect("sender alive"));
    assert_eq!(updates.borrow().result, SearchResult::Aborted);
}
