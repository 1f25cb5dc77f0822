//! Line-command runtime and entry point.
//!
//! This binary is the thin integration layer between the popcorn library and
//! a terminal. It reads one command per line from stdin, translates it into
//! library events, executes the resulting actions, and prints the view model
//! whenever the state changed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐
//! │  current-thread runtime │
//! │  ┌──────────────────┐   │
//! │  │ AppState + loop  │   │  ← stdin commands, event handling
//! │  └──────────────────┘   │
//! │       │        ▲        │
//! │ Fetch │        │ WorkerResponse
//! │       ▼        │        │
//! │  ┌──────────────────┐   │
//! │  │   FetchWorker    │   │  ← one task per request
//! │  └──────────────────┘   │
//! └─────────────────────────┘
//! ```
//!
//! # Commands
//!
//! - `query <text>`: Replace the search text (empty clears)
//! - `select <id>`: Toggle the detail view of a movie
//! - `rate <0-10>`: Set the tentative rating (`0` clears)
//! - `add`: Add the open movie to the watched list
//! - `remove <id>`: Remove a movie from the watched list
//! - `close`: Close the detail view
//! - `blur`: Move focus out of the search input
//! - `key <enter|esc|c>`: Press a key
//! - `list`: Print the full view
//! - `stats`: Print watched-list statistics
//! - `quit`: Cancel in-flight requests and exit

#![allow(clippy::multiple_crate_versions)]

use popcorn::api::OmdbClient;
use popcorn::storage::Aggregates;
use popcorn::worker::FetchWorker;
use popcorn::{handle_event, Action, AppState, Config, Event, Key};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Event(Event),
    List,
    Stats,
}

/// Translates a command line into a [`Command`].
///
/// Returns `Ok(None)` for blank lines. Whitespace between the command name
/// and its argument is dropped; the rest of a query is kept verbatim.
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, arg) = line
        .trim_start()
        .split_once(char::is_whitespace)
        .map_or((line.trim(), ""), |(name, arg)| (name, arg.trim_start()));

    let event = match name {
        "" => return Ok(None),
        "query" | "q" => Event::QueryChanged(arg.to_string()),
        "select" | "s" => Event::SelectMovie(required(name, arg)?),
        "rate" | "r" => {
            let rating = arg
                .trim()
                .parse::<u8>()
                .map_err(|_| format!("rate: expected a number 0-10, got {arg:?}"))?;
            Event::RateMovie(rating)
        }
        "add" | "a" => Event::AddWatched,
        "remove" | "rm" => Event::RemoveWatched(required(name, arg)?),
        "close" => Event::CloseDetails,
        "blur" => Event::Blur,
        "key" | "k" => Event::Key(arg.parse::<Key>()?),
        "list" | "l" => return Ok(Some(Command::List)),
        "stats" => return Ok(Some(Command::Stats)),
        "quit" | "exit" => Event::Shutdown,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(Command::Event(event)))
}

fn required(name: &str, arg: &str) -> Result<String, String> {
    let arg = arg.trim();
    if arg.is_empty() {
        Err(format!("{name}: missing argument"))
    } else {
        Ok(arg.to_string())
    }
}

fn print_stats(state: &AppState) {
    let stats = state.watched.aggregates();
    println!(
        "#️⃣ {} movies | ⭐️ {} | 🌟 {} | ⏳ {} min",
        stats.count,
        Aggregates::display(stats.average_external_rating),
        Aggregates::display(stats.average_user_rating),
        Aggregates::display(stats.average_runtime),
    );
}

/// Executes actions, returning `false` once the runtime should stop.
fn execute(worker: &FetchWorker, actions: Vec<Action>) -> bool {
    let mut running = true;
    for action in actions {
        match action {
            Action::Fetch(message) => {
                worker.dispatch(message);
            }
            Action::FocusSearchInput => println!("[focus] search input"),
            Action::Quit => running = false,
        }
    }
    running
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::load();
    popcorn::observability::init_tracing(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "popcorn starting");

    let api = match OmdbClient::new(&config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let title = Box::new(|title: &str| println!("[title] {title}"));
    let mut state = match popcorn::initialize(&config, title) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let (worker, mut responses) = FetchWorker::channel(Arc::new(api));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let event = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(Command::Event(event))) => event,
                    Ok(Some(Command::List)) => {
                        print!("{}", state.view());
                        continue;
                    }
                    Ok(Some(Command::Stats)) => {
                        print_stats(&state);
                        continue;
                    }
                    Ok(None) => continue,
                    Err(message) => {
                        eprintln!("{message}");
                        continue;
                    }
                },
                Ok(None) => Event::Shutdown,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    Event::Shutdown
                }
            },
            Some(response) = responses.recv() => Event::WorkerResponse(response),
        };

        match handle_event(&mut state, &event) {
            Ok((render, actions)) => {
                if render {
                    print!("{}", state.view());
                }
                if !execute(&worker, actions) {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "event rejected");
                eprintln!("{e}");
            }
        }
    }

    tracing::info!("popcorn stopped");
    ExitCode::SUCCESS
}
