//! Popcorn: movie search, detail, and watched-list core.
//!
//! Popcorn provides:
//! - Live title search against the OMDb API where the latest query always wins
//! - A detail view per selected movie with a tentative user rating
//! - A persistent watched collection with summary statistics
//! - Scoped global key bindings (Enter focuses search, Escape closes details)
//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Line-command runtime (main.rs)                     │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling, key bindings                     │
//! │  - Search and detail controllers                    │
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ API Layer     │   │ Storage Layer │   │ Worker Layer  │
//! │ (api/)        │   │ (storage/)    │   │ (worker/)     │
//! │ - OMDb client │   │ - JSON file   │   │ - tokio tasks │
//! │ - Cancellation│   │ - Watched list│   │ - Settlements │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Error types (domain/error)                       │
//! │  - Movie model (domain/movie)                       │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - tracing-subscriber with rotating log file        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```toml
//! # ~/.config/popcorn/config.toml
//! api_key = "your-omdb-key"
//! data_dir = "~/.local/share/popcorn"
//! trace_level = "debug"
//! request_timeout_secs = 30
//! ```
//!
//! The `POPCORN_API_KEY` environment variable overrides `api_key`.
//!
//! # Example
//!
//! ```rust
//! use popcorn::{handle_event, Action, Config, Event};
//!
//! let dir = tempfile::tempdir()?;
//! let config = Config {
//!     data_dir: Some(dir.path().to_path_buf()),
//!     ..Default::default()
//! };
//!
//! let mut state = popcorn::initialize(&config, Box::new(|title: &str| println!("{title}")))?;
//! let (_, actions) = handle_event(&mut state, &Event::QueryChanged("batman".into()))?;
//! for action in actions {
//!     if let Action::Fetch(message) = action {
//!         // Hand the request to a `FetchWorker`...
//!         drop(message);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod storage;
pub mod worker;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, Focus, Key, TitleContext};
pub use domain::{FetchError, MovieDetail, MovieSummary, PopcornError, Result, WatchedEntry};

use crate::infrastructure::paths;
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore, WatchedListStore};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable that overrides [`Config::api_key`].
pub const API_KEY_ENV: &str = "POPCORN_API_KEY";

/// Runtime configuration.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OMDb API key. Required for network access.
    pub api_key: String,

    /// Base URL of the OMDb API. Default: `https://www.omdbapi.com/`
    pub base_url: String,

    /// Directory for the watched list and the log file.
    ///
    /// A leading `~` is expanded. Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Tracing level filter.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Per-request timeout in seconds. Default: 30
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.omdbapi.com/".to_string(),
            data_dir: None,
            trace_level: None,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PopcornError::Config`] if the text is not valid TOML or a
    /// value has the wrong type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use popcorn::Config;
    ///
    /// let config = Config::from_toml_str("api_key = \"abc\"\nrequest_timeout_secs = 5")?;
    /// assert_eq!(config.api_key, "abc");
    /// assert_eq!(config.request_timeout_secs, 5);
    /// assert_eq!(config.base_url, "https://www.omdbapi.com/");
    /// # Ok::<(), popcorn::PopcornError>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PopcornError::Config(e.to_string()))
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads the configuration file if present, then applies environment
    /// overrides.
    ///
    /// A missing or invalid file yields the defaults; an invalid file is
    /// reported on stderr since logging is not set up yet.
    #[must_use]
    pub fn load() -> Self {
        let path = paths::config_file();
        let config = if path.exists() {
            Self::from_file(&path).unwrap_or_else(|e| {
                eprintln!("ignoring {}: {e}", path.display());
                Self::default()
            })
        } else {
            Self::default()
        };
        config.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    /// Replaces the API key with `key` when it is set and non-empty.
    #[must_use]
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    /// Data directory after defaults and `~` expansion.
    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.as_ref().map_or_else(paths::default_data_dir, |dir| {
            paths::expand_tilde(&dir.to_string_lossy())
        })
    }
}

/// Opens the storage medium in the configured data directory.
///
/// Falls back to a process-local [`MemoryStore`] when the JSON file cannot be
/// opened, so a broken data directory degrades to an unsaved session.
#[must_use]
pub fn open_medium(config: &Config) -> Arc<dyn KeyValueStore> {
    let path = paths::storage_file(&config.resolved_data_dir());
    match JsonFileStore::new(path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "storage unavailable, watched list will not be saved");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Initializes the application state.
///
/// Opens the storage medium and the watched collection. `title` receives
/// document title changes from the detail view.
///
/// # Errors
///
/// Returns an error if the watched collection cannot claim its storage key.
pub fn initialize(config: &Config, title: Box<dyn TitleContext>) -> Result<AppState> {
    tracing::debug!("initializing popcorn");

    let watched = WatchedListStore::open(open_medium(config))?;
    tracing::info!(watched = watched.len(), "watched list loaded");

    Ok(AppState::new(watched, title))
}
