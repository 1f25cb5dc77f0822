//! Storage layer for persistent client-side state.
//!
//! This module provides the durable key-value abstraction, its file and
//! in-memory implementations, the generic [`PersistentStore`] wrapper, and the
//! watched-list store built on top of it.
//!
//! # Modules
//!
//! - `backend`: `KeyValueStore` trait and key ownership registry
//! - `json`: JSON file-based medium with atomic writes
//! - `memory`: In-memory medium
//! - `persistent`: Value persisted under one key
//! - `watched`: Watched collection and its aggregates

pub mod backend;
pub mod json;
pub mod memory;
pub mod persistent;
pub mod watched;

pub use backend::KeyValueStore;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use persistent::PersistentStore;
pub use watched::{Aggregates, WatchedListStore, WATCHED_KEY};
