//! Infrastructure layer for filesystem and environment interactions.

pub mod paths;

pub use paths::{config_file, default_data_dir, expand_tilde, log_file, storage_file};
