//! File-based observability.
//!
//! Structured `tracing` events and spans are formatted by
//! `tracing-subscriber` and written to a rotating log file:
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer → FileWriter → popcorn.log
//! ```
//!
//! # Features
//!
//! - **File Output**: Logs written to `<data_dir>/popcorn.log`, never to the
//!   terminal the front end draws on
//! - **Automatic Rotation**: Files rotate at 10MB with 3-backup retention
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup
//! - [`file_writer`]: Rotating file writer with size-based rotation

mod file_writer;
mod init;

pub use file_writer::FileWriter;
pub use init::init_tracing;
