//! Tracing initialization and subscriber setup.
//!
//! Configures the tracing subscriber pipeline from `tracing` macros to the
//! rotating log file.

use super::file_writer::FileWriter;
use crate::infrastructure::paths;
use crate::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber writing to `popcorn.log`.
///
/// # Trace Level Resolution
///
/// 1. `RUST_LOG` environment variable
/// 2. `config.trace_level`
/// 3. Default: `"info"`
///
/// # Initialization Behavior
///
/// - Creates the data directory if it doesn't exist
/// - Silently skips logging if the directory cannot be created
/// - Idempotent: only the first call installs a subscriber
///
/// # Example
///
/// ```rust
/// use popcorn::observability::init_tracing;
/// use popcorn::Config;
///
/// let dir = tempfile::tempdir()?;
/// let config = Config {
///     data_dir: Some(dir.path().to_path_buf()),
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn init_tracing(config: &Config) {
    let data_dir = config.resolved_data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.trace_level.as_deref().unwrap_or("info"))
    });

    let writer = FileWriter::new(paths::log_file(&data_dir));
    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
