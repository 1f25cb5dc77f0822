//! Platform path resolution.
//!
//! Locations follow the platform conventions reported by the `dirs` crate
//! (XDG directories on Linux, `~/Library/Application Support` on macOS,
//! `%APPDATA%` on Windows). When the platform reports nothing, paths fall
//! back to the working directory.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "popcorn";

/// Returns the default data directory for popcorn storage and logs.
///
/// Typically `~/.local/share/popcorn` on Linux.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the path of the configuration file.
///
/// Typically `~/.config/popcorn/config.toml` on Linux.
#[must_use]
pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Returns the JSON storage file inside `data_dir`.
#[must_use]
pub fn storage_file(data_dir: &Path) -> PathBuf {
    data_dir.join("popcorn.json")
}

/// Returns the log file inside `data_dir`.
#[must_use]
pub fn log_file(data_dir: &Path) -> PathBuf {
    data_dir.join("popcorn.log")
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or when no home directory is known, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use popcorn::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
/// if let Some(home) = dirs::home_dir() {
///     assert_eq!(expand_tilde("~/movies"), home.join("movies"));
///     assert_eq!(expand_tilde("~"), home);
/// }
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(path);
    };
    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_inside_data_dir() {
        let dir = Path::new("/tmp/popcorn-data");
        assert_eq!(storage_file(dir), dir.join("popcorn.json"));
        assert_eq!(log_file(dir), dir.join("popcorn.log"));
    }

    #[test]
    fn config_file_is_toml() {
        let path = config_file();
        assert!(path.ends_with("popcorn/config.toml"));
    }
}
