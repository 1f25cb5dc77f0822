//! Rotating file writer with size-based rotation and backup retention.
//!
//! [`FileWriter`] is the sink of the fmt layer. When the log file exceeds a
//! size threshold it is renamed with a timestamp suffix and a fresh file is
//! started. Only a fixed number of backups is kept.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// Maximum file size before rotation (10 MB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of backup files to retain after rotation.
const MAX_BACKUP_FILES: usize = 3;

#[derive(Debug)]
struct Inner {
    file_path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    /// Lazily opened on first write.
    file: Option<File>,
}

/// Shared rotating log file.
///
/// Clones write to the same file through one lock, so a clone can be handed
/// to every event the subscriber formats.
///
/// # Backup Naming
///
/// Backups are named `<file name>.<UTC timestamp>`, for example
/// `popcorn.log.20240101T120000.123Z`.
#[derive(Debug, Clone)]
pub struct FileWriter {
    inner: Arc<Mutex<Inner>>,
}

impl FileWriter {
    /// Creates a writer for `file_path` with the default limits.
    ///
    /// The file is not opened until the first write.
    #[must_use]
    pub fn new(file_path: PathBuf) -> Self {
        Self::with_limits(file_path, MAX_FILE_SIZE_BYTES, MAX_BACKUP_FILES)
    }

    #[must_use]
    pub fn with_limits(file_path: PathBuf, max_bytes: u64, max_backups: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                file_path,
                max_bytes,
                max_backups,
                file: None,
            })),
        }
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| io::Error::other(format!("log writer poisoned: {e}")))
    }
}

impl Inner {
    fn check_and_rotate(&mut self) -> io::Result<()> {
        if let Ok(metadata) = fs::metadata(&self.file_path) {
            if metadata.len() > self.max_bytes {
                self.file = None;
                self.rotate_files()?;
            }
        }
        Ok(())
    }

    fn rotate_files(&self) -> io::Result<()> {
        let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let mut backup_name = self.file_path.file_name().unwrap_or_default().to_os_string();
        backup_name.push(format!(".{timestamp}"));
        let backup_path = self.file_path.with_file_name(backup_name);

        if self.file_path.exists() {
            fs::rename(&self.file_path, &backup_path)?;
        }

        self.cleanup_old_backups()
    }

    fn cleanup_old_backups(&self) -> io::Result<()> {
        let parent_dir = self.file_path.parent().unwrap_or_else(|| Path::new("."));
        let Some(file_name) = self.file_path.file_name().and_then(|s| s.to_str()) else {
            return Ok(());
        };
        let prefix = format!("{file_name}.");

        let mut backups: Vec<PathBuf> = fs::read_dir(parent_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix))
            })
            .collect();

        // Timestamp suffixes sort chronologically; newest first.
        backups.sort_by(|a, b| b.cmp(a));

        for old_backup in backups.iter().skip(self.max_backups) {
            let _ = fs::remove_file(old_backup);
        }

        Ok(())
    }

    fn file(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)?;
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file unavailable"))
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.lock()?;
        inner.check_and_rotate()?;
        let file = inner.file()?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self.lock()?;
        match inner.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
