//! File sink implementation

use crate::core::{LoggerError, Result, Sink};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-mode log file, identified by its resolved absolute path
pub struct FileSink {
    file: File,
    path: PathBuf,
    name: String,
}

impl FileSink {
    /// Open `path` for appending, creating it if it does not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_logger_tree::sinks::FileSink;
    ///
    /// let sink = FileSink::open("/var/log/app.log").unwrap();
    /// assert!(sink.path().is_absolute());
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let requested = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(requested)
            .map_err(|e| LoggerError::file_sink(requested, e))?;
        let path = requested
            .canonicalize()
            .map_err(|e| LoggerError::file_sink(requested, e))?;
        let name = path.display().to_string();

        Ok(Self { file, path, name })
    }

    /// Resolved path of the open file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `path` resolves to the file this sink already has open
    pub fn is_open_to(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref()
            .canonicalize()
            .map(|resolved| resolved == self.path)
            .unwrap_or(false)
    }

    #[cfg(feature = "file-lock")]
    fn write_locked(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        use fs2::FileExt;

        // advisory lock keeps lines whole across processes sharing the file
        self.file.lock_exclusive()?;
        let written = self.file.write_all(bytes);
        let unlocked = FileExt::unlock(&self.file);
        written.and(unlocked)
    }

    #[cfg(not(feature = "file-lock"))]
    fn write_locked(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(bytes)
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}

impl Sink for FileSink {
    fn write_record(&mut self, record: &str) -> Result<()> {
        self.write_locked(record.as_bytes()).map_err(|e| {
            LoggerError::io_operation("writing log file", self.path.display().to_string(), e)
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}
