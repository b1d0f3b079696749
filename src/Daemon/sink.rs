use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};

use super::Structs::Record_Structs::LogRecord;
use crate::error::{Error, Result};

/// Permission bits requested for a new log file (the umask still applies).
pub const LOG_FILE_MODE: u32 = 0o666;

type Target = Box<dyn Write + Send>;

/// The shared log file and the lock serializing every append to it.
///
/// Workers get an `Arc<LogSink>`; whoever holds [`SinkWriter`] is the only
/// thread inside the critical section.
pub struct LogSink {
    target: Mutex<Target>,
    path: Option<PathBuf>,
}

/// Exclusive access to the log target, held for format + write + slot release.
pub struct SinkWriter<'a> {
    target: MutexGuard<'a, Target>,
}

impl LogSink {
    /// Open `path` for appending, creating it if absent. Never truncates.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .mode(LOG_FILE_MODE)
            .open(path)
            .map_err(|source| Error::LogFileOpen {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "log file open");
        Ok(Self {
            target: Mutex::new(Box::new(file)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Write records to an arbitrary target instead of a file.
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            target: Mutex::new(Box::new(writer)),
            path: None,
        }
    }

    /// Take the write lock, blocking while another worker holds it.
    pub fn lock(&self) -> SinkWriter<'_> {
        SinkWriter {
            target: self.target.lock(),
        }
    }

    /// Stamp `message` and append it in one locked step.
    pub fn append(&self, message: &str) -> Result<LogRecord> {
        let mut writer = self.lock();
        let record = LogRecord::stamped_now(message);
        writer.write(&record)?;
        Ok(record)
    }

    /// Backing file, if the sink was opened from a path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.target.is_locked()
    }
}

impl SinkWriter<'_> {
    /// Append one record as a single buffer and flush it.
    pub fn write(&mut self, record: &LogRecord) -> Result<()> {
        let line = record.to_line();
        self.target
            .write_all(line.as_bytes())
            .and_then(|()| self.target.flush())
            .map_err(Error::Append)
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::Debug::StructDebug::debug_log_sink(self, f)
    }
}
