// Records the daemon produces: one timestamped line per accepted message.

use std::fmt;

/// One line of the log file: `Mon DD HH:MM:SS.mmm name/pid text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(timestamp: String, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    /// Stamp `message` with the current local time.
    pub fn stamped_now(message: impl Into<String>) -> Self {
        Self::new(crate::Core::clock::timestamp(), message)
    }

    /// The exact bytes appended to the log file, terminator included.
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(self.timestamp.len() + 2 + self.message.len());
        line.push_str(&self.timestamp);
        line.push(' ');
        line.push_str(&self.message);
        line.push('\n');
        line
    }

    /// Split a line read back from the log file.
    ///
    /// The timestamp is the first 19 bytes (`Mon DD HH:MM:SS.mmm`); anything
    /// shorter or without the separating space is not a record.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let timestamp = line.get(..19)?;
        let message = line.get(19..)?.strip_prefix(' ')?;
        Some(Self::new(timestamp.to_string(), message))
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.timestamp, self.message)
    }
}

/// Counters kept by the dispatcher over the daemon's lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Messages that got a slot and a worker.
    pub accepted: u64,
    /// Messages dropped because no slot was free or no worker could start.
    pub dropped: u64,
    /// Records appended to the log file.
    pub written: u64,
    /// Records whose append failed.
    pub failed: u64,
}

impl fmt::Display for DispatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accepted={} dropped={} written={} failed={}",
            self.accepted, self.dropped, self.written, self.failed
        )
    }
}
