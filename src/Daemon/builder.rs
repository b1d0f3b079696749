use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{ChannelListener, Daemon, Dispatcher, LogSink};
use crate::error::{Error, Result};
use crate::Client::Emitter;

pub struct DaemonBuilder {
    pipe_path: PathBuf,
    log_path: PathBuf,
    capacity: usize,
    poll_interval: Option<Duration>,
    drain_timeout: Duration,
}

impl Default for DaemonBuilder {
    fn default() -> Self {
        Self {
            pipe_path: PathBuf::from(crate::DEFAULT_PIPE_PATH),
            log_path: PathBuf::from(crate::DEFAULT_LOG_PATH),
            capacity: crate::MAX_IN_FLIGHT,
            poll_interval: None,             // block on the channel like a plain reader
            drain_timeout: Duration::from_secs(5),
        }
    }
}

impl DaemonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pipe_path = path.into();
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Number of slots, i.e. the most messages in flight at once.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Check the stop flag at least this often instead of only between lines.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Upper bound on waiting for in-flight workers at shutdown.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Acquire the log file and the channel, in that order.
    ///
    /// Any failure here is a startup error; nothing is left half-running.
    pub fn build(self) -> Result<Daemon> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1".into()));
        }
        if self.poll_interval == Some(Duration::ZERO) {
            return Err(Error::InvalidConfig("poll interval must be non-zero".into()));
        }

        let sink = Arc::new(LogSink::open(&self.log_path)?);
        let dispatcher = Dispatcher::with_capacity(self.capacity, sink)?;
        let listener = ChannelListener::open(&self.pipe_path)?;

        let mut daemon = Daemon::new(listener, dispatcher).with_drain_timeout(self.drain_timeout);
        if let Some(interval) = self.poll_interval {
            daemon = daemon.with_poll_interval(interval);
        }
        Ok(daemon)
    }

    /// An emitter aimed at this builder's channel.
    pub fn build_emitter(&self, name: &str) -> Emitter {
        Emitter::open_at(&self.pipe_path, name)
    }
}
