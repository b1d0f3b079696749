// src/Daemon/listener.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::Client::frame;

/// The daemon's reading end of the channel.
///
/// The listener is the only consumer of the channel. It hands out complete
/// lines in arrival order and never exposes a partial frame.
pub struct ChannelListener {
    reader: BufReader<File>,
    _keepalive: Option<File>,
    line: Vec<u8>,
}

impl ChannelListener {
    /// Create the FIFO at `path` if needed and open it for reading.
    pub fn open(path: &Path) -> Result<Self> {
        crate::Core::fifo::create_fifo(path)?;
        let (reader, keepalive) = crate::Core::fifo::open_reader(path)?;
        tracing::info!(path = %path.display(), "listening for log messages");
        Ok(Self::with_keepalive(reader, Some(keepalive)))
    }

    /// Listen on an already open descriptor, e.g. one end of an anonymous pipe.
    ///
    /// Without a keep-alive writer, the stream ends once every writer closes.
    pub fn from_file(file: File) -> Self {
        Self::with_keepalive(file, None)
    }

    fn with_keepalive(file: File, keepalive: Option<File>) -> Self {
        Self {
            reader: BufReader::with_capacity(crate::MAX_FRAME, file),
            _keepalive: keepalive,
            line: Vec::with_capacity(crate::MAX_FRAME),
        }
    }

    /// Receive the next message, blocking until a full line is available.
    ///
    /// At most `MAX_FRAME` bytes of a line are kept; the rest is skipped up
    /// to the terminator and the kept part is cut with the truncation marker.
    ///
    /// # Returns
    /// * `Ok(Some(text))` with the line terminator stripped
    /// * `Ok(None)` at end of stream; a trailing fragment without a
    ///   terminator is discarded
    /// * `Err(Error::ChannelRead)` if the read itself failed
    pub fn next_message(&mut self) -> Result<Option<String>> {
        self.line.clear();
        let mut seen = 0usize;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::ChannelRead(e)),
            };
            if available.is_empty() {
                if seen > 0 {
                    tracing::debug!(bytes = seen, "discarding unterminated fragment at end of stream");
                }
                return Ok(None);
            }

            let terminator = available.iter().position(|&b| b == b'\n');
            let chunk = &available[..terminator.unwrap_or(available.len())];
            let room = crate::MAX_FRAME - self.line.len();
            self.line.extend_from_slice(&chunk[..chunk.len().min(room)]);
            seen += chunk.len();

            let used = chunk.len() + usize::from(terminator.is_some());
            self.reader.consume(used);
            if terminator.is_some() {
                break;
            }
        }

        if seen > self.line.len() {
            tracing::debug!(bytes = seen, kept = self.line.len(), "over-long line cut");
        }
        let text = String::from_utf8_lossy(&self.line);
        Ok(Some(frame::truncate_line(&text).into_owned()))
    }

    /// Bytes reserved for assembling one line; stays at one frame.
    pub fn line_capacity(&self) -> usize {
        self.line.capacity()
    }

    /// Wait up to `timeout` for input.
    ///
    /// Returns `true` when `next_message` would not block: data is buffered,
    /// readable, or the channel hung up.
    pub fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        if !self.reader.buffer().is_empty() {
            return Ok(true);
        }
        crate::Core::fifo::poll_readable(self.reader.get_ref(), timeout).map_err(Error::ChannelRead)
    }
}

impl Iterator for ChannelListener {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_message().transpose()
    }
}
