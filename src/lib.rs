//! mysyslog: a local logging daemon fed through a named pipe.
//!
//! Client processes write `name/pid message` lines into a FIFO through
//! [`Client::Emitter`]. The daemon reads them with a
//! [`Daemon::ChannelListener`], parks each one in a slot of the
//! [`Core::SlotPool`] and hands it to a detached worker that timestamps it and
//! appends it to the shared log file through the [`Daemon::LogSink`].

// Module naming follows project convention (Core = transport and slot arena,
// Daemon = ingestion engine, Client = emitter side of the pipe)
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
pub mod Daemon;
#[allow(non_snake_case)]
pub mod Client;
#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}

pub mod error;
pub mod ffi;

pub use error::{Error, Result};

/// Largest frame an emitter writes, identity prefix and terminator included.
///
/// Matches `PIPE_BUF` on Linux so that one `write(2)` of a frame is never
/// interleaved with another writer's frame.
pub const MAX_FRAME: usize = 4096;

/// Default number of slots, i.e. messages that may be in flight at once.
pub const MAX_IN_FLIGHT: usize = 100;

/// Marker placed at the end of a frame that had to be cut to [`MAX_FRAME`].
pub const TRUNCATION_MARKER: &str = "...";

/// Well-known channel name, relative to the working directory.
pub const DEFAULT_PIPE_PATH: &str = "mysyslog.pipe";

/// Well-known log file name, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "mysyslog.log";
