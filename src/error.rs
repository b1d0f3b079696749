use std::io;
use std::path::PathBuf;

/// Errors raised by the daemon engine and the emitter.
///
/// Errors fall into three groups:
/// - startup errors: the daemon cannot acquire one of its resources and exits
/// - per-message errors: one message is lost, everything else keeps running
/// - client errors: an emitter cannot deliver a frame
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Startup errors
    // -------------------------------------------------------------------------
    /// The stop-signal handler could not be installed.
    #[error("failed to install stop handler: {0}")]
    SignalHandler(#[source] ctrlc::Error),

    /// The log file could not be opened for appending.
    #[error("failed to open log file {path}: {source}")]
    LogFileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `mkfifo` failed for a reason other than the pipe already existing.
    #[error("failed to create channel {path}: {source}")]
    ChannelCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Something other than a named pipe sits at the channel path.
    #[error("{path} exists but is not a named pipe")]
    NotAFifo { path: PathBuf },

    /// The channel exists but could not be opened.
    #[error("failed to open channel {path}: {source}")]
    ChannelOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Builder values that cannot produce a working daemon.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Per-message errors
    // -------------------------------------------------------------------------
    /// Reading from the channel failed.
    #[error("channel read failed: {0}")]
    ChannelRead(#[source] io::Error),

    /// No worker thread could be started for a claimed slot.
    #[error("failed to spawn worker for slot {slot}: {source}")]
    WorkerSpawn {
        slot: usize,
        #[source]
        source: io::Error,
    },

    /// A log record could not be appended.
    #[error("failed to append log record: {0}")]
    Append(#[source] io::Error),

    // -------------------------------------------------------------------------
    // Client errors
    // -------------------------------------------------------------------------
    /// The emitter never managed to open the channel.
    #[error("emitter is not connected to the channel")]
    NotConnected,

    /// The pipe buffer is full; the frame was not written.
    #[error("channel is full, frame not written")]
    ChannelFull,

    /// Writing a frame failed.
    #[error("failed to write frame: {0}")]
    Send(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
