use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::frame;
use crate::error::{Error, Result};

/// Client-side handle for sending messages to the daemon.
///
/// The emitter owns the sender identity (`name/pid`) and a non-blocking write
/// end of the channel. Each [`send`](Emitter::send) is one `write(2)` of one
/// frame, which the kernel keeps whole for frames up to `PIPE_BUF`, so a
/// single emitter can be shared by many threads.
pub struct Emitter {
    name: String,
    pid: u32,
    identity: String,
    path: PathBuf,
    channel: Option<File>,
}

impl Emitter {
    /// Open an emitter on the well-known channel for the current process.
    pub fn open(name: &str) -> Self {
        Self::open_at(crate::DEFAULT_PIPE_PATH, name)
    }

    /// Open an emitter on the channel at `path` for the current process.
    pub fn open_at(path: impl AsRef<Path>, name: &str) -> Self {
        Self::with_identity(path, name, std::process::id())
    }

    /// Open an emitter with an explicit identity.
    ///
    /// Never fails: when the channel is missing or nobody is reading it, the
    /// emitter stays disconnected and every `send` returns
    /// [`Error::NotConnected`].
    pub fn with_identity(path: impl AsRef<Path>, name: &str, pid: u32) -> Self {
        let path = path.as_ref().to_path_buf();
        let channel = match crate::Core::fifo::open_writer(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "emitter left disconnected");
                None
            }
        };

        Self {
            name: name.to_string(),
            pid,
            identity: frame::identity(name, pid),
            path,
            channel,
        }
    }

    /// Send one message.
    ///
    /// # Returns
    /// * `Ok(n)` with the number of bytes written (the whole frame)
    /// * `Err(Error::NotConnected)` if the channel was never opened
    /// * `Err(Error::ChannelFull)` if the pipe buffer had no room
    /// * `Err(Error::Send(_))` for any other write failure
    pub fn send(&self, text: &str) -> Result<usize> {
        let mut channel: &File = self.channel.as_ref().ok_or(Error::NotConnected)?;
        let frame = frame::encode(&self.identity, text);

        // One write call: a retry loop could split the frame
        match channel.write(frame.as_bytes()) {
            Ok(n) if n == frame.len() => Ok(n),
            Ok(n) => Err(Error::Send(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {n} of {} bytes", frame.len()),
            ))),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(Error::ChannelFull),
            Err(e) => Err(Error::Send(e)),
        }
    }

    /// Release the channel connection.
    pub fn close(self) {
        drop(self);
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// The `name/pid` prefix carried by every frame.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::Debug::StructDebug::debug_emitter(self, f)
    }
}
