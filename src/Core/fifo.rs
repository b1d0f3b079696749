// Named-pipe transport between emitters and the daemon.
// The daemon creates the FIFO and holds both ends; emitters open the write end
// non-blocking so a missing daemon never stalls them.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::os::fd::AsRawFd;
use std::path::Path;

use crate::error::{Error, Result};

/// Permission bits requested for the FIFO (the umask still applies).
pub const FIFO_MODE: libc::mode_t = 0o666;

/// Create the named pipe at `path` unless one already exists.
///
/// A regular file or directory in the way is an error rather than something
/// to remove.
pub fn create_fifo(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => return Ok(()),
        Ok(_) => {
            return Err(Error::NotAFifo {
                path: path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(Error::ChannelCreate {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| Error::ChannelCreate {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"),
    })?;

    if unsafe { libc::mkfifo(c_path.as_ptr(), FIFO_MODE) } != 0 {
        let source = io::Error::last_os_error();
        // Lost a creation race with another process: fine as long as it is a FIFO
        if source.raw_os_error() != Some(libc::EEXIST) {
            return Err(Error::ChannelCreate {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    tracing::debug!(path = %path.display(), "channel ready");
    Ok(())
}

/// Open the daemon's side of the channel.
///
/// Returns the blocking read end and a keep-alive write end. Holding the
/// write end means emitters can always connect while the daemon runs, and the
/// reader never sees end-of-stream between two clients.
pub fn open_reader(path: &Path) -> Result<(File, File)> {
    let open_err = |source: io::Error| Error::ChannelOpen {
        path: path.to_path_buf(),
        source,
    };

    // O_NONBLOCK so opening does not wait for a first writer
    let reader = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
        .map_err(open_err)?;

    let keepalive = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
        .map_err(open_err)?;

    set_blocking(&reader).map_err(open_err)?;
    Ok((reader, keepalive))
}

/// Open an emitter's write end without blocking.
///
/// Fails with `ENXIO` when no reader has the FIFO open and with `ENOENT` when
/// the FIFO does not exist.
pub fn open_writer(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

/// Wait up to `timeout` for `file` to become readable.
///
/// `Ok(false)` on timeout or when a signal interrupted the wait.
pub fn poll_readable(file: &File, timeout: std::time::Duration) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd: file.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;

    let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    // POLLHUP also counts: the next read reports end-of-stream
    Ok(rc > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP) != 0)
}

fn set_blocking(file: &File) -> io::Result<()> {
    let fd = file.as_raw_fd();
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
