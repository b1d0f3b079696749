//! Shared helpers for the mysyslog integration tests.
#![allow(dead_code)]

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::FromRawFd;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// In-memory log target that can be read back while workers write to it.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.bytes.lock().clone()).expect("log target holds UTF-8")
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Log target whose writes block until the gate is opened.
///
/// Holding the gate closed keeps one worker inside the critical section and
/// every other worker queued on the lock, so their slots stay occupied.
#[derive(Clone)]
pub struct GatedWriter {
    gate: Arc<(Mutex<bool>, Condvar)>,
    pub buffer: SharedBuffer,
}

impl GatedWriter {
    pub fn closed() -> Self {
        Self {
            gate: Arc::new((Mutex::new(false), Condvar::new())),
            buffer: SharedBuffer::default(),
        }
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.gate;
        *lock.lock() = true;
        cvar.notify_all();
    }
}

impl Write for GatedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let (lock, cvar) = &*self.gate;
        let mut open = lock.lock();
        while !*open {
            cvar.wait(&mut open);
        }
        drop(open);
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Log target that rejects every write.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Anonymous pipe as (read end, write end).
pub fn pipe() -> (File, File) {
    let mut fds = [0; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(rc, 0, "pipe(2) failed: {}", io::Error::last_os_error());
    unsafe { (File::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) }
}

/// Poll `path` until it holds at least `count` lines or `timeout` passes.
pub fn wait_for_lines(path: &Path, count: usize, timeout: Duration) -> Vec<String> {
    let start = Instant::now();
    loop {
        let lines: Vec<String> = std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect();
        if lines.len() >= count || start.elapsed() >= timeout {
            return lines;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// True if `stamp` looks like `Mon DD HH:MM:SS.mmm`.
pub fn is_timestamp(stamp: &str) -> bool {
    let b = stamp.as_bytes();
    b.len() == 19
        && b[..3].iter().all(u8::is_ascii_alphabetic)
        && b[3] == b' '
        && b[4..6].iter().all(u8::is_ascii_digit)
        && b[6] == b' '
        && b[9] == b':'
        && b[12] == b':'
        && b[15] == b'.'
        && [7, 8, 10, 11, 13, 14, 16, 17, 18]
            .iter()
            .all(|&i| b[i].is_ascii_digit())
}
