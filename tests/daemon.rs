mod common;

use common::{is_timestamp, pipe, wait_for_lines, GatedWriter, SharedBuffer};
use mysyslog::Client::Emitter;
use mysyslog::Daemon::Structs::LogRecord;
use mysyslog::Daemon::{ChannelListener, Daemon, DaemonBuilder, Dispatcher, LogSink};
use mysyslog::Error;
use serial_test::serial;
use std::io::Write;
use std::os::unix::fs::FileTypeExt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const POLL: Duration = Duration::from_millis(20);

fn wait_finished<T>(handle: &thread::JoinHandle<T>, timeout: Duration) -> bool {
    let start = Instant::now();
    while !handle.is_finished() {
        if start.elapsed() >= timeout {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
    true
}

fn pipe_daemon() -> (Daemon, std::fs::File, SharedBuffer) {
    let (read_end, write_end) = pipe();
    let buffer = SharedBuffer::default();
    let dispatcher = Dispatcher::with_capacity(10, Arc::new(LogSink::from_writer(buffer.clone()))).unwrap();
    (Daemon::new(ChannelListener::from_file(read_end), dispatcher), write_end, buffer)
}

#[test]
#[serial]
fn hello_from_app_42_lands_in_the_log_file() -> mysyslog::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let builder = DaemonBuilder::new()
        .with_pipe_path(dir.path().join("mysyslog.pipe"))
        .with_log_path(dir.path().join("mysyslog.log"))
        .with_poll_interval(POLL);
    let mut daemon = builder.build()?;
    let stop = daemon.stop_handle();
    let runner = thread::spawn(move || daemon.run());

    let emitter = Emitter::with_identity(dir.path().join("mysyslog.pipe"), "app", 42);
    emitter.send("hello")?;

    let lines = wait_for_lines(&dir.path().join("mysyslog.log"), 1, Duration::from_secs(10));
    assert_eq!(lines.len(), 1);
    let record = LogRecord::parse(&lines[0]).unwrap();
    assert!(is_timestamp(&record.timestamp), "bad stamp in {:?}", lines[0]);
    assert_eq!(record.message, "app/42 hello");

    stop.store(false, Ordering::Release);
    let stats = runner.join().unwrap()?;
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.written, 1);
    Ok(())
}

#[test]
#[serial]
fn stop_waits_for_the_next_line_without_polling() {
    let (mut daemon, mut writer, buffer) = pipe_daemon();
    let stop = daemon.stop_handle();
    let runner = thread::spawn(move || daemon.run());

    stop.store(false, Ordering::Release);
    // Blocked in read: the flag alone does not end the loop
    assert!(!wait_finished(&runner, Duration::from_millis(200)));

    writer.write_all(b"late/1 last words\n").unwrap();
    assert!(wait_finished(&runner, Duration::from_secs(10)));

    let stats = runner.join().unwrap().unwrap();
    assert_eq!(stats.accepted, 1);
    assert_eq!(buffer.lines().len(), 1);
}

#[test]
#[serial]
fn closing_the_channel_ends_the_loop() {
    let (mut daemon, mut writer, buffer) = pipe_daemon();
    let runner = thread::spawn(move || daemon.run());

    writer.write_all(b"a/1 one\na/1 two\na/1 unterminated").unwrap();
    drop(writer);

    let stats = runner.join().unwrap().unwrap();
    assert_eq!(stats.accepted, 2);
    // run() drains the workers before returning
    assert_eq!(stats.written, 2);

    let mut messages: Vec<String> = buffer
        .lines()
        .iter()
        .map(|l| LogRecord::parse(l).unwrap().message)
        .collect();
    messages.sort();
    assert_eq!(messages, ["a/1 one", "a/1 two"]);
}

#[test]
#[serial]
fn read_error_still_drains_in_flight_workers() {
    let dir = tempfile::tempdir().unwrap();
    // Reading a write-only descriptor fails with EBADF
    let unreadable = std::fs::File::create(dir.path().join("write-only")).unwrap();
    let gated = GatedWriter::closed();
    let dispatcher = Dispatcher::with_capacity(10, Arc::new(LogSink::from_writer(gated.clone()))).unwrap();
    for i in 0..3 {
        assert!(dispatcher.dispatch(&format!("busy/9 pending {i}")).is_accepted());
    }

    let mut daemon = Daemon::new(ChannelListener::from_file(unreadable), dispatcher);
    let pool = Arc::clone(daemon.dispatcher().pool());
    let runner = thread::spawn(move || daemon.run());

    // The loop has failed already; run() is parked in the drain
    assert!(!wait_finished(&runner, Duration::from_millis(200)));
    assert_eq!(pool.in_flight(), 3);

    gated.open();
    let err = runner.join().unwrap().err().unwrap();
    assert!(matches!(err, Error::ChannelRead(_)), "got {err}");
    assert_eq!(pool.in_flight(), 0);
    assert_eq!(gated.buffer.lines().len(), 3);
}

#[test]
#[serial]
fn poll_interval_bounds_shutdown_latency() -> mysyslog::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = DaemonBuilder::new()
        .with_pipe_path(dir.path().join("p.pipe"))
        .with_log_path(dir.path().join("p.log"))
        .with_poll_interval(POLL)
        .build()?;
    let stop = daemon.stop_handle();
    let runner = thread::spawn(move || daemon.run());

    thread::sleep(Duration::from_millis(50));
    stop.store(false, Ordering::Release);
    assert!(wait_finished(&runner, Duration::from_secs(5)));
    let stats = runner.join().unwrap()?;
    assert_eq!(stats.accepted, 0);
    Ok(())
}

#[test]
#[serial]
fn default_paths_live_in_the_working_directory() -> mysyslog::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let built = DaemonBuilder::new().with_poll_interval(POLL).build();
    let pipe_meta = std::fs::metadata(dir.path().join(mysyslog::DEFAULT_PIPE_PATH));
    let log_exists = dir.path().join(mysyslog::DEFAULT_LOG_PATH).exists();
    std::env::set_current_dir(previous).unwrap();

    let daemon = built?;
    assert!(pipe_meta.unwrap().file_type().is_fifo());
    assert!(log_exists);
    assert_eq!(daemon.dispatcher().pool().capacity(), mysyslog::MAX_IN_FLIGHT);
    Ok(())
}

#[test]
fn startup_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();

    let regular = dir.path().join("not-a.pipe");
    std::fs::write(&regular, b"").unwrap();
    let err = DaemonBuilder::new()
        .with_pipe_path(&regular)
        .with_log_path(dir.path().join("ok.log"))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, Error::NotAFifo { .. }), "got {err}");

    let err = DaemonBuilder::new()
        .with_pipe_path(dir.path().join("x.pipe"))
        .with_log_path(dir.path().join("missing-dir").join("x.log"))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, Error::LogFileOpen { .. }), "got {err}");

    let err = DaemonBuilder::new().with_capacity(0).build().err().unwrap();
    assert!(matches!(err, Error::InvalidConfig(_)), "got {err}");
}
