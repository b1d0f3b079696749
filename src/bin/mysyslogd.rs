use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mysyslog::Daemon::{DaemonBuilder, Structs::DispatchStats};
use mysyslog::{Error, DEFAULT_LOG_PATH, DEFAULT_PIPE_PATH, MAX_IN_FLIGHT};

const LIBRARY_USAGE: &str = "\
Clients write through the mysyslog library rather than the pipe directly:

    let emitter = mysyslog::Client::Emitter::open(\"myapp\");
    emitter.send(\"Hello mysyslog!\")?;
    emitter.close();

From C, link the cdylib and use mysyslog_open / mysyslog_putlog / mysyslog_close.
Records look like: Dec 24 12:00:01.250 myapp/4242 Hello mysyslog!";

/// Listens on a named pipe for log messages, one per line, and appends them
/// with a millisecond timestamp to the log file.
#[derive(Parser, Debug)]
#[command(name = "mysyslogd", version, after_help = LIBRARY_USAGE)]
struct Cli {
    /// Do not daemonize; print diagnostics to stdout
    #[arg(short = 'n', long)]
    foreground: bool,

    /// Channel (named pipe) to listen on
    #[arg(long, default_value = DEFAULT_PIPE_PATH)]
    pipe: PathBuf,

    /// Log file to append records to
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// Messages allowed in flight before new ones are dropped
    #[arg(long, default_value_t = MAX_IN_FLIGHT)]
    capacity: usize,

    /// Check for a stop request this often instead of waiting for the next line
    #[arg(long, value_name = "MS")]
    poll_ms: Option<u64>,

    /// How long to wait for in-flight messages at shutdown
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    drain_ms: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.foreground {
        if let Err(e) = daemonize() {
            eprintln!("mysyslogd: fork failed: {e}");
            return ExitCode::FAILURE;
        }
    }
    init_logging(cli.foreground);

    match run(cli) {
        Ok(stats) => {
            tracing::info!(%stats, "bye bye");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "mysyslogd failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> mysyslog::Result<DispatchStats> {
    let mut builder = DaemonBuilder::new()
        .with_pipe_path(cli.pipe)
        .with_log_path(cli.log)
        .with_capacity(cli.capacity)
        .with_drain_timeout(Duration::from_millis(cli.drain_ms));
    if let Some(ms) = cli.poll_ms {
        builder = builder.with_poll_interval(Duration::from_millis(ms));
    }

    let mut daemon = builder.build()?;

    let keep_running = daemon.stop_handle();
    ctrlc::set_handler(move || {
        keep_running.store(false, Ordering::Release);
    })
    .map_err(Error::SignalHandler)?;

    daemon.run()
}

/// Fork into the background; the parent exits at once.
///
/// Must run before any thread is spawned.
fn daemonize() -> io::Result<()> {
    match unsafe { libc::fork() } {
        -1 => Err(io::Error::last_os_error()),
        0 => {
            unsafe { libc::setsid() };
            println!("mysyslogd: started as a daemon, pid={}", std::process::id());
            Ok(())
        }
        _ => std::process::exit(0),
    }
}

/// Diagnostics filter, or `None` when nothing would ever read the output.
fn log_filter(foreground: bool) -> Option<EnvFilter> {
    foreground.then(|| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
}

fn init_logging(foreground: bool) {
    // In the background no subscriber is installed, so every event is
    // disabled at its callsite
    if let Some(filter) = log_filter(foreground) {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
