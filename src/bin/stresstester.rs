// Floods the daemon from many threads sharing one emitter, then optionally
// checks the log file for corrupted or merged records.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use sha2::{Digest, Sha256};

use mysyslog::Client::Emitter;
use mysyslog::Daemon::Structs::LogRecord;
use mysyslog::{Error, DEFAULT_PIPE_PATH};

#[derive(Parser, Debug)]
#[command(name = "stresstester", version, about = "Send one message per thread to mysyslogd")]
struct Cli {
    /// Number of concurrent sender threads
    #[arg(long, default_value_t = 200)]
    threads: usize,

    /// Process name used in the sender identity
    #[arg(long, default_value = "stresstester")]
    name: String,

    /// Channel to write to
    #[arg(long, default_value = DEFAULT_PIPE_PATH)]
    pipe: PathBuf,

    /// Log file to inspect after sending
    #[arg(long)]
    verify: Option<PathBuf>,

    /// Time given to the daemon before the log is inspected
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    wait_ms: u64,
}

#[derive(Default, Debug)]
struct SendTally {
    sent: usize,
    not_connected: usize,
    full: usize,
    failed: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    // Distinct, self-checking payloads: "index:sha256(message_index)"
    let messages: Vec<String> = (0..cli.threads).map(payload).collect();

    let emitter = Arc::new(Emitter::open_at(&cli.pipe, &cli.name));
    if !emitter.is_connected() {
        tracing::warn!(pipe = %cli.pipe.display(), "channel not available, every send will fail");
    }

    let start = Instant::now();
    let handles: Vec<_> = messages
        .iter()
        .cloned()
        .map(|message| {
            let emitter = Arc::clone(&emitter);
            thread::spawn(move || emitter.send(&message))
        })
        .collect();

    let mut tally = SendTally::default();
    for handle in handles {
        match handle.join() {
            Ok(Ok(_)) => tally.sent += 1,
            Ok(Err(Error::NotConnected)) => tally.not_connected += 1,
            Ok(Err(Error::ChannelFull)) => tally.full += 1,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "send failed");
                tally.failed += 1;
            }
            Err(_) => tally.failed += 1,
        }
    }
    tracing::info!(elapsed = ?start.elapsed(), ?tally, "sending finished");

    let Some(log_path) = cli.verify else {
        return ExitCode::SUCCESS;
    };

    thread::sleep(Duration::from_millis(cli.wait_ms));
    match verify(&log_path, emitter.identity(), &messages) {
        Ok(corrupted) if corrupted == 0 => ExitCode::SUCCESS,
        Ok(corrupted) => {
            tracing::error!(corrupted, "log contains damaged records");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, path = %log_path.display(), "cannot read log");
            ExitCode::FAILURE
        }
    }
}

fn payload(index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("message_{index}").as_bytes());
    format!("{index}:{:x}", hasher.finalize())
}

/// Count records from `identity` that are not one of `messages`.
fn verify(log_path: &Path, identity: &str, messages: &[String]) -> std::io::Result<usize> {
    let contents = std::fs::read_to_string(log_path)?;
    let expected: HashSet<&str> = messages.iter().map(String::as_str).collect();
    let prefix = format!("{identity} ");

    let mut found = HashSet::new();
    let mut corrupted = 0;
    for line in contents.lines() {
        let Some(record) = LogRecord::parse(line) else {
            corrupted += 1;
            continue;
        };
        let Some(text) = record.message.strip_prefix(&prefix) else {
            continue; // another sender
        };
        if expected.contains(text) && found.insert(text.to_string()) {
            continue;
        }
        corrupted += 1;
    }

    tracing::info!(
        found = found.len(),
        missing = messages.len() - found.len(),
        corrupted,
        "log verified"
    );
    Ok(corrupted)
}
