use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::Structs::Record_Structs::DispatchStats;
use super::{ChannelListener, Dispatcher};
use crate::error::Result;

/// The listener loop: one thread reading the channel and dispatching.
pub struct Daemon {
    listener: ChannelListener,
    dispatcher: Dispatcher,
    keep_running: Arc<AtomicBool>,
    poll_interval: Option<Duration>,
    drain_timeout: Duration,
}

impl Daemon {
    pub fn new(listener: ChannelListener, dispatcher: Dispatcher) -> Self {
        Self {
            listener,
            dispatcher,
            keep_running: Arc::new(AtomicBool::new(true)),
            poll_interval: None,
            drain_timeout: Duration::from_secs(5),
        }
    }

    /// Wake up at least every `interval` to look at the stop flag.
    ///
    /// Without it a stop request only takes effect once the next line arrives
    /// or the channel closes.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Flag checked once per loop iteration; store `false` to stop.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.keep_running)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Read and dispatch until stopped or the channel closes.
    ///
    /// Waits up to the drain timeout for in-flight workers before returning
    /// the final counters. A channel read error also ends the loop, and is
    /// returned only after the drain.
    pub fn run(&mut self) -> Result<DispatchStats> {
        tracing::info!(
            capacity = self.dispatcher.pool().capacity(),
            poll_interval = ?self.poll_interval,
            "daemon running"
        );

        let mut failure = None;
        while self.keep_running.load(Ordering::Acquire) {
            if let Some(interval) = self.poll_interval {
                match self.listener.wait_readable(interval) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            match self.listener.next_message() {
                Ok(Some(message)) => {
                    self.dispatcher.dispatch(&message);
                }
                Ok(None) => {
                    tracing::info!("channel closed");
                    break;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if !self.dispatcher.wait_idle(self.drain_timeout) {
            tracing::warn!(
                in_flight = self.dispatcher.pool().in_flight(),
                "workers still running after drain timeout"
            );
        }

        let stats = self.dispatcher.stats();
        match failure {
            Some(e) => {
                tracing::error!(error = %e, %stats, "daemon stopped on channel error");
                Err(e)
            }
            None => {
                tracing::info!(%stats, "daemon stopped");
                Ok(stats)
            }
        }
    }
}
