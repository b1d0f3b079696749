use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::sink::LogSink;
use super::worker::{self, Counters};
use super::Structs::Record_Structs::DispatchStats;
use crate::error::{Error, Result};
use crate::Core::SlotPool;

/// What happened to one message handed to [`Dispatcher::dispatch`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message sits in `slot` and a worker is on its way.
    Accepted { slot: usize },
    /// No slot (or no worker thread) was available; the message is gone.
    Dropped,
}

impl DispatchOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DispatchOutcome::Accepted { .. })
    }
}

/// Hands each message to its own detached worker, bounded by the slot pool.
///
/// Overload policy is drop-on-full: when every slot is occupied the new
/// message is discarded and reported, never queued.
pub struct Dispatcher {
    pool: Arc<SlotPool>,
    sink: Arc<LogSink>,
    counters: Arc<Counters>,
}

impl Dispatcher {
    pub fn new(pool: Arc<SlotPool>, sink: Arc<LogSink>) -> Self {
        Self {
            pool,
            sink,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Dispatcher over a fresh pool of `capacity` slots.
    pub fn with_capacity(capacity: usize, sink: Arc<LogSink>) -> Result<Self> {
        Ok(Self::new(Arc::new(SlotPool::new(capacity)?), sink))
    }

    /// Park `message` in the lowest free slot and start a worker for it.
    ///
    /// Returns as soon as the worker thread exists; its completion is only
    /// visible through the slot becoming free again.
    pub fn dispatch(&self, message: &str) -> DispatchOutcome {
        let Some(slot) = self.pool.claim(message) else {
            self.counters.dropped.fetch_add(1, Ordering::AcqRel);
            tracing::info!(
                capacity = self.pool.capacity(),
                dropped = message,
                "no free slot, message dropped"
            );
            return DispatchOutcome::Dropped;
        };
        tracing::debug!(slot, "message copied to slot");

        let pool = Arc::clone(&self.pool);
        let sink = Arc::clone(&self.sink);
        let counters = Arc::clone(&self.counters);

        let spawned = thread::Builder::new()
            .name(format!("mysyslog-slot-{slot}"))
            .spawn(move || {
                match worker::process_slot(&pool, &sink, &counters, slot) {
                    Ok(record) => tracing::debug!(slot, %record, "record written"),
                    Err(e) => tracing::warn!(slot, error = %e, "record lost"),
                }
            });

        match spawned {
            // The JoinHandle is dropped: the worker runs detached
            Ok(_) => {
                self.counters.accepted.fetch_add(1, Ordering::AcqRel);
                tracing::debug!(slot, "worker started");
                DispatchOutcome::Accepted { slot }
            }
            Err(source) => {
                self.pool.release(slot);
                self.counters.dropped.fetch_add(1, Ordering::AcqRel);
                let err = Error::WorkerSpawn { slot, source };
                tracing::warn!(error = %err, "message dropped");
                DispatchOutcome::Dropped
            }
        }
    }

    /// Wait for every in-flight worker to finish, for at most `timeout`.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.pool.wait_idle(timeout)
    }

    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }

    pub fn pool(&self) -> &Arc<SlotPool> {
        &self.pool
    }

    pub fn sink(&self) -> &Arc<LogSink> {
        &self.sink
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pool", &self.pool)
            .field("sink", &self.sink)
            .field("stats", &self.stats())
            .finish()
    }
}
