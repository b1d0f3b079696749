// Per-message worker: runs on its own detached thread, owns exactly one slot.

use std::sync::atomic::{AtomicU64, Ordering};

use super::sink::LogSink;
use super::Structs::Record_Structs::{DispatchStats, LogRecord};
use crate::error::Result;
use crate::Core::SlotPool;

/// Lifetime counters shared by the dispatcher and its workers.
#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) accepted: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) written: AtomicU64,
    pub(crate) failed: AtomicU64,
}

impl Counters {
    pub(crate) fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            accepted: self.accepted.load(Ordering::Acquire),
            dropped: self.dropped.load(Ordering::Acquire),
            written: self.written.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }
}

/// Timestamp and append the message held in `slot`, then free the slot.
///
/// Everything from taking the timestamp to releasing the slot happens under
/// the sink lock, so records land in lock-acquisition order and the slot is
/// free before the next worker gets in. The slot is released even when the
/// write fails.
pub(crate) fn process_slot(
    pool: &SlotPool,
    sink: &LogSink,
    counters: &Counters,
    slot: usize,
) -> Result<LogRecord> {
    tracing::debug!(slot, "waiting for write lock");
    let mut writer = sink.lock();
    tracing::debug!(slot, "got write lock");

    let record = pool.with_payload(slot, |text| LogRecord::stamped_now(text));
    let result = writer.write(&record);

    // Counted before release so a drained pool implies settled counters
    match &result {
        Ok(()) => counters.written.fetch_add(1, Ordering::AcqRel),
        Err(_) => counters.failed.fetch_add(1, Ordering::AcqRel),
    };
    pool.release(slot);

    tracing::debug!(slot, "slot free, releasing write lock");
    drop(writer);

    result.map(|()| record)
}
