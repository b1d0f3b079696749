use std::fmt;
use crate::Client::Emitter;
use crate::Core::SlotPool;
use crate::Daemon::LogSink;

/// Debug function for SlotPool
///
/// Provides a snapshot that shows:
/// - Capacity
/// - Slots currently in flight
/// - Occupied slot indices
pub fn debug_slot_pool(pool: &SlotPool, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SlotPool")
        .field("capacity", &pool.capacity())
        .field("in_flight", &pool.in_flight())
        .field("occupied", &pool.occupied_indices())
        .finish()
}

/// Debug function for LogSink
///
/// Never takes the lock; only reports whether someone holds it
pub fn debug_log_sink(sink: &LogSink, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LogSink")
        .field("path", &sink.path())
        .field("target", &"<opaque>")
        .field("locked", &sink.is_locked())
        .finish()
}

pub fn debug_emitter(emitter: &Emitter, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Emitter")
        .field("identity", &emitter.identity())
        .field("path", &emitter.path())
        .field("connected", &emitter.is_connected())
        .finish()
}
