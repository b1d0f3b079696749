use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::time::{Duration, Instant};
mod debug;
mod getters;

// Use parking_lot's Mutex for better performance
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Occupancy of one slot.
///
/// Kept separate from the buffer so an empty message is still an occupied slot.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    Free = 0,
    Occupied = 1,
}

impl SlotState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => SlotState::Free,
            _ => SlotState::Occupied,
        }
    }
}

/// A single reusable message buffer.
pub struct Slot {
    /// `SlotState` as a byte. A claimer flips it `Free -> Occupied` with a
    /// compare-exchange; only the worker owning the slot stores `Free` again.
    state: AtomicU8,

    /// Message text copied in by the dispatcher. Cleared on release.
    payload: Mutex<String>,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SlotState::Free as u8),
            payload: Mutex::new(String::with_capacity(crate::MAX_FRAME)),
        }
    }
}

/// Fixed-capacity arena of message slots, allocated once and recycled.
///
/// ### Concurrency Design:
/// - **Claim**: the dispatcher scans from index 0 and takes the first slot whose
///   state it can move `Free -> Occupied`. Low indices are always preferred.
/// - **Release**: the worker bound to a slot clears the buffer, then publishes
///   `Free` with release ordering, so a later claimer never sees stale text.
/// - **Completion**: `in_flight` counts occupied slots; `wait_idle` parks on it.
pub struct SlotPool {
    slots: Box<[CachePadded<Slot>]>,
    in_flight: AtomicU32,
}

impl SlotPool {
    /// Allocate `capacity` free slots.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > u32::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "slot pool capacity must be between 1 and {}, got {capacity}",
                u32::MAX
            )));
        }

        let slots = (0..capacity)
            .map(|_| CachePadded::new(Slot::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            slots,
            in_flight: AtomicU32::new(0),
        })
    }

    /// Claim the lowest-index free slot and copy `message` into it.
    ///
    /// Returns the slot index, or `None` when every slot is occupied.
    pub fn claim(&self, message: &str) -> Option<usize> {
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.state.load(Ordering::Relaxed) != SlotState::Free as u8 {
                continue;
            }

            if slot
                .state
                .compare_exchange(
                    SlotState::Free as u8,
                    SlotState::Occupied as u8,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                // We own this slot now
                self.in_flight.fetch_add(1, Ordering::AcqRel);
                let mut payload = slot.payload.lock();
                payload.clear();
                payload.push_str(message);
                return Some(index);
            }
        }
        None
    }

    /// Run `f` over the text held by an occupied slot.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn with_payload<R>(&self, index: usize, f: impl FnOnce(&str) -> R) -> R {
        let payload = self.slots[index].payload.lock();
        f(payload.as_str())
    }

    /// Clear slot `index` and hand it back to the pool.
    ///
    /// Returns `false` if the slot was already free, which means two owners
    /// released it and is logged as a bug.
    pub fn release(&self, index: usize) -> bool {
        let slot = &self.slots[index];
        slot.payload.lock().clear();

        let previous = slot.state.swap(SlotState::Free as u8, Ordering::AcqRel);
        if previous == SlotState::Free as u8 {
            tracing::error!(slot = index, "released a slot that was already free");
            return false;
        }

        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            crate::Core::futex::wake_all(&self.in_flight);
        }
        true
    }

    /// Current state of slot `index`, or `None` if out of range.
    pub fn state(&self, index: usize) -> Option<SlotState> {
        self.slots
            .get(index)
            .map(|slot| SlotState::from_raw(slot.state.load(Ordering::Acquire)))
    }

    /// Block until no slot is occupied or `timeout` elapses.
    ///
    /// Returns `true` when the pool drained.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let observed = self.in_flight.load(Ordering::Acquire);
            if observed == 0 {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            crate::Core::futex::wait_on_count(&self.in_flight, observed, deadline - now);
        }
    }
}
