use super::*;
use std::sync::atomic::Ordering;

/// Read-only accessors on SlotPool, used by the dispatcher's reports and by
/// debugging and monitoring code.
impl SlotPool {
    /// Number of slots allocated at startup.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently bound to a worker.
    ///
    /// Loaded with acquire ordering; the value may be stale by the time the
    /// caller looks at it.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire) as usize
    }

    /// Number of slots a claim could currently take.
    pub fn free_slots(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state.load(Ordering::Acquire) == SlotState::Free as u8)
            .count()
    }

    /// Indices of the occupied slots, lowest first.
    pub fn occupied_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state.load(Ordering::Acquire) == SlotState::Occupied as u8)
            .map(|(index, _)| index)
            .collect()
    }
}
