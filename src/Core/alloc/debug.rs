use super::*;
use std::fmt;

// Debug proxy implementation that calls the standalone debug function
impl fmt::Debug for SlotPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_slot_pool(self, f)
    }
}
