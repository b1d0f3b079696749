pub mod alloc;
pub mod clock;
pub mod fifo;
pub mod futex;

pub use alloc::{SlotPool, SlotState};
pub use fifo::{create_fifo, open_reader, open_writer};
