mod emitter;
pub mod frame;

pub use emitter::Emitter;
