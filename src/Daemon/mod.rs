mod builder;
mod daemon;
mod dispatcher;
mod listener;
mod sink;
mod worker;

pub use builder::DaemonBuilder;
pub use daemon::Daemon;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use listener::ChannelListener;
pub use sink::{LogSink, SinkWriter};

pub mod Structs {
    pub mod Record_Structs;
    pub use Record_Structs::{DispatchStats, LogRecord}; // re-export for stable path
}
