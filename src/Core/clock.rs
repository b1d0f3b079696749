use chrono::{DateTime, Local};

/// `strftime` pattern of a record timestamp, e.g. `Dec 24 12:00:01.250`.
pub const TIMESTAMP_FORMAT: &str = "%b %d %H:%M:%S%.3f";

/// Local wall-clock time with millisecond precision.
pub fn timestamp() -> String {
    format_timestamp(&Local::now())
}

pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
