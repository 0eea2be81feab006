//! Access log pipeline
//!
//! The resolved Apache configuration names the log files and their line
//! formats. From there records flow through:
//!
//! locate_log_sources
//! LogSource
//! LogRecords (lazy, one file open at a time)
//! TimeWindow::filter
//! consumers (honeypot matcher)
//!

mod error;
mod format;
mod locate;
mod stream;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use error::LogError;
pub use format::{COMBINED, COMMON, LogFormat, VHOST_COMBINED, builtin_format};
pub use locate::{LogSource, locate_log_sources};
pub use stream::LogRecords;
pub use types::LogRecord;
pub use window::{PeriodError, PeriodSpec, PeriodUnit, TimeWindow};
