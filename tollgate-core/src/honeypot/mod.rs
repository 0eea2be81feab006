//! Honeypot check
//!
//! Counts, per remote host, the requests that hit a decoy path and got a 404
//! within a look-back window, then turns the counts into plugin output.
//!
//! HoneypotSettings
//! load_config_with_env
//! locate_log_sources
//! LogRecords + TimeWindow
//! count_hits
//! decide
//!

mod aggregate;
mod check;
mod decision;
mod error;

#[cfg(test)]
mod tests;

pub use aggregate::{HONEYPOT_STATUS, HoneypotMatcher, HostCounts, count_hits};
pub use check::{HoneypotSettings, evaluate, run_at};
pub use decision::{decide, host_line, host_status};
pub use error::HoneypotError;
