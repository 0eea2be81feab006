use crate::honeypot::aggregate::HostCounts;
use crate::plugin::{PluginOutput, Status};

/// Any hit at all is a warning; counts alone never escalate further.
pub fn host_status(count: u64) -> Status {
    if count >= 1 {
        Status::Warning
    } else {
        Status::Ok
    }
}

pub fn host_line(host: &str, count: u64) -> String {
    format!("|{host}={count}")
}

/// Overall status is the worst host status; one line per host, sorted.
pub fn decide(counts: &HostCounts) -> PluginOutput {
    let status = counts
        .iter()
        .map(|(_, &count)| host_status(count))
        .max()
        .unwrap_or(Status::Ok);

    let lines = counts
        .iter()
        .map(|(host, &count)| host_line(host, count))
        .collect();

    PluginOutput::new(status, lines)
}
