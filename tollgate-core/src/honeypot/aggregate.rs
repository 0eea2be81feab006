use crate::logs::{LogError, LogRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use tracing::{Level, debug, enabled};

/// Response status a honeypot hit must carry.
pub const HONEYPOT_STATUS: u16 = 404;

/// Selects requests for the decoy path that were answered with a 404.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoneypotMatcher {
    path: String,
}

impl HoneypotMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        record.status == Some(HONEYPOT_STATUS)
            && record.request_url_path.as_deref() == Some(self.path.as_str())
    }
}

/// Hits per remote host, keyed by the host exactly as logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HostCounts {
    hosts: BTreeMap<String, u64>,
}

impl HostCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, host: &str) {
        // get_mut first so repeat hosts do not allocate a key
        match self.hosts.get_mut(host) {
            Some(count) => *count += 1,
            None => {
                self.hosts.insert(host.to_string(), 1);
            }
        }
    }

    pub fn get(&self, host: &str) -> u64 {
        self.hosts.get(host).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.hosts.values().sum()
    }

    /// Hosts in lexicographic order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, u64> {
        self.hosts.iter()
    }
}

impl<'a> IntoIterator for &'a HostCounts {
    type Item = (&'a String, &'a u64);
    type IntoIter = btree_map::Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for HostCounts {
    fn from_iter<I: IntoIterator<Item = S>>(hosts: I) -> Self {
        let mut counts = Self::new();
        for host in hosts {
            counts.record(host.as_ref());
        }
        counts
    }
}

/// Counts honeypot hits per host. The first stream error aborts the count.
pub fn count_hits<I>(matcher: &HoneypotMatcher, records: I) -> Result<HostCounts, LogError>
where
    I: IntoIterator<Item = Result<LogRecord, LogError>>,
{
    let mut counts = HostCounts::new();
    for record in records {
        let record = record?;
        if matcher.matches(&record) {
            if enabled!(Level::DEBUG) {
                if let Ok(json) = serde_json::to_string(&record) {
                    debug!(honeypot = matcher.path(), record = %json, "honeypot hit");
                }
            }
            counts.record(&record.remote_host);
        }
    }
    Ok(counts)
}
