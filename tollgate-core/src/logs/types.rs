use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;

/// One parsed access-log line.
///
/// Only the receipt time and the remote host are guaranteed; every other
/// field is present when the log format captures it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub time_received: DateTime<FixedOffset>,
    pub remote_host: String,
    pub remote_user: Option<String>,
    pub server_name: Option<String>,
    /// Raw `%r`, e.g. `GET /index.html?x=1 HTTP/1.1`
    pub request_first_line: Option<String>,
    pub request_method: Option<String>,
    pub request_url_path: Option<String>,
    pub request_url_query: Option<String>,
    pub request_http_ver: Option<String>,
    pub status: Option<u16>,
    pub response_bytes: Option<u64>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl LogRecord {
    pub fn new(time_received: DateTime<FixedOffset>, remote_host: impl Into<String>) -> Self {
        Self {
            time_received,
            remote_host: remote_host.into(),
            remote_user: None,
            server_name: None,
            request_first_line: None,
            request_method: None,
            request_url_path: None,
            request_url_query: None,
            request_http_ver: None,
            status: None,
            response_bytes: None,
            referer: None,
            user_agent: None,
        }
    }

    pub fn time_received_isoformat(&self) -> String {
        self.time_received.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }

    /// Fills method, path, query and protocol from a raw request line.
    /// Values set by dedicated directives (`%m`, `%U`, ...) are kept.
    pub(crate) fn apply_request_line(&mut self, line: &str) {
        let mut parts = line.split_whitespace();
        let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
            return;
        };

        let target = strip_authority(target);
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        self.request_method.get_or_insert_with(|| method.to_string());
        self.request_url_path.get_or_insert_with(|| path.to_string());
        if let Some(query) = query {
            self.request_url_query
                .get_or_insert_with(|| query.to_string());
        }
        if let Some(protocol) = parts.next() {
            self.request_http_ver
                .get_or_insert_with(|| protocol.to_string());
        }
    }
}

/// `http://host/path` -> `/path`. Proxy requests carry absolute URIs.
fn strip_authority(target: &str) -> &str {
    let Some((_, rest)) = target.split_once("://") else {
        return target;
    };
    match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => "/",
    }
}
