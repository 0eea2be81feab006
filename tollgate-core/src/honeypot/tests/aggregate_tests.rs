use crate::honeypot::{HoneypotMatcher, HostCounts, count_hits};
use crate::logs::{LogError, LogRecord};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn hit(host: &str, path: &str, status: u16) -> LogRecord {
    let mut record = LogRecord::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset(),
        host,
    );
    record.request_url_path = Some(path.to_string());
    record.status = Some(status);
    record
}

#[test]
fn matcher_requires_exact_path_and_404() {
    let matcher = HoneypotMatcher::new("/trap");

    assert!(matcher.matches(&hit("a", "/trap", 404)));
    assert!(!matcher.matches(&hit("a", "/trap", 200)));
    assert!(!matcher.matches(&hit("a", "/trap/", 404)));
    assert!(!matcher.matches(&hit("a", "/TRAP", 404)));
    assert!(!matcher.matches(&LogRecord::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset(),
        "a"
    )));
}

#[test]
fn counts_hosts_in_sorted_order() {
    // Arrange
    let counts: HostCounts = ["b", "a", "a", "c", "b", "a"].into_iter().collect();

    // Act
    let pairs: Vec<(&str, u64)> = counts.iter().map(|(h, &n)| (h.as_str(), n)).collect();

    // Assert
    assert_eq!(pairs, vec![("a", 3), ("b", 2), ("c", 1)]);
    assert_eq!(counts.total(), 6);
}

#[test]
fn hosts_are_not_normalized() {
    let counts: HostCounts = ["Host.example", "host.example", "::1", "0:0:0:0:0:0:0:1"]
        .into_iter()
        .collect();

    assert_eq!(counts.len(), 4);
    assert_eq!(counts.get("host.example"), 1);
}

#[test]
fn count_hits_only_counts_matching_records() {
    // Arrange
    let matcher = HoneypotMatcher::new("/trap");
    let records = vec![
        Ok(hit("1.2.3.4", "/trap", 404)),
        Ok(hit("1.2.3.4", "/index.html", 404)),
        Ok(hit("5.6.7.8", "/trap", 404)),
        Ok(hit("5.6.7.8", "/trap", 301)),
        Ok(hit("1.2.3.4", "/trap", 404)),
    ];

    // Act
    let counts = count_hits(&matcher, records).unwrap();

    // Assert
    assert_eq!(counts.get("1.2.3.4"), 2);
    assert_eq!(counts.get("5.6.7.8"), 1);
    assert_eq!(counts.len(), 2);
}

#[test]
fn count_hits_stops_at_stream_error() {
    let matcher = HoneypotMatcher::new("/trap");
    let records = vec![
        Ok(hit("a", "/trap", 404)),
        Err(LogError::unreadable(
            "/var/log/gone.log",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        )),
    ];

    let err = count_hits(&matcher, records).unwrap_err();

    assert!(matches!(err, LogError::Unreadable { .. }));
}
