use crate::logs::{COMBINED, COMMON, LogError, LogFormat, VHOST_COMBINED};
use chrono::{DateTime, TimeZone, Utc};

const COMBINED_LINE: &str = r#"203.0.113.7 - frank [10/Oct/2000:13:55:36 -0700] "GET /wp-login.php?redirect=1 HTTP/1.1" 404 2326 "http://example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;

#[test]
fn parses_combined_line() {
    // Arrange
    let format = LogFormat::compile(COMBINED).unwrap();

    // Act
    let record = format.parse_line(COMBINED_LINE).unwrap();

    // Assert
    assert_eq!(record.remote_host, "203.0.113.7");
    assert_eq!(record.remote_user.as_deref(), Some("frank"));
    assert_eq!(record.status, Some(404));
    assert_eq!(record.request_method.as_deref(), Some("GET"));
    assert_eq!(record.request_url_path.as_deref(), Some("/wp-login.php"));
    assert_eq!(record.request_url_query.as_deref(), Some("redirect=1"));
    assert_eq!(record.request_http_ver.as_deref(), Some("HTTP/1.1"));
    assert_eq!(record.response_bytes, Some(2326));
    assert_eq!(
        record.referer.as_deref(),
        Some("http://example.com/start.html")
    );
    assert_eq!(
        record.user_agent.as_deref(),
        Some("Mozilla/4.08 [en] (Win98; I ;Nav)")
    );
    assert_eq!(
        record.time_received.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2000, 10, 10, 20, 55, 36).unwrap()
    );
    assert_eq!(record.time_received_isoformat(), "2000-10-10T13:55:36-07:00");
}

#[test]
fn parses_common_line_with_dashes() {
    // Arrange
    let format = LogFormat::compile(COMMON).unwrap();

    // Act
    let record = format
        .parse_line("10.0.0.1 - - [01/Feb/2024:00:00:00 +0000] \"-\" 408 -\n")
        .unwrap();

    // Assert
    assert_eq!(record.remote_user, None);
    assert_eq!(record.request_first_line, None);
    assert_eq!(record.request_url_path, None);
    assert_eq!(record.status, Some(408));
    assert_eq!(record.response_bytes, None);
}

#[test]
fn parses_vhost_combined_line() {
    // Arrange
    let format = LogFormat::compile(VHOST_COMBINED).unwrap();
    let line = r#"shop.example:443 198.51.100.2 - - [05/Mar/2024:08:15:00 +0100] "POST /cart HTTP/2.0" 201 512 "-" "curl/8.0""#;

    // Act
    let record = format.parse_line(line).unwrap();

    // Assert
    assert_eq!(record.server_name.as_deref(), Some("shop.example"));
    assert_eq!(record.remote_host, "198.51.100.2");
    assert_eq!(record.referer, None);
    assert_eq!(record.user_agent.as_deref(), Some("curl/8.0"));
}

#[test]
fn absolute_request_uri_yields_path() {
    let format = LogFormat::compile(COMMON).unwrap();
    let record = format
        .parse_line(r#"10.0.0.1 - - [01/Feb/2024:00:00:00 +0000] "GET http://proxy.test/trap?a=b HTTP/1.1" 404 0"#)
        .unwrap();
    assert_eq!(record.request_url_path.as_deref(), Some("/trap"));
}

#[test]
fn dedicated_path_directive_wins_over_request_line() {
    // Arrange
    let format = LogFormat::compile(r#"%h %t %U "%r" %s"#).unwrap();

    // Act
    let record = format
        .parse_line(r#"10.0.0.1 [01/Feb/2024:00:00:00 +0000] /real "GET /rewritten HTTP/1.1" 200"#)
        .unwrap();

    // Assert
    assert_eq!(record.request_url_path.as_deref(), Some("/real"));
    assert_eq!(record.request_method.as_deref(), Some("GET"));
}

#[test]
fn custom_strftime_time_is_supported() {
    // Arrange
    let format = LogFormat::compile("%a %{%Y-%m-%dT%H:%M:%S%z}t %>s %U").unwrap();

    // Act
    let record = format
        .parse_line("192.0.2.9 2024-06-01T12:00:00+0200 404 /trap")
        .unwrap();

    // Assert
    assert_eq!(
        record.time_received.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(record.request_url_path.as_deref(), Some("/trap"));
}

#[test]
fn epoch_time_is_supported() {
    let format = LogFormat::compile("%h %{sec}t %s").unwrap();
    let record = format.parse_line("192.0.2.9 1700000000 404").unwrap();
    assert_eq!(
        record.time_received,
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .fixed_offset()
    );
}

#[test]
fn conditional_modifiers_are_accepted() {
    let format = LogFormat::compile(r#"%h %t %400,501{User-agent}i %!200s 100%%"#).unwrap();
    let record = format
        .parse_line("10.0.0.1 [01/Feb/2024:00:00:00 +0000] bot 404 100%")
        .unwrap();
    assert_eq!(record.user_agent.as_deref(), Some("bot"));
    assert_eq!(record.status, Some(404));
}

#[test]
fn malformed_lines_are_rejected() {
    let format = LogFormat::compile(COMBINED).unwrap();

    assert!(format.parse_line("").is_none());
    assert!(format.parse_line("garbage without structure").is_none());
    assert!(
        format
            .parse_line(r#"10.0.0.1 - - [not a date] "GET / HTTP/1.1" 200 1 "-" "-""#)
            .is_none()
    );
}

#[test]
fn format_without_host_or_time_is_invalid() {
    let err = LogFormat::compile(r#"%{Referer}i -> %U"#).unwrap_err();
    assert!(matches!(err, LogError::InvalidFormat { .. }));
}

#[test]
fn unterminated_parameter_is_invalid() {
    let err = LogFormat::compile("%h %t %{Referer").unwrap_err();
    assert!(matches!(err, LogError::InvalidFormat { .. }));
}
