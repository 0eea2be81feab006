use crate::logs::error::LogError;
use crate::logs::types::LogRecord;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;

pub const COMMON: &str = r#"%h %l %u %t "%r" %>s %b"#;
pub const COMBINED: &str = r#"%h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-agent}i""#;
pub const VHOST_COMBINED: &str =
    r#"%v:%p %h %l %u %t "%r" %>s %O "%{Referer}i" "%{User-Agent}i""#;

/// `%t` renders as `[10/Oct/2000:13:55:36 -0700]`.
const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Formats Apache knows without a `LogFormat` directive.
pub fn builtin_format(nickname: &str) -> Option<&'static str> {
    match nickname {
        "common" => Some(COMMON),
        "combined" => Some(COMBINED),
        "vhost_combined" => Some(VHOST_COMBINED),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TimeFormat {
    Clf,
    Strftime(String),
    EpochSeconds,
    EpochMillis,
    EpochMicros,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    RemoteHost,
    RemoteUser,
    ServerName,
    Time(TimeFormat),
    RequestLine,
    Method,
    UrlPath,
    Query,
    Protocol,
    Status,
    ResponseBytes,
    Referer,
    UserAgent,
}

/// A compiled `mod_log_config` format string.
#[derive(Debug, Clone)]
pub struct LogFormat {
    source: String,
    regex: Regex,
    /// Field for each capture group, in group order.
    fields: Vec<Field>,
}

impl LogFormat {
    pub fn compile(format: &str) -> Result<Self, LogError> {
        let mut pattern = String::from("^");
        let mut fields = Vec::new();
        let mut chars = format.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                continue;
            }

            let modified = skip_modifiers(&mut chars);
            let param = read_param(&mut chars)
                .map_err(|reason| LogError::invalid_format(format, reason))?;
            let Some(directive) = chars.next() else {
                return Err(LogError::invalid_format(format, "dangling '%'"));
            };

            if directive == '%' && !modified && param.is_none() {
                pattern.push('%');
                continue;
            }
            if directive == '^' {
                // %{VARNAME}^ti / %{VARNAME}^to: trailer lines
                chars.next();
                chars.next();
                pattern.push_str("(?:.*?)");
                continue;
            }

            let (fragment, field) = directive_pattern(directive, param.as_deref());
            pattern.push_str(&fragment);
            if let Some(field) = field {
                fields.push(field);
            }
        }
        pattern.push('$');

        let has_host = fields.contains(&Field::RemoteHost);
        let has_time = fields.iter().any(|f| matches!(f, Field::Time(_)));
        if !has_host || !has_time {
            return Err(LogError::invalid_format(
                format,
                "format must capture the remote host (%h) and the request time (%t)",
            ));
        }

        let regex =
            Regex::new(&pattern).map_err(|e| LogError::invalid_format(format, e.to_string()))?;

        Ok(Self {
            source: format.to_string(),
            regex,
            fields,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parses one line. `None` means the line does not fit the format or
    /// lacks a usable timestamp.
    pub fn parse_line(&self, line: &str) -> Option<LogRecord> {
        let caps = self.regex.captures(line.trim_end_matches(['\r', '\n']))?;

        let mut time = None;
        let mut host = None;
        let mut rest = Vec::new();

        for (idx, field) in self.fields.iter().enumerate() {
            let Some(m) = caps.get(idx + 1) else {
                continue;
            };
            match field {
                Field::RemoteHost => {
                    host.get_or_insert(m.as_str());
                }
                // Formats may split the time over several directives; the
                // first one that parses on its own wins.
                Field::Time(format) if time.is_none() => time = parse_time(format, m.as_str()),
                Field::Time(_) => {}
                _ => rest.push((field, m.as_str())),
            }
        }

        let mut record = LogRecord::new(time?, host?);
        let mut request_line = None;

        for (field, value) in rest {
            match field {
                Field::RemoteUser => record.remote_user = non_dash(value),
                Field::ServerName => record.server_name = non_dash(value),
                Field::RequestLine => request_line = Some(value),
                Field::Method => record.request_method = non_dash(value),
                Field::UrlPath => record.request_url_path = non_dash(value),
                Field::Query => {
                    record.request_url_query = value
                        .strip_prefix('?')
                        .filter(|q| !q.is_empty())
                        .map(str::to_string)
                }
                Field::Protocol => record.request_http_ver = non_dash(value),
                Field::Status => record.status = value.parse().ok(),
                Field::ResponseBytes => {
                    if record.response_bytes.is_none() {
                        record.response_bytes = value.parse().ok();
                    }
                }
                Field::Referer => record.referer = non_dash(value),
                Field::UserAgent => record.user_agent = non_dash(value),
                Field::RemoteHost | Field::Time(_) => {}
            }
        }

        if let Some(line) = request_line.filter(|l| *l != "-") {
            record.request_first_line = Some(line.to_string());
            record.apply_request_line(line);
        }

        Some(record)
    }
}

/// Skips `<`, `>`, `!` and status lists like `400,501`.
fn skip_modifiers(chars: &mut Peekable<Chars<'_>>) -> bool {
    let mut modified = false;
    while let Some(&c) = chars.peek() {
        if matches!(c, '<' | '>' | '!' | ',') || c.is_ascii_digit() {
            modified = true;
            chars.next();
        } else {
            break;
        }
    }
    modified
}

fn read_param(chars: &mut Peekable<Chars<'_>>) -> Result<Option<String>, &'static str> {
    if chars.peek() != Some(&'{') {
        return Ok(None);
    }
    chars.next();

    let mut param = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            return Ok(Some(param));
        }
        param.push(c);
    }
    Err("unterminated '{' in directive")
}

/// Regex fragment for one directive. Fragments with a field carry exactly
/// one capture group; the rest are non-capturing.
fn directive_pattern(directive: char, param: Option<&str>) -> (String, Option<Field>) {
    let captured = |inner: &str, field: Field| (format!("({inner})"), Some(field));
    let skipped = |inner: &str| (format!("(?:{inner})"), None);

    match directive {
        'h' | 'a' => captured(r"\S+", Field::RemoteHost),
        'u' => captured(r"\S+", Field::RemoteUser),
        'v' | 'V' => captured(r"\S+", Field::ServerName),
        't' => match param {
            None => (r"\[([^\]]+)\]".to_string(), Some(Field::Time(TimeFormat::Clf))),
            Some(param) => time_pattern(param),
        },
        'r' => captured(".*?", Field::RequestLine),
        'm' => captured(r"\S+", Field::Method),
        'U' => captured(r"\S+", Field::UrlPath),
        'q' => captured(r"\S*", Field::Query),
        'H' => captured(r"\S+", Field::Protocol),
        's' => captured(r"\d{3}|-", Field::Status),
        'b' | 'B' | 'O' => captured(r"\d+|-", Field::ResponseBytes),
        'i' => match param {
            Some(name) if name.eq_ignore_ascii_case("referer") => {
                captured(".*?", Field::Referer)
            }
            Some(name) if name.eq_ignore_ascii_case("user-agent") => {
                captured(".*?", Field::UserAgent)
            }
            _ => skipped(".*?"),
        },
        'l' | 'I' | 'S' | 'D' | 'T' | 'p' | 'P' | 'k' | 'L' | 'X' | 'f' | 'R' => skipped(r"\S+"),
        _ => skipped(".*?"),
    }
}

fn time_pattern(param: &str) -> (String, Option<Field>) {
    let format = param
        .strip_prefix("begin:")
        .or_else(|| param.strip_prefix("end:"))
        .unwrap_or(param);

    let epoch = |f: TimeFormat| (r"(\d+)".to_string(), Some(Field::Time(f)));
    match format {
        "sec" => epoch(TimeFormat::EpochSeconds),
        "msec" => epoch(TimeFormat::EpochMillis),
        "usec" => epoch(TimeFormat::EpochMicros),
        "msec_frac" | "usec_frac" => (r"(?:\d+)".to_string(), None),
        _ => (
            "(.+?)".to_string(),
            Some(Field::Time(TimeFormat::Strftime(format.to_string()))),
        ),
    }
}

fn parse_time(format: &TimeFormat, value: &str) -> Option<DateTime<FixedOffset>> {
    match format {
        TimeFormat::Clf => DateTime::parse_from_str(value, CLF_TIME).ok(),
        TimeFormat::Strftime(fmt) => DateTime::parse_from_str(value, fmt).ok().or_else(|| {
            // No offset in the format: the server wrote local time.
            let naive = NaiveDateTime::parse_from_str(value, fmt).ok()?;
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset())
        }),
        TimeFormat::EpochSeconds => DateTime::<Utc>::from_timestamp(value.parse().ok()?, 0)
            .map(|dt| dt.fixed_offset()),
        TimeFormat::EpochMillis => {
            DateTime::<Utc>::from_timestamp_millis(value.parse().ok()?).map(|dt| dt.fixed_offset())
        }
        TimeFormat::EpochMicros => {
            DateTime::<Utc>::from_timestamp_micros(value.parse().ok()?).map(|dt| dt.fixed_offset())
        }
    }
}

fn non_dash(value: &str) -> Option<String> {
    (value != "-").then(|| value.to_string())
}
