use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global tracing subscriber for a plugin run.
///
/// Everything goes to stderr; stdout is reserved for plugin output.
/// - `RUST_LOG` wins when set
/// - otherwise `verbose` selects `debug`, else `warn`
/// - a terminal gets human-readable lines, anything else flattened JSON
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = match default_log_mode() {
        LogMode::Pretty => builder.with_target(false).try_init(),
        LogMode::Json => builder.json().flatten_event(true).try_init(),
    };
}

pub fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

pub fn default_log_mode() -> LogMode {
    if io::stderr().is_terminal() {
        LogMode::Pretty
    } else {
        LogMode::Json
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Json,
    Pretty,
}
