//! Command-line surfaces of the two plugins.
//!
//! Argument errors never reach clap's own exit path: they become an
//! `UNKNOWN` plugin result so the exit code stays inside the contract.

pub mod filesystem;
pub mod honeypot;


use crate::plugin::{PluginOutput, Status};
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;

/// Parses `args` (program name first).
///
/// `--help` and `--version` come back as an `OK` output carrying the
/// rendered text; any other failure is `UNKNOWN: <reason>`.
pub fn parse_args<T, I, S>(args: I) -> Result<T, PluginOutput>
where
    T: Parser,
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    T::try_parse_from(args).map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let text = err.render().to_string();
            PluginOutput::new(
                Status::Ok,
                text.trim_end().lines().map(str::to_string).collect(),
            )
        }
        _ => PluginOutput::message(Status::Unknown, reason(&err)),
    })
}

/// The message block of a clap error (everything before the usage), on one
/// line and without the `error: ` prefix.
fn reason(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");
    message
        .strip_prefix("error: ")
        .unwrap_or(&message)
        .to_string()
}
