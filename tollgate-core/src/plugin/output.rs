use crate::plugin::status::Status;
use std::fmt::Display;
use std::io::{self, Write};
use std::process::ExitCode;

/// What a plugin run reports: an overall status and the stdout lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutput {
    pub status: Status,
    pub lines: Vec<String>,
}

impl PluginOutput {
    pub fn new(status: Status, lines: Vec<String>) -> Self {
        Self { status, lines }
    }

    /// Single `STATUS: message` line.
    pub fn message(status: Status, message: impl Display) -> Self {
        Self::new(status, vec![format!("{status}: {message}")])
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Writes the lines to stdout and returns the matching exit code.
    pub fn emit(&self) -> ExitCode {
        let mut stdout = io::stdout().lock();
        if stdout.write_all(self.render().as_bytes()).is_err() || stdout.flush().is_err() {
            return Status::Unknown.into();
        }
        self.status.into()
    }
}
