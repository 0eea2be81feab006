use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    //-------------------------------------------------------------------------
    // Location
    //-------------------------------------------------------------------------
    #[error("virtual host '{name}' not found in configuration")]
    VirtualHostNotFound { name: String },

    #[error("no access log configured for {scope}")]
    DirectiveMissing { scope: String },

    //-------------------------------------------------------------------------
    // Formats
    //-------------------------------------------------------------------------
    #[error("unknown log format nickname '{nickname}'")]
    UnknownFormat { nickname: String },

    #[error("invalid log format '{format}': {reason}")]
    InvalidFormat { format: String, reason: String },

    //-------------------------------------------------------------------------
    // IO
    //-------------------------------------------------------------------------
    #[error("failed to read log file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_format(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format: format.into(),
            reason: reason.into(),
        }
    }
}
