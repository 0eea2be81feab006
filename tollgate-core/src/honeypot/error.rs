use crate::conf::ConfigError;
use crate::logs::{LogError, PeriodError};
use crate::plugin::Status;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoneypotError {
    #[error("{path} is not a regular file")]
    NotAFile { path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Period(#[from] PeriodError),
}

impl HoneypotError {
    /// Plugin status reported when the run stops on this error.
    ///
    /// Missing inputs are CRITICAL, inputs that are present but cannot be
    /// understood are UNKNOWN.
    pub fn status(&self) -> Status {
        match self {
            Self::NotAFile { .. } => Status::Critical,
            Self::Config(e) if e.is_missing_input() => Status::Critical,
            Self::Config(_) => Status::Unknown,
            Self::Log(
                LogError::VirtualHostNotFound { .. }
                | LogError::DirectiveMissing { .. }
                | LogError::Unreadable { .. },
            ) => Status::Critical,
            Self::Log(LogError::UnknownFormat { .. } | LogError::InvalidFormat { .. }) => {
                Status::Unknown
            }
            Self::Period(_) => Status::Unknown,
        }
    }
}
