use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    //-------------------------------------------------------------------------
    // IO / Discovery
    //-------------------------------------------------------------------------
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("glob pattern error: {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    //-------------------------------------------------------------------------
    // Parsing
    //-------------------------------------------------------------------------
    #[error("invalid configuration file {path} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    //-------------------------------------------------------------------------
    // Includes
    //-------------------------------------------------------------------------
    #[error("include cycle detected: {path} is already being loaded")]
    IncludeCycle { path: PathBuf },

    #[error("include target '{target}' in {path} matched no files")]
    IncludeNotFound { path: PathBuf, target: String },

    #[error("include target {target} is a directory but directory includes are disabled")]
    IncludeDirectory { target: PathBuf },

    //-------------------------------------------------------------------------
    // Substitution
    //-------------------------------------------------------------------------
    #[error("undefined variable '${{{name}}}' referenced in configuration")]
    UndefinedVariable { name: String },

    #[error("variable '${{{name}}}' expands recursively")]
    RecursiveVariable { name: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// True when the error means an input file could not be read at all, as
    /// opposed to a file that was read but is malformed.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::ReadFile { .. } | Self::EnvFile { .. })
    }
}
