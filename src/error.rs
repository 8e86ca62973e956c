//! Error handler for unixdir.

use std::path::PathBuf;

use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, BackendError>;

/// Enum representing backend-side errors.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("cannot read identity source {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),
}

impl BackendError {
    /// Wrap an I/O failure on the identity file at `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_yaml::Error> for BackendError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Failures of a credential check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("unrecognized prompt style {0}")]
    UnrecognizedPromptStyle(i32),

    #[error("authentication failed")]
    Failed,

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("pam error: {0}")]
    Pam(String),
}
