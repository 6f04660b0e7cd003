use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    /// The workspace project list could not be read or parsed. Fatal for the run.
    #[error("workspace discovery failed: {0}")]
    Discovery(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized shape in {}: {reason}", path.display())]
    UnrecognizedShape { path: PathBuf, reason: String },
}

impl MigrateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }

    pub fn shape(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnrecognizedShape { path: path.into(), reason: reason.into() }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Discovery(_))
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
