use std::path::PathBuf;

use thiserror::Error;

/// Main error type for index operations
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Malformed persisted data in {}: {reason}", path.display())]
    MalformedPersistedData { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        IndexError::MalformedPersistedData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error indicates a transient failure that could be retried
    pub fn is_retriable(&self) -> bool {
        matches!(self, IndexError::Io(_))
    }
}
