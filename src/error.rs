//! Chatter Error Types
//!
//! Centralized error handling for the announcement pipeline and its stores.

use std::path::PathBuf;
use thiserror::Error;

/// Central error type for Chatter
#[derive(Error, Debug)]
pub enum ChatterError {
    /// The speech backend could not be reached or refused the utterance
    #[error("Speech engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A durable write could not be flushed
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Corrupt queue file {path:?} at line {line}: {content:?}")]
    CorruptQueueFile {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Chatter operations
pub type ChatterResult<T> = Result<T, ChatterError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for ChatterError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        ChatterError::Lock(err.to_string())
    }
}
