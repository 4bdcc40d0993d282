//! Error types for agentbench-state

use thiserror::Error;

/// Errors that can occur in the history layer
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Backend unavailable or rejected the write
    #[error("History backend failed: {0}")]
    Backend(String),

    /// Record failed validation before the write
    #[error("Invalid history record: {0}")]
    InvalidRecord(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::Serialization(err.to_string())
    }
}
