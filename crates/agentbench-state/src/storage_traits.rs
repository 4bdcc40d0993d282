//! Storage trait definitions for pipeline history
//!
//! Records are written once per completed pipeline invocation, never while
//! a dispatch is still in flight. Payloads are stored as JSON values so the
//! host application does not need to depend on the pipeline's types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Result type for history operations
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// Unique identifier for a history record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    /// Generate a new random RecordId
    pub fn new() -> Self {
        RecordId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed classification → generation → evaluation invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub record_id: RecordId,
    /// Owner of the record (the host app's user key, e.g. an email)
    pub user: String,
    pub recorded_at: DateTime<Utc>,
    /// Category the generation task ran under
    pub category: String,
    /// Classification that led to this run, when one was made
    pub classification: Option<serde_json::Value>,
    /// Ordered generation results
    pub results: serde_json::Value,
    /// Per-agent evaluation scores
    pub scores: serde_json::Value,
    /// Aggregate statistics for the batch
    pub stats: serde_json::Value,
}

impl HistoryRecord {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(
        user: &str,
        category: &str,
        results: serde_json::Value,
        scores: serde_json::Value,
        stats: serde_json::Value,
    ) -> Self {
        Self {
            record_id: RecordId::new(),
            user: user.to_string(),
            recorded_at: Utc::now(),
            category: category.to_string(),
            classification: None,
            results,
            scores,
            stats,
        }
    }

    /// Attach the classification that preceded this run.
    pub fn with_classification(mut self, classification: serde_json::Value) -> Self {
        self.classification = Some(classification);
        self
    }
}

/// Durable history of pipeline invocations, keyed by user and timestamp.
///
/// Guarantees expected of implementations:
/// - `record` is append-only; records are never rewritten.
/// - `list` returns a user's records oldest first.
/// - `latest_stats` returns the `stats` of the most recent record.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a completed record.
    async fn record(&self, record: HistoryRecord) -> HistoryResult<RecordId>;

    /// All records for `user`, oldest first.
    async fn list(&self, user: &str) -> HistoryResult<Vec<HistoryRecord>>;

    /// Aggregate stats of the user's most recent record, if any.
    async fn latest_stats(&self, user: &str) -> HistoryResult<Option<serde_json::Value>>;
}
