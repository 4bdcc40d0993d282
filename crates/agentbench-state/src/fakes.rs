//! In-memory fakes for storage traits (testing only)
//!
//! `MemoryHistoryStore` satisfies the `HistoryStore` contract without any
//! external dependencies.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::HistoryError;
use crate::storage_traits::*;

/// In-memory history backed by a `HashMap<user, Vec<HistoryRecord>>`.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: Mutex<HashMap<String, Vec<HistoryRecord>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all users.
    pub fn len(&self) -> usize {
        let records = self.records.lock().unwrap();
        records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn record(&self, record: HistoryRecord) -> HistoryResult<RecordId> {
        if record.user.trim().is_empty() {
            return Err(HistoryError::InvalidRecord("user must not be empty".to_string()));
        }
        let id = record.record_id.clone();
        let mut records = self.records.lock().unwrap();
        let entries = records.entry(record.user.clone()).or_default();
        entries.push(record);
        entries.sort_by_key(|r| r.recorded_at);
        debug!(record_id = %id, "history record stored");
        Ok(id)
    }

    async fn list(&self, user: &str) -> HistoryResult<Vec<HistoryRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(user).cloned().unwrap_or_default())
    }

    async fn latest_stats(&self, user: &str) -> HistoryResult<Option<serde_json::Value>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .get(user)
            .and_then(|entries| entries.last())
            .map(|r| r.stats.clone()))
    }
}
