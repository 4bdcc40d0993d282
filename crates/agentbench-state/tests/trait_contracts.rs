//! Contract tests for `HistoryStore` implementations.

use agentbench_state::{HistoryError, HistoryRecord, HistoryStore, MemoryHistoryStore};
use chrono::Duration;
use serde_json::json;

fn record(user: &str, avg: f64) -> HistoryRecord {
    HistoryRecord::new(
        user,
        "blog",
        json!([{"agent_id": "1", "content": "draft"}]),
        json!([{"agent_id": "1", "average_score": avg}]),
        json!({"avg_score": avg}),
    )
}

#[tokio::test]
async fn test_record_then_list_returns_user_records_only() {
    let store = MemoryHistoryStore::new();
    store.record(record("ada@example.com", 3.0)).await.unwrap();
    store.record(record("bob@example.com", 4.0)).await.unwrap();

    let ada = store.list("ada@example.com").await.unwrap();
    assert_eq!(ada.len(), 1);
    assert_eq!(ada[0].user, "ada@example.com");
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_latest_stats_tracks_most_recent_record() {
    let store = MemoryHistoryStore::new();
    let mut older = record("ada@example.com", 2.0);
    older.recorded_at -= Duration::minutes(5);
    let newer = record("ada@example.com", 4.5);

    // Insert out of order; the store orders by timestamp.
    store.record(newer).await.unwrap();
    store.record(older).await.unwrap();

    let stats = store.latest_stats("ada@example.com").await.unwrap();
    assert_eq!(stats, Some(json!({"avg_score": 4.5})));
}

#[tokio::test]
async fn test_latest_stats_for_unknown_user_is_none() {
    let store = MemoryHistoryStore::new();
    assert!(store.latest_stats("nobody").await.unwrap().is_none());
    assert!(store.list("nobody").await.unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_blank_user_is_rejected() {
    let store = MemoryHistoryStore::new();
    let err = store.record(record("  ", 1.0)).await.unwrap_err();
    assert!(matches!(err, HistoryError::InvalidRecord(_)));
}

#[tokio::test]
async fn test_classification_is_kept_on_record() {
    let store = MemoryHistoryStore::new();
    let rec = record("ada@example.com", 3.0)
        .with_classification(json!({"content_type": "blog_writing"}));
    let id = store.record(rec).await.unwrap();

    let listed = store.list("ada@example.com").await.unwrap();
    assert_eq!(listed[0].record_id, id);
    assert_eq!(
        listed[0].classification,
        Some(json!({"content_type": "blog_writing"}))
    );
}
