//! SQLite-backed pending store tests

use crate::common::new_record;
use feedkit::client::{KeyValueStore, LocalDatabase, PendingStore};
use feedkit::shared::{FeedbackConfig, SubmissionStatus, VoterIdentity};
use std::sync::Arc;

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedback.db");
    let config = FeedbackConfig::default();
    let record = new_record("persist me");

    {
        let db = LocalDatabase::open(&path).await.unwrap();
        let store = PendingStore::new(Arc::new(db), &config);
        store.save(&record).await;
    }

    let db = LocalDatabase::open(&path).await.unwrap();
    let store = PendingStore::new(Arc::new(db), &config);
    let loaded = store.load_all().await;

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, record.id);
    assert_eq!(loaded[0].message, record.message);
    assert_eq!(loaded[0].feedback_type, record.feedback_type);
    assert_eq!(loaded[0].submission_status, SubmissionStatus::Pending);
}

#[tokio::test]
async fn test_corrupt_value_loads_empty() {
    let db = Arc::new(LocalDatabase::in_memory().await.unwrap());
    db.set("feedback_pending", "{ not json").await.unwrap();

    let store = PendingStore::new(db, &FeedbackConfig::default());
    assert!(store.load_all().await.is_empty());

    // the next save replaces the corrupt value
    store.save(&new_record("fresh")).await;
    assert_eq!(store.load_all().await.len(), 1);
}

#[tokio::test]
async fn test_identity_persisted_in_sqlite() {
    let db = Arc::new(LocalDatabase::in_memory().await.unwrap());
    let store = PendingStore::new(db.clone(), &FeedbackConfig::default());

    let id = store.voter_id().await;
    assert_eq!(store.voter_id().await, id);

    let raw = db.get("feedback_user").await.unwrap().unwrap();
    let identity: VoterIdentity = serde_json::from_str(&raw).unwrap();
    assert_eq!(identity.id, id);
}
