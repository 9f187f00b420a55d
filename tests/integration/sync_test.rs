//! Sync pass tests against a mock endpoint

use crate::common::{new_record, MockFeedbackServer, TestProvider};
use feedkit::shared::{NotificationLevel, SubmissionStatus};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_reconnect_sync_success() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    let t = TestProvider::new(Some(server.endpoint()), true);

    let record = new_record("saved while offline");
    t.store.save(&record).await;
    t.provider.restore_pending().await;

    let report = t.provider.sync_pending().await;
    assert_eq!((report.attempted, report.synced, report.failed), (1, 1, 0));

    let memory = t.provider.feedbacks().await;
    assert_eq!(memory[0].id, record.id);
    assert_eq!(memory[0].submission_status, SubmissionStatus::Synced);
    assert!(t.store.get(&record.id).await.is_none());
}

#[tokio::test]
async fn test_reconnect_sync_failure() {
    let server = MockFeedbackServer::start().await;
    server.fail_submissions(500, "Internal Server Error").await;
    let t = TestProvider::new(Some(server.endpoint()), true);

    let record = new_record("saved while offline");
    t.store.save(&record).await;
    t.provider.restore_pending().await;
    let mut rx = t.provider.notifications();

    let report = t.provider.sync_pending().await;
    assert_eq!((report.attempted, report.synced, report.failed), (1, 0, 1));

    assert_eq!(t.provider.feedbacks().await[0].submission_status, SubmissionStatus::Failed);
    let stored = t.store.get(&record.id).await.unwrap();
    assert_eq!(stored.submission_status, SubmissionStatus::Failed);
    assert_eq!(stored.sync_attempts, 1);
    assert!(stored.last_error.unwrap().contains("500"));

    // info before, success after, even though the record failed
    assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Info);
    assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Success);
}

#[tokio::test]
async fn test_records_sent_in_stored_order() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    let t = TestProvider::new(Some(server.endpoint()), true);

    let ids: Vec<String> = {
        let mut ids = Vec::new();
        for message in ["first", "second", "third"] {
            let record = new_record(message);
            t.store.save(&record).await;
            ids.push(record.id);
        }
        ids
    };

    t.provider.sync_pending().await;

    let sent: Vec<String> = server
        .requests()
        .await
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["id"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(sent, ids);
}

#[tokio::test]
async fn test_offline_sync_makes_no_requests() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    let t = TestProvider::new(Some(server.endpoint()), false);
    t.store.save(&new_record("waiting")).await;

    let report = t.provider.sync_pending().await;
    assert!(report.is_noop());
    assert_eq!(server.request_count().await, 0);
    assert_eq!(t.store.load_all().await.len(), 1);
}

#[tokio::test]
async fn test_sync_without_endpoint_is_noop() {
    let t = TestProvider::new(None, true);
    t.store.save(&new_record("waiting")).await;

    assert!(t.provider.sync_pending().await.is_noop());
    assert_eq!(t.store.load_all().await.len(), 1);
}
