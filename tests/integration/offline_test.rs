//! Submission tests: online, offline and failing endpoint

use crate::common::{MockFeedbackServer, TestProvider};
use feedkit::shared::{
    FeedbackConfig, FeedbackError, FeedbackExtra, FeedbackType, NotificationLevel, SubmissionStatus,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_offline_submit_is_queued_without_network() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    let t = TestProvider::new(Some(server.endpoint()), false);
    let mut rx = t.provider.notifications();

    let record = t
        .provider
        .submit_feedback("hello", FeedbackType::Bug, FeedbackExtra::default())
        .await
        .unwrap();

    let memory = t.provider.feedbacks().await;
    assert_eq!(memory.len(), 1);
    assert_eq!(memory[0].submission_status, SubmissionStatus::Pending);

    let stored = t.store.load_all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, record.id);
    assert_eq!(stored[0].submission_status, SubmissionStatus::Pending);

    assert_eq!(server.request_count().await, 0);
    let notification = rx.recv().await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Info);
}

#[tokio::test]
async fn test_online_submit_posts_record() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    let t = TestProvider::new(Some(server.endpoint()), true);

    let record = t
        .provider
        .submit_feedback("  Export is broken  ", FeedbackType::Bug, FeedbackExtra::default())
        .await
        .unwrap();
    assert_eq!(record.submission_status, SubmissionStatus::Synced);
    assert!(t.store.load_all().await.is_empty());

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["id"], record.id.as_str());
    assert_eq!(body["message"], "Export is broken");
    assert_eq!(body["type"], "bug");
}

#[tokio::test]
async fn test_failed_submit_falls_back_to_queue_then_syncs() {
    let server = MockFeedbackServer::start().await;
    server.fail_submissions(503, "maintenance").await;
    let t = TestProvider::new(Some(server.endpoint()), true);

    let record = t
        .provider
        .submit_feedback("queued on failure", FeedbackType::Feature, FeedbackExtra::default())
        .await
        .unwrap();
    assert_eq!(record.submission_status, SubmissionStatus::Pending);
    assert_eq!(t.store.load_all().await.len(), 1);

    server.server.reset().await;
    server.accept_submissions().await;

    let report = t.provider.sync_pending().await;
    assert_eq!(report.synced, 1);
    assert!(t.store.load_all().await.is_empty());
    assert_eq!(t.provider.feedbacks().await[0].submission_status, SubmissionStatus::Synced);
}

#[tokio::test]
async fn test_failed_submit_without_offline_support_surfaces_error() {
    let server = MockFeedbackServer::start().await;
    server.fail_submissions(400, "message rejected").await;
    let config = FeedbackConfig::builder()
        .endpoint(server.endpoint())
        .offline_support(false)
        .build()
        .unwrap();
    let t = TestProvider::with_config(config, true);

    let err = t
        .provider
        .submit_feedback("spam", FeedbackType::Other, FeedbackExtra::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FeedbackError::Api { status: 400, .. }));
    assert!(t.provider.feedbacks().await.is_empty());
    assert!(t.store.load_all().await.is_empty());
    assert_eq!(
        t.provider.error().await.as_deref(),
        Some("The feedback server rejected the request.")
    );
}

#[tokio::test]
async fn test_whitespace_message_creates_nothing() {
    let server = MockFeedbackServer::start().await;
    let t = TestProvider::new(Some(server.endpoint()), true);

    let err = t
        .provider
        .submit_feedback(" \n\t ", FeedbackType::Bug, FeedbackExtra::default())
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(t.provider.feedbacks().await.is_empty());
    assert!(t.provider.error().await.is_some());
    assert_eq!(server.request_count().await, 0);
}
