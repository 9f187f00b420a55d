//! Automatic sync when connectivity returns

use crate::common::MockFeedbackServer;
use feedkit::client::{FeedbackProvider, KeyValueStore, MemoryStore, NetworkMonitor, PendingStore};
use feedkit::shared::{FeedbackConfig, FeedbackExtra, FeedbackType, SubmissionStatus};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_online_transition_syncs_queue() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;

    let config = FeedbackConfig::builder().endpoint(server.endpoint()).build().unwrap();
    let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let store = PendingStore::new(backend.clone(), &config);
    let monitor = NetworkMonitor::new(false);
    let provider = FeedbackProvider::builder(config)
        .store(backend)
        .monitor(monitor.clone())
        .build()
        .unwrap();

    provider
        .submit_feedback("queued", FeedbackType::Improvement, FeedbackExtra::default())
        .await
        .unwrap();
    assert_eq!(store.load_all().await.len(), 1);

    monitor.set_online(true);

    tokio::time::timeout(Duration::from_secs(5), async {
        while !store.load_all().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("queue was not synced after reconnect");

    assert_eq!(provider.feedbacks().await[0].submission_status, SubmissionStatus::Synced);
    assert_eq!(server.request_count().await, 1);
}
