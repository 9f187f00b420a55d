//! Optimistic vote tests

use crate::common::{MockFeedbackServer, TestProvider, FEEDBACK_PATH};
use feedkit::client::VoteOutcome;
use feedkit::shared::{FeedbackExtra, FeedbackRecord, FeedbackType, NotificationLevel};
use pretty_assertions::assert_eq;

async fn submitted(t: &TestProvider) -> FeedbackRecord {
    t.provider
        .submit_feedback("Please add CSV export", FeedbackType::Feature, FeedbackExtra::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_vote_reverted_when_endpoint_fails() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    server.answer_votes(500).await;
    let t = TestProvider::new(Some(server.endpoint()), true);
    let record = submitted(&t).await;
    let mut rx = t.provider.notifications();

    assert!(t.provider.vote_feedback(&record.id).await.is_err());

    let after = &t.provider.feedbacks().await[0];
    assert_eq!(after.votes, 0);
    assert!(after.voters.is_empty());
    assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Error);
    assert!(t.provider.error().await.is_some());
}

#[tokio::test]
async fn test_vote_kept_when_endpoint_accepts() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    server.answer_votes(200).await;
    let t = TestProvider::new(Some(server.endpoint()), true);
    let record = submitted(&t).await;

    assert_eq!(t.provider.vote_feedback(&record.id).await.unwrap(), VoteOutcome::Applied);

    let after = &t.provider.feedbacks().await[0];
    assert_eq!(after.votes, 1);
    let voter = t.store.get_identity().await.unwrap().id;
    assert_eq!(after.voters, vec![voter.clone()]);

    let requests = server.requests().await;
    let vote: serde_json::Value = serde_json::from_slice(&requests.last().unwrap().body).unwrap();
    assert_eq!(vote["feedbackId"], record.id.as_str());
    assert_eq!(vote["voterId"], voter.as_str());
}

#[tokio::test]
async fn test_duplicate_vote_changes_nothing() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    server.answer_votes(200).await;
    let t = TestProvider::new(Some(server.endpoint()), true);
    let record = submitted(&t).await;

    t.provider.vote_feedback(&record.id).await.unwrap();
    let before = t.provider.feedbacks().await[0].clone();
    let requests_before = server.request_count().await;
    let mut rx = t.provider.notifications();

    assert_eq!(t.provider.vote_feedback(&record.id).await.unwrap(), VoteOutcome::AlreadyVoted);

    let after = &t.provider.feedbacks().await[0];
    assert_eq!(after.votes, before.votes);
    assert_eq!(after.voters, before.voters);
    assert_eq!(server.request_count().await, requests_before);

    let notification = rx.recv().await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Info);
    assert!(notification.message.contains("already voted"));
}

#[tokio::test]
async fn test_offline_vote_on_queued_record_sent_once() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    server.answer_votes(200).await;
    let t = TestProvider::new(Some(server.endpoint()), false);
    let record = submitted(&t).await;

    t.provider.vote_feedback(&record.id).await.unwrap();
    let voter = t.store.get_identity().await.unwrap().id;
    assert!(t.store.pending_votes().await.is_empty());
    assert_eq!(t.store.get(&record.id).await.unwrap().voters, vec![voter.clone()]);
    assert_eq!(server.request_count().await, 0);

    t.monitor.set_online(true);
    let report = t.provider.sync_pending().await;
    assert_eq!(report.synced, 1);
    assert_eq!(report.votes_replayed, 0);

    let carrying_voter: Vec<_> = server
        .requests()
        .await
        .into_iter()
        .filter(|r| String::from_utf8_lossy(&r.body).contains(voter.as_str()))
        .collect();
    assert_eq!(carrying_voter.len(), 1);
    assert_eq!(carrying_voter[0].url.path(), FEEDBACK_PATH);
    let body: serde_json::Value = serde_json::from_slice(&carrying_voter[0].body).unwrap();
    assert_eq!(body["votes"], 1);
}

#[tokio::test]
async fn test_offline_vote_on_delivered_record_replayed_on_sync() {
    let server = MockFeedbackServer::start().await;
    server.accept_submissions().await;
    server.answer_votes(200).await;
    let t = TestProvider::new(Some(server.endpoint()), true);
    let record = submitted(&t).await;

    t.monitor.set_online(false);
    t.provider.vote_feedback(&record.id).await.unwrap();
    assert_eq!(t.store.pending_votes().await.len(), 1);
    assert_eq!(server.request_count().await, 1);

    t.monitor.set_online(true);
    let report = t.provider.sync_pending().await;
    assert_eq!(report.votes_replayed, 1);
    assert!(t.store.pending_votes().await.is_empty());

    let requests = server.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url.path(), format!("{}/vote", FEEDBACK_PATH));
}
