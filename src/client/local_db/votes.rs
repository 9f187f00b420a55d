//! Votes cast while offline
//!
//! The optimistic vote is already applied in memory; these entries only
//! remember that the endpoint has not heard about it. The next sync pass
//! replays them.

use crate::client::local_db::PendingStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVote {
    pub feedback_id: String,
    pub voter_id: String,
    pub queued_at: DateTime<Utc>,
}

impl PendingVote {
    pub fn new(feedback_id: impl Into<String>, voter_id: impl Into<String>) -> Self {
        Self {
            feedback_id: feedback_id.into(),
            voter_id: voter_id.into(),
            queued_at: Utc::now(),
        }
    }
}

impl PendingStore {
    pub async fn pending_votes(&self) -> Vec<PendingVote> {
        self.read_list(&self.votes_key).await
    }

    /// Queue a vote. A second vote for the same record and voter is ignored.
    pub async fn enqueue_vote(&self, vote: PendingVote) {
        let mut votes = self.pending_votes().await;
        if votes
            .iter()
            .any(|v| v.feedback_id == vote.feedback_id && v.voter_id == vote.voter_id)
        {
            return;
        }
        votes.push(vote);
        self.write_list(&self.votes_key, &votes).await;
    }

    pub async fn remove_vote(&self, feedback_id: &str, voter_id: &str) {
        let mut votes = self.pending_votes().await;
        let before = votes.len();
        votes.retain(|v| !(v.feedback_id == feedback_id && v.voter_id == voter_id));
        if votes.len() != before {
            self.write_list(&self.votes_key, &votes).await;
        }
    }
}
