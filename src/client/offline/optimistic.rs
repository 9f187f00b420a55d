//! # Optimistic Votes
//!
//! A vote is applied to the in-memory record before the endpoint confirms it.
//! If the endpoint then refuses, the vote is rolled back: the counter goes
//! down and the voter id is removed again.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use feedkit::client::offline::{OptimisticManager, VoteOutcome};
//!
//! # async fn example(records: &mut Vec<feedkit::shared::FeedbackRecord>) {
//! let manager = OptimisticManager::new();
//!
//! if manager.apply_vote(records, "feedback-id", "voter-id").await == VoteOutcome::Applied {
//!     // ... call the endpoint, then either
//!     manager.confirm_vote("feedback-id", "voter-id").await;
//!     // or
//!     manager.rollback_vote(records, "feedback-id", "voter-id").await;
//! }
//! # }
//! ```

use crate::shared::feedback::FeedbackRecord;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Result of applying a vote locally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Counter incremented and voter recorded
    Applied,
    /// Voter already in the record's voter list, nothing changed
    AlreadyVoted,
    /// No record with that id
    NotFound,
}

/// A vote applied locally and not yet confirmed
#[derive(Debug, Clone)]
pub struct OptimisticVote {
    pub feedback_id: String,
    pub voter_id: String,
    pub applied_at: DateTime<Utc>,
}

/// Tracks unconfirmed votes so they can be confirmed or rolled back
#[derive(Debug, Default)]
pub struct OptimisticManager {
    updates: RwLock<HashMap<(String, String), OptimisticVote>>,
}

impl OptimisticManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a vote to the matching record in `records`
    pub async fn apply_vote(
        &self,
        records: &mut [FeedbackRecord],
        feedback_id: &str,
        voter_id: &str,
    ) -> VoteOutcome {
        let Some(record) = records.iter_mut().find(|r| r.id == feedback_id) else {
            return VoteOutcome::NotFound;
        };
        if !record.add_vote(voter_id) {
            return VoteOutcome::AlreadyVoted;
        }

        let vote = OptimisticVote {
            feedback_id: feedback_id.to_string(),
            voter_id: voter_id.to_string(),
            applied_at: Utc::now(),
        };
        self.updates
            .write()
            .await
            .insert((feedback_id.to_string(), voter_id.to_string()), vote);
        VoteOutcome::Applied
    }

    /// The endpoint accepted the vote; keep it
    pub async fn confirm_vote(&self, feedback_id: &str, voter_id: &str) {
        self.updates
            .write()
            .await
            .remove(&(feedback_id.to_string(), voter_id.to_string()));
    }

    /// Undo a vote applied with [`apply_vote`](Self::apply_vote)
    ///
    /// Returns false if no such unconfirmed vote exists. Confirmed votes
    /// and votes from other voters are never touched.
    pub async fn rollback_vote(
        &self,
        records: &mut [FeedbackRecord],
        feedback_id: &str,
        voter_id: &str,
    ) -> bool {
        let removed = self
            .updates
            .write()
            .await
            .remove(&(feedback_id.to_string(), voter_id.to_string()));
        if removed.is_none() {
            return false;
        }

        match records.iter_mut().find(|r| r.id == feedback_id) {
            Some(record) => record.remove_vote(voter_id),
            None => false,
        }
    }

    /// Whether a vote is still waiting for confirmation
    pub async fn is_pending(&self, feedback_id: &str, voter_id: &str) -> bool {
        self.updates
            .read()
            .await
            .contains_key(&(feedback_id.to_string(), voter_id.to_string()))
    }

    pub async fn count_pending(&self) -> usize {
        self.updates.read().await.len()
    }
}
