//! # Retry Policy
//!
//! Failed records are retried on every sync pass until they reach the
//! configured attempt cap. Records over the cap stay in storage as `failed`
//! and are skipped; they are never deleted automatically.

use crate::shared::config::FeedbackConfig;
use crate::shared::feedback::FeedbackRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries forever
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn new(max_attempts: Option<u32>) -> Self {
        Self { max_attempts }
    }

    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    pub fn from_config(config: &FeedbackConfig) -> Self {
        Self::new(config.max_sync_attempts)
    }

    /// Whether the record still has attempts left
    pub fn is_eligible(&self, record: &FeedbackRecord) -> bool {
        if !record.submission_status.is_sync_candidate() {
            return false;
        }
        match self.max_attempts {
            Some(max) => record.sync_attempts < max,
            None => true,
        }
    }

    /// Attempts left before the record is parked
    pub fn remaining(&self, record: &FeedbackRecord) -> Option<u32> {
        self.max_attempts
            .map(|max| max.saturating_sub(record.sync_attempts))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FeedbackConfig::default())
    }
}
