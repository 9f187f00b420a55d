//! # Sync Pass Results
//!
//! What one sync pass did, for callers and logs.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records a delivery was attempted for
    pub attempted: usize,
    /// Records the endpoint accepted
    pub synced: usize,
    /// Records that failed and stay stored
    pub failed: usize,
    /// Failed records skipped because they reached the retry cap
    pub skipped: usize,
    /// Offline votes delivered
    pub votes_replayed: usize,
    /// Offline votes that failed again and stay queued
    pub votes_failed: usize,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncReport {
    /// Whether the pass did nothing at all
    pub fn is_noop(&self) -> bool {
        self.attempted == 0 && self.votes_replayed == 0 && self.votes_failed == 0
    }
}
