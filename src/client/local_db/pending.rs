//! # Pending Record Store
//!
//! Keeps the records that have not been confirmed by the endpoint under a
//! single storage key as a JSON array.
//!
//! Persistence is best-effort. Backend failures, quota errors and corrupt
//! payloads are logged and never returned: a failed write leaves the previous
//! value in place, and an unreadable value loads as an empty list.
//!
//! The list is read, modified and written back as a whole. Two writers on the
//! same backend can lose each other's updates.

use crate::client::local_db::KeyValueStore;
use crate::shared::config::FeedbackConfig;
use crate::shared::feedback::{FeedbackRecord, SubmissionStatus};
use std::sync::Arc;

pub(crate) const PENDING_KEY: &str = "feedback_pending";
pub(crate) const IDENTITY_KEY: &str = "feedback_user";
pub(crate) const VOTES_KEY: &str = "feedback_pending_votes";

/// Partial update merged into a stored record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub submission_status: Option<SubmissionStatus>,
    pub sync_attempts: Option<u32>,
    /// `Some(None)` clears the stored error
    pub last_error: Option<Option<String>>,
    pub voters: Option<Vec<String>>,
}

impl RecordPatch {
    fn apply(self, record: &mut FeedbackRecord) {
        if let Some(status) = self.submission_status {
            record.submission_status = status;
        }
        if let Some(attempts) = self.sync_attempts {
            record.sync_attempts = attempts;
        }
        if let Some(last_error) = self.last_error {
            record.last_error = last_error;
        }
        if let Some(voters) = self.voters {
            record.votes = voters.len() as u32;
            record.voters = voters;
        }
    }
}

/// Feedback-aware adapter over a [`KeyValueStore`]
#[derive(Clone)]
pub struct PendingStore {
    pub(crate) store: Arc<dyn KeyValueStore>,
    pending_key: String,
    pub(crate) identity_key: String,
    pub(crate) votes_key: String,
    max_inline_bytes: usize,
}

impl std::fmt::Debug for PendingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingStore")
            .field("pending_key", &self.pending_key)
            .field("identity_key", &self.identity_key)
            .field("votes_key", &self.votes_key)
            .finish()
    }
}

impl PendingStore {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &FeedbackConfig) -> Self {
        Self {
            store,
            pending_key: config.storage_key(PENDING_KEY),
            identity_key: config.storage_key(IDENTITY_KEY),
            votes_key: config.storage_key(VOTES_KEY),
            max_inline_bytes: config.attachments.max_inline_bytes,
        }
    }

    /// All persisted pending records, in insertion order
    pub async fn load_all(&self) -> Vec<FeedbackRecord> {
        self.read_list(&self.pending_key).await
    }

    /// Look up one persisted record
    pub async fn get(&self, id: &str) -> Option<FeedbackRecord> {
        self.load_all().await.into_iter().find(|r| r.id == id)
    }

    /// Insert or replace a record
    ///
    /// Inline attachment data that is not a data URL, or is larger than the
    /// configured inline limit, is dropped. The metadata stays.
    pub async fn save(&self, record: &FeedbackRecord) {
        let storable = self.storable(record);
        let mut records = self.load_all().await;
        match records.iter_mut().find(|r| r.id == storable.id) {
            Some(existing) => *existing = storable,
            None => records.push(storable),
        }
        self.write_list(&self.pending_key, &records).await;
    }

    /// Delete a record by id. No-op if absent.
    pub async fn remove(&self, id: &str) {
        let mut records = self.load_all().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() != before {
            self.write_list(&self.pending_key, &records).await;
        }
    }

    /// Merge `patch` into the stored record, if present
    ///
    /// Returns the updated record.
    pub async fn update(&self, id: &str, patch: RecordPatch) -> Option<FeedbackRecord> {
        let mut records = self.load_all().await;
        let record = records.iter_mut().find(|r| r.id == id)?;
        patch.apply(record);
        let updated = record.clone();
        self.write_list(&self.pending_key, &records).await;
        Some(updated)
    }

    fn storable(&self, record: &FeedbackRecord) -> FeedbackRecord {
        let mut record = record.clone();
        for attachment in &mut record.attachments {
            let keep = attachment
                .data_url
                .as_deref()
                .map(|url| url.starts_with("data:") && url.len() <= self.max_inline_bytes)
                .unwrap_or(false);
            if !keep {
                attachment.data_url = None;
            }
        }
        record
    }

    pub(crate) async fn read_list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read '{}' from local storage: {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("Discarding corrupt '{}' in local storage: {}", key, e);
                Vec::new()
            }
        }
    }

    pub(crate) async fn write_list<T: serde::Serialize>(&self, key: &str, list: &[T]) {
        let json = match serde_json::to_string(list) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize '{}': {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(key, &json).await {
            tracing::warn!("Failed to write '{}' to local storage: {}", key, e);
        }
    }
}
