//! Feedback Record Types
//!
//! This module defines the feedback record that flows between the in-memory
//! provider state, the local pending store, and the remote endpoint.
//!
//! # Wire Format
//!
//! Records serialize with camelCase field names so the JSON body posted to the
//! feedback endpoint matches what browser clients send:
//!
//! ```json
//! {
//!   "id": "5a0c...",
//!   "message": "The export button does nothing",
//!   "type": "bug",
//!   "timestamp": "2024-01-01T10:00:00Z",
//!   "submissionStatus": "pending",
//!   "votes": 0,
//!   "voters": [],
//!   "attachments": []
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of feedback the user is reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Bug,
    Feature,
    Improvement,
    Other,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Bug => "bug",
            FeedbackType::Feature => "feature",
            FeedbackType::Improvement => "improvement",
            FeedbackType::Other => "other",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeedbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bug" => Ok(FeedbackType::Bug),
            "feature" => Ok(FeedbackType::Feature),
            "improvement" => Ok(FeedbackType::Improvement),
            "other" => Ok(FeedbackType::Other),
            other => Err(format!("unknown feedback type: {}", other)),
        }
    }
}

/// Where a record is in its delivery lifecycle
///
/// `Synced` is terminal. Older clients wrote `"submitted"` for the same state,
/// so that spelling is accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Accepted locally, not yet confirmed by the endpoint
    Pending,
    /// Confirmed by the endpoint
    #[serde(alias = "submitted")]
    Synced,
    /// Last delivery attempt failed; eligible for the next sync pass
    Failed,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Synced)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Synced => "synced",
            SubmissionStatus::Failed => "failed",
        })
    }
}

/// Attachment metadata carried by a record
///
/// Only serializable data lives here. `data_url` holds an inline preview
/// when the caller captured one (e.g. a screenshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            size,
            data_url: None,
        }
    }

    pub fn with_data_url(mut self, data_url: impl Into<String>) -> Self {
        self.data_url = Some(data_url.into());
        self
    }
}

/// Context captured alongside the message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Optional fields supplied with a submission
#[derive(Debug, Clone, Default)]
pub struct FeedbackExtra {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub attachments: Vec<Attachment>,
    pub metadata: Option<FeedbackMetadata>,
}

/// One user-submitted feedback entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    /// Client-generated identifier, never changes
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Creation instant, set once
    pub timestamp: DateTime<Utc>,
    pub submission_status: SubmissionStatus,
    #[serde(default)]
    pub votes: u32,
    #[serde(default, alias = "votedBy")]
    pub voters: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FeedbackMetadata>,
    /// Failed delivery attempts made by sync passes
    #[serde(default)]
    pub sync_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl FeedbackRecord {
    /// Create a new pending record with a fresh id
    ///
    /// The message is stored trimmed. Callers validate before creating.
    pub fn new(message: &str, feedback_type: FeedbackType, extra: FeedbackExtra) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.trim().to_string(),
            feedback_type,
            category: extra.category,
            subcategory: extra.subcategory,
            timestamp: Utc::now(),
            submission_status: SubmissionStatus::Pending,
            votes: 0,
            voters: Vec::new(),
            attachments: extra.attachments,
            metadata: extra.metadata,
            sync_attempts: 0,
            last_error: None,
        }
    }

    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.voters.iter().any(|v| v == voter_id)
    }

    /// Record a vote. Returns false if the voter already voted.
    pub fn add_vote(&mut self, voter_id: &str) -> bool {
        if self.has_voted(voter_id) {
            return false;
        }
        self.voters.push(voter_id.to_string());
        self.votes = self.voters.len() as u32;
        true
    }

    /// Undo a vote previously added with [`add_vote`](Self::add_vote)
    pub fn remove_vote(&mut self, voter_id: &str) -> bool {
        let before = self.voters.len();
        self.voters.retain(|v| v != voter_id);
        self.votes = self.voters.len() as u32;
        before != self.voters.len()
    }

    /// Short single-line summary used for issue titles and notifications
    pub fn title(&self) -> String {
        let first_line = self.message.lines().next().unwrap_or_default();
        let mut title: String = first_line.chars().take(80).collect();
        if first_line.chars().count() > 80 {
            title.push_str("...");
        }
        format!("[{}] {}", self.feedback_type, title)
    }
}
