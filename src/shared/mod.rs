//! Shared Module
//!
//! Plain data types used by every other part of the crate: the feedback record,
//! the voter identity, notifications, errors and configuration. Nothing in here
//! performs I/O.

/// Feedback record and its enums
pub mod feedback;

/// Voter identity
pub mod identity;

/// Error types
pub mod error;

/// Configuration
pub mod config;

/// Message and attachment validation
pub mod validation;

/// User-facing notifications
pub mod notification;

/// Re-export commonly used types for convenience
pub use feedback::{
    Attachment, FeedbackExtra, FeedbackMetadata, FeedbackRecord, FeedbackType, SubmissionStatus,
};
pub use identity::VoterIdentity;
pub use error::{FeedbackError, Result, ValidationError};
pub use config::{
    AttachmentPolicy, ConfigError, FeedbackConfig, FeedbackConfigBuilder, IntegrationConfig,
    VoteRoute, WebhookKind,
};
pub use notification::{Notification, NotificationLevel};
