//! Feedback Error Types
//!
//! This module defines the error taxonomy used across the crate.
//!
//! # Error Categories
//!
//! - `Validation` - Bad message or attachment, blocked before any I/O
//! - `Network` - The request never produced a response
//! - `Api` - The endpoint answered with a non-2xx status or `success: false`
//! - `Storage` - Local persistence failed (swallowed by the pending store)
//! - `Config` - Invalid configuration
//! - `Integration` - A third-party fan-out target failed
//!
//! For the submission state machine every delivery failure is the same thing:
//! the record becomes retry-eligible. The kinds only differ in what the user
//! is told, see [`FeedbackError::user_message`].
//!
//! # Usage
//!
//! ```rust
//! use feedkit::shared::error::{FeedbackError, ValidationError};
//!
//! let error = FeedbackError::from(ValidationError::EmptyMessage);
//! assert!(error.is_validation());
//! ```
use crate::shared::config::ConfigError;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Reasons a submission is rejected locally
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("feedback message cannot be empty")]
    EmptyMessage,

    #[error("feedback message is {actual} characters, the limit is {max}")]
    MessageTooLong { max: usize, actual: usize },

    #[error("at most {max} attachments are allowed")]
    TooManyAttachments { max: usize },

    #[error("attachment '{filename}' exceeds the {max} byte limit")]
    AttachmentTooLarge { filename: String, max: u64 },

    #[error("attachment '{filename}' has unsupported type '{mime_type}'")]
    UnsupportedAttachmentType { filename: String, mime_type: String },
}

/// Errors that can occur while collecting and delivering feedback
#[derive(Debug, Error, Clone)]
pub enum FeedbackError {
    /// Submission rejected before reaching the network
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Transport failure (connection refused, DNS, timeout)
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message
        message: String,
    },

    /// Endpoint responded but did not accept the request
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code, 200 when the body reported `success: false`
        status: u16,
        /// Response body text or the `error` field
        message: String,
    },

    /// Local persistence failure
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message
        message: String,
    },

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Third-party integration failure
    #[error("Integration '{provider}' failed: {message}")]
    Integration {
        /// Integration name, e.g. "slack"
        provider: String,
        /// Human-readable error message
        message: String,
    },
}

impl FeedbackError {
    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new integration error
    pub fn integration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Integration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this failure should leave a record eligible for retry
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Api { .. })
    }

    /// Text suitable for showing to the person who submitted feedback
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => match err {
                ValidationError::EmptyMessage => "Please enter your feedback before submitting.".to_string(),
                other => format!("{}.", capitalize(&other.to_string())),
            },
            Self::Network { .. } => {
                "We couldn't reach the feedback server. Please check your connection.".to_string()
            }
            Self::Api { status, .. } if *status >= 500 => {
                "The feedback server had a problem. Please try again later.".to_string()
            }
            Self::Api { .. } => "The feedback server rejected the request.".to_string(),
            Self::Storage { .. } => "Your feedback could not be saved on this device.".to_string(),
            Self::Config(_) => "Feedback is not configured correctly.".to_string(),
            Self::Integration { provider, .. } => format!("Could not notify {}.", provider),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<reqwest::Error> for FeedbackError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::api(status.as_u16(), err.to_string()),
            None => Self::network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FeedbackError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("JSON error: {}", err))
    }
}

impl From<sqlx::Error> for FeedbackError {
    fn from(err: sqlx::Error) -> Self {
        Self::storage(format!("database error: {}", err))
    }
}
