//! feedkit - Main Library
//!
//! feedkit is the client core of a feedback widget: it accepts feedback and
//! votes from a UI, delivers them to a feedback endpoint, and keeps them on the
//! device while the endpoint is unreachable.
//!
//! # Overview
//!
//! This library provides:
//! - Validation of messages and attachments
//! - Immediate delivery with fallback to a local pending queue
//! - Sync passes that retry queued records when connectivity returns
//! - Optimistic votes with rollback when the endpoint refuses them
//! - Fan-out of confirmed feedback to webhooks, issue trackers and email
//!
//! # Module Structure
//!
//! - **`shared`** - Plain data types
//!   - Feedback record, voter identity, notifications
//!   - Configuration and validation
//!   - Error types
//!
//! - **`client`** - I/O and orchestration
//!   - Endpoint client, local storage (SQLite or memory)
//!   - Connectivity monitor, sync service
//!   - `FeedbackProvider`, the boundary the UI consumes
//!
//! - **`integrations`** - Third-party targets
//!   - Slack, Discord, Teams and generic webhooks
//!   - GitHub and GitLab issues
//!   - SMTP email (`email` feature)
//!
//! # Feature Flags
//!
//! - **`email`** - SMTP notifications via lettre
//!
//! # Usage
//!
//! ```rust,no_run
//! use feedkit::client::{FeedbackProvider, LocalDatabase};
//! use feedkit::shared::{FeedbackConfig, FeedbackExtra, FeedbackType};
//! use std::sync::Arc;
//!
//! # async fn example() -> feedkit::shared::Result<()> {
//! let config = FeedbackConfig::builder()
//!     .endpoint("https://example.com/api/feedback")
//!     .build()?;
//! let provider = FeedbackProvider::builder(config)
//!     .store(Arc::new(LocalDatabase::new().await?))
//!     .build()?;
//!
//! provider.restore_pending().await;
//! provider
//!     .submit_feedback("Love the new layout", FeedbackType::Other, FeedbackExtra::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Shared state lives in `Arc<RwLock<_>>` and is never locked across a
//! network call. Notifications go out on a `broadcast` channel and
//! connectivity changes on a `watch` channel.
//!
//! # Error Handling
//!
//! - `shared::error::FeedbackError` for fallible operations
//! - Storage failures are logged and swallowed by the pending store
//! - Integration failures are logged and never affect a record's status

/// Shared types and data structures
pub mod shared;

/// Endpoint client, storage and sync
pub mod client;

/// Third-party integrations
pub mod integrations;
