//! # Offline Feedback
//!
//! Rules for records and votes that cannot be confirmed right away.
//!
//! ## Key Components
//!
//! - `status.rs`: submission status transitions
//! - `optimistic.rs`: optimistic votes with rollback
//! - `retry.rs`: which failed records a sync pass retries
//!
//! Persistence of pending records and votes lives in `local_db`; delivery and
//! reconciliation live in `sync`.

pub mod optimistic;
pub mod retry;
pub mod status;

// Re-export main types
pub use optimistic::{OptimisticManager, OptimisticVote, VoteOutcome};
pub use retry::RetryPolicy;
pub use status::{InvalidTransition, StatusEvent};
