//! # Submission Status Transitions
//!
//! ```text
//!            Sent                 Sent
//!   pending ─────▶ synced ◀────────────── failed
//!      │                                   ▲  │
//!      └────────── SendFailed ─────────────┘  │
//!      ▲                                      │
//!      └──────────────── Requeued ────────────┘
//! ```
//!
//! `synced` is terminal. A failed record may fail again on a later pass.

use crate::shared::feedback::SubmissionStatus;
use std::fmt;
use thiserror::Error;

/// Something that happened to a record's delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// The endpoint accepted the record
    Sent,
    /// Delivery failed (network, HTTP status or `success: false`)
    SendFailed,
    /// Put back in line for the next attempt
    Requeued,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Sent => write!(f, "sent"),
            StatusEvent::SendFailed => write!(f, "send failed"),
            StatusEvent::Requeued => write!(f, "requeued"),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot apply '{event}' to a {from} record")]
pub struct InvalidTransition {
    pub from: SubmissionStatus,
    pub event: StatusEvent,
}

impl SubmissionStatus {
    /// Next status after `event`, or an error leaving `self` untouched
    pub fn apply(self, event: StatusEvent) -> Result<SubmissionStatus, InvalidTransition> {
        use StatusEvent::*;
        use SubmissionStatus::*;

        if self.is_terminal() {
            return Err(InvalidTransition { from: self, event });
        }
        match (self, event) {
            (Pending, Sent) | (Failed, Sent) => Ok(Synced),
            (Pending, SendFailed) | (Failed, SendFailed) => Ok(Failed),
            (Pending, Requeued) | (Failed, Requeued) => Ok(Pending),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }

    /// Whether a sync pass should attempt delivery
    pub fn is_sync_candidate(&self) -> bool {
        !self.is_terminal()
    }
}
