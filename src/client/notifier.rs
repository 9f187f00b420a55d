//! Notification fan-out to the UI layer
//!
//! Built on a tokio broadcast channel. Emitting with no subscribers is fine;
//! the notification is only logged.

use crate::shared::notification::{Notification, NotificationLevel};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => tracing::info!("notify [error]: {}", notification.message),
            level => tracing::debug!("notify [{:?}]: {}", level, notification.message),
        }
        // no receivers is not an error
        let _ = self.tx.send(notification);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notification::info(message));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notification::success(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notification::error(message));
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
