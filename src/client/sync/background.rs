//! Automatic sync on reconnect
//!
//! Registers an online callback with the [`NetworkMonitor`]. Every
//! offline-to-online transition spawns exactly one sync pass on the runtime
//! that created the [`AutoSync`]. Dropping it unsubscribes.

use super::{NetworkMonitor, Subscription, SyncService};
use tokio::runtime::Handle;

pub struct AutoSync {
    subscription: Option<Subscription>,
}

impl AutoSync {
    /// Start syncing on every reconnect
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(service: SyncService, monitor: &NetworkMonitor) -> Self {
        let handle = Handle::current();
        let subscription = monitor.subscribe(
            move || {
                let service = service.clone();
                tracing::info!("Connection restored, starting sync pass");
                handle.spawn(async move {
                    service.sync_pending().await;
                });
            },
            || tracing::info!("Connection lost, new feedback will be queued"),
        );
        Self {
            subscription: Some(subscription),
        }
    }

    /// Stop reacting to reconnects
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            tracing::debug!("Auto-sync stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for AutoSync {
    fn drop(&mut self) {
        self.stop();
    }
}
