//! # Network Monitor
//!
//! Tracks whether the feedback endpoint is reachable and tells interested
//! parties when that changes.
//!
//! ## Features
//!
//! - **Connectivity Detection**: synchronous `is_offline()` read
//! - **Callbacks**: `subscribe(on_online, on_offline)`, removed when the
//!   returned [`Subscription`] is unsubscribed or dropped
//! - **Async Updates**: `watch()` for tasks that await transitions
//! - **Probing**: `spawn_probe()` for runtimes without connectivity events
//!
//! A monitor created with [`NetworkMonitor::unsupported`] stands for a runtime
//! with no connectivity API. It always reports online and never fires.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Listener {
    on_online: Callback,
    on_offline: Callback,
}

struct Inner {
    supported: bool,
    status: watch::Sender<NetworkStatus>,
    listeners: Mutex<HashMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl Inner {
    fn listeners(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Listener>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Connectivity monitor
#[derive(Clone)]
pub struct NetworkMonitor {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NetworkMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkMonitor")
            .field("supported", &self.inner.supported)
            .field("status", &self.status())
            .finish()
    }
}

impl NetworkMonitor {
    pub fn new(online: bool) -> Self {
        Self::build(true, online)
    }

    /// Monitor for a runtime that reports no connectivity
    pub fn unsupported() -> Self {
        Self::build(false, true)
    }

    fn build(supported: bool, online: bool) -> Self {
        let status = if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        };
        let (tx, _) = watch::channel(status);
        Self {
            inner: Arc::new(Inner {
                supported,
                status: tx,
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.inner.supported
    }

    pub fn status(&self) -> NetworkStatus {
        *self.inner.status.borrow()
    }

    pub fn is_offline(&self) -> bool {
        self.status() == NetworkStatus::Offline
    }

    /// Report a connectivity change
    ///
    /// Listeners run only when the status actually changes. Ignored on an
    /// unsupported monitor.
    pub fn set_online(&self, online: bool) {
        if !self.inner.supported {
            return;
        }
        let next = if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        };
        let changed = self.inner.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if !changed {
            return;
        }

        tracing::info!("Network status changed to {:?}", next);

        // run callbacks outside the lock so they may subscribe or unsubscribe
        let callbacks: Vec<Callback> = self
            .inner
            .listeners()
            .values()
            .map(|l| match next {
                NetworkStatus::Online => l.on_online.clone(),
                NetworkStatus::Offline => l.on_offline.clone(),
            })
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Register callbacks for online and offline transitions
    pub fn subscribe<F, G>(&self, on_online: F, on_offline: G) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
        G: Fn() + Send + Sync + 'static,
    {
        if !self.inner.supported {
            return Subscription { id: 0, monitor: Weak::new() };
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners().insert(
            id,
            Listener {
                on_online: Arc::new(on_online),
                on_offline: Arc::new(on_offline),
            },
        );
        Subscription {
            id,
            monitor: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners().len()
    }

    /// Receiver that observes every status change
    pub fn watch(&self) -> watch::Receiver<NetworkStatus> {
        self.inner.status.subscribe()
    }

    /// Poll `url` with `HEAD` requests and report reachability
    ///
    /// Any HTTP response counts as online; a transport error counts as
    /// offline. The task ends when every clone of the monitor is dropped.
    pub fn spawn_probe(&self, url: impl Into<String>, interval: Duration) -> JoinHandle<()> {
        let url = url.into();
        let monitor = Arc::downgrade(&self.inner);
        let client = reqwest::Client::builder()
            .timeout(interval.min(Duration::from_secs(10)))
            .build()
            .unwrap_or_default();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let reachable = client.head(&url).send().await.is_ok();
                let Some(inner) = monitor.upgrade() else {
                    break;
                };
                NetworkMonitor { inner }.set_online(reachable);
            }
            tracing::debug!("Connectivity probe for {} stopped", url);
        })
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Handle returned by [`NetworkMonitor::subscribe`]
///
/// Dropping it removes both callbacks.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    monitor: Weak<Inner>,
}

impl Subscription {
    /// Remove both callbacks
    pub fn unsubscribe(self) {}

    fn detach(&mut self) {
        if let Some(inner) = self.monitor.upgrade() {
            inner.listeners().remove(&self.id);
        }
        self.monitor = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
