//! # Sync Service
//!
//! Delivers feedback that was queued while offline, or whose first delivery
//! failed, once the endpoint is reachable again.
//!
//! ## Sync pass
//!
//! 1. Skip entirely when offline or when no API is configured
//! 2. Load the stored records and pick `pending` and `failed` ones that are
//!    still under the retry cap
//! 3. Send them one at a time, in stored order
//! 4. On success mark `synced`, drop from storage, hand off to integrations
//!    in the background
//! 5. On failure mark `failed`, bump `syncAttempts`, keep in storage
//! 6. Replay votes cast while offline
//!
//! One info notification goes out before the records are sent and one
//! success notification after, whatever the individual outcomes were.
//!
//! Concurrent passes are not serialized. Two passes started back to back both
//! work on whatever the store holds when they read it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use feedkit::client::sync::SyncService;
//!
//! # async fn example(service: SyncService) {
//! let report = service.sync_pending().await;
//! println!("{} of {} synced", report.synced, report.attempted);
//! # }
//! ```

pub mod background;
pub mod network_monitor;
pub mod sync_state;

pub use background::AutoSync;
pub use network_monitor::{NetworkMonitor, NetworkStatus, Subscription};
pub use sync_state::SyncReport;

use crate::client::api::FeedbackApi;
use crate::client::local_db::{PendingStore, RecordPatch};
use crate::client::notifier::Notifier;
use crate::client::offline::{RetryPolicy, StatusEvent};
use crate::integrations::IntegrationHub;
use crate::shared::feedback::{FeedbackRecord, SubmissionStatus};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Runs sync passes over the pending store
#[derive(Clone)]
pub struct SyncService {
    store: PendingStore,
    api: Option<Arc<dyn FeedbackApi>>,
    monitor: NetworkMonitor,
    retry: RetryPolicy,
    notifier: Notifier,
    records: Arc<RwLock<Vec<FeedbackRecord>>>,
    integrations: Arc<IntegrationHub>,
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("store", &self.store)
            .field("has_api", &self.api.is_some())
            .field("monitor", &self.monitor)
            .field("retry", &self.retry)
            .finish()
    }
}

impl SyncService {
    /// Create a sync service
    ///
    /// `records` is the in-memory list shown to the user. Passes update the
    /// entries in it that share an id with a synced or failed record.
    pub fn new(
        store: PendingStore,
        api: Option<Arc<dyn FeedbackApi>>,
        monitor: NetworkMonitor,
        notifier: Notifier,
        records: Arc<RwLock<Vec<FeedbackRecord>>>,
    ) -> Self {
        Self {
            store,
            api,
            monitor,
            retry: RetryPolicy::default(),
            notifier,
            records,
            integrations: Arc::new(IntegrationHub::new()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_integrations(mut self, integrations: Arc<IntegrationHub>) -> Self {
        self.integrations = integrations;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Run one sync pass
    pub async fn sync_pending(&self) -> SyncReport {
        let mut report = SyncReport::default();

        if self.monitor.is_offline() {
            tracing::debug!("Offline, skipping sync pass");
            return report;
        }
        let Some(api) = self.api.as_ref() else {
            tracing::debug!("No endpoint configured, skipping sync pass");
            return report;
        };

        let (eligible, parked): (Vec<_>, Vec<_>) = self
            .store
            .load_all()
            .await
            .into_iter()
            .filter(|r| r.submission_status.is_sync_candidate())
            .partition(|r| self.retry.is_eligible(r));

        report.skipped = parked.len();
        for record in &parked {
            tracing::warn!(
                "Feedback {} reached the retry limit after {} attempts, leaving it in storage",
                record.id,
                record.sync_attempts
            );
        }

        if !eligible.is_empty() {
            tracing::info!("Syncing {} pending feedback item(s)", eligible.len());
            self.notifier
                .info(format!("Syncing {} pending feedback item(s)...", eligible.len()));

            for record in eligible {
                report.attempted += 1;
                if self.sync_record(api.as_ref(), record).await {
                    report.synced += 1;
                } else {
                    report.failed += 1;
                }
            }
        }

        self.replay_votes(api.as_ref(), &mut report).await;

        if report.attempted > 0 {
            self.notifier.success(format!(
                "Sync complete: {} of {} feedback item(s) sent",
                report.synced, report.attempted
            ));
        }

        report.finished_at = Some(Utc::now());
        tracing::info!(
            "Sync pass finished: attempted={} synced={} failed={} skipped={} votes={}",
            report.attempted,
            report.synced,
            report.failed,
            report.skipped,
            report.votes_replayed
        );
        report
    }

    /// Deliver one stored record. Returns true if the endpoint accepted it.
    async fn sync_record(&self, api: &dyn FeedbackApi, mut record: FeedbackRecord) -> bool {
        if record.submission_status == SubmissionStatus::Failed {
            match record.submission_status.apply(StatusEvent::Requeued) {
                Ok(status) => record.submission_status = status,
                Err(e) => {
                    tracing::warn!("Feedback {}: {}", record.id, e);
                    return false;
                }
            }
        }

        tracing::debug!("Sending feedback {} (attempt {})", record.id, record.sync_attempts + 1);

        match api.submit(&record).await {
            Ok(()) => {
                let Ok(status) = record.submission_status.apply(StatusEvent::Sent) else {
                    return false;
                };
                record.submission_status = status;
                record.last_error = None;
                self.store.remove(&record.id).await;
                self.update_memory(&record.id, |r| {
                    r.submission_status = status;
                    r.last_error = None;
                })
                .await;
                tracing::debug!("Feedback {} synced", record.id);

                self.integrations.spawn_dispatch(record);
                true
            }
            Err(e) => {
                let status = record
                    .submission_status
                    .apply(StatusEvent::SendFailed)
                    .unwrap_or(SubmissionStatus::Failed);
                let attempts = record.sync_attempts + 1;
                let message = e.to_string();
                record.sync_attempts = attempts;
                match self.retry.remaining(&record) {
                    Some(0) => tracing::warn!(
                        "Feedback {} failed to sync and reached the retry limit: {}",
                        record.id,
                        message
                    ),
                    Some(left) => tracing::debug!(
                        "Feedback {} failed to sync, {} attempt(s) left: {}",
                        record.id,
                        left,
                        message
                    ),
                    None => tracing::debug!("Feedback {} failed to sync: {}", record.id, message),
                }

                self.store
                    .update(
                        &record.id,
                        RecordPatch {
                            submission_status: Some(status),
                            sync_attempts: Some(attempts),
                            last_error: Some(Some(message.clone())),
                            voters: None,
                        },
                    )
                    .await;
                self.update_memory(&record.id, |r| {
                    r.submission_status = status;
                    r.sync_attempts = attempts;
                    r.last_error = Some(message);
                })
                .await;
                false
            }
        }
    }

    async fn replay_votes(&self, api: &dyn FeedbackApi, report: &mut SyncReport) {
        for vote in self.store.pending_votes().await {
            match api.vote(&vote.feedback_id, &vote.voter_id).await {
                Ok(()) => {
                    self.store.remove_vote(&vote.feedback_id, &vote.voter_id).await;
                    report.votes_replayed += 1;
                }
                Err(e) => {
                    tracing::warn!("Queued vote on {} not delivered: {}", vote.feedback_id, e);
                    report.votes_failed += 1;
                }
            }
        }
    }

    async fn update_memory(&self, id: &str, apply: impl FnOnce(&mut FeedbackRecord)) {
        let mut records = self.records.write().await;
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            apply(record);
        }
    }
}
