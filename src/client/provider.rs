//! # Feedback Provider
//!
//! The object a UI layer talks to. It owns the in-memory feedback list, the
//! modal state and the last error, and routes submissions and votes through
//! the API, the pending store and the sync service.
//!
//! ## Submission flow
//!
//! - **Invalid input**: rejected before a record exists
//! - **Online**: sent right away. On failure the record is kept as `pending`
//!   in storage when offline support is on, or dropped with an error when off
//! - **Offline**: stored as `pending` and sent by the next sync pass
//!
//! ## Usage
//!
//! ```rust,no_run
//! use feedkit::client::provider::FeedbackProvider;
//! use feedkit::shared::{FeedbackConfig, FeedbackExtra, FeedbackType};
//!
//! # async fn example() -> feedkit::shared::Result<()> {
//! let config = FeedbackConfig::builder()
//!     .endpoint("https://example.com/api/feedback")
//!     .build()?;
//! let provider = FeedbackProvider::builder(config).build()?;
//!
//! provider.open_modal().await;
//! provider
//!     .submit_feedback("The export button is hidden", FeedbackType::Bug, FeedbackExtra::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::client::api::{FeedbackApi, HttpFeedbackApi};
use crate::client::config::Config;
use crate::client::local_db::{KeyValueStore, MemoryStore, PendingStore, PendingVote, RecordPatch};
use crate::client::notifier::Notifier;
use crate::client::offline::{OptimisticManager, RetryPolicy, StatusEvent, VoteOutcome};
use crate::client::sync::{AutoSync, NetworkMonitor, SyncReport, SyncService};
use crate::integrations::IntegrationHub;
use crate::shared::error::{FeedbackError, Result};
use crate::shared::feedback::{FeedbackExtra, FeedbackRecord, FeedbackType};
use crate::shared::notification::Notification;
use crate::shared::validation::validate_submission;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

#[derive(Debug, Default)]
struct UiState {
    is_open: bool,
    /// Submissions in flight
    submitting: usize,
    error: Option<String>,
}

/// Builder for [`FeedbackProvider`]
pub struct FeedbackProviderBuilder {
    config: Config,
    store: Option<Arc<dyn KeyValueStore>>,
    api: Option<Arc<dyn FeedbackApi>>,
    monitor: Option<NetworkMonitor>,
    integrations: Option<IntegrationHub>,
    auto_sync: bool,
}

impl FeedbackProviderBuilder {
    /// Storage backend. Defaults to an in-memory store.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// API client. Defaults to HTTP when an endpoint is configured.
    pub fn api(mut self, api: Arc<dyn FeedbackApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn monitor(mut self, monitor: NetworkMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Integrations to use instead of the configured ones
    pub fn integrations(mut self, integrations: IntegrationHub) -> Self {
        self.integrations = Some(integrations);
        self
    }

    /// Sync automatically on reconnect (default on)
    pub fn auto_sync(mut self, enabled: bool) -> Self {
        self.auto_sync = enabled;
        self
    }

    /// Build the provider
    ///
    /// Records persisted by an earlier session are not loaded; call
    /// [`FeedbackProvider::restore_pending`] or use
    /// [`build_restored`](Self::build_restored).
    pub fn build(self) -> Result<FeedbackProvider> {
        let config = self.config;
        let store = PendingStore::new(
            self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            config.feedback(),
        );
        let api = match self.api {
            Some(api) => Some(api),
            None if config.endpoint().is_some() => {
                Some(Arc::new(HttpFeedbackApi::new(config.clone())?) as Arc<dyn FeedbackApi>)
            }
            None => None,
        };
        let monitor = self.monitor.unwrap_or_default();
        let notifier = Notifier::new();
        let records = Arc::new(RwLock::new(Vec::new()));
        let integrations = Arc::new(
            self.integrations
                .unwrap_or_else(|| IntegrationHub::from_configs(&config.feedback().integrations)),
        );

        let sync = SyncService::new(
            store.clone(),
            api.clone(),
            monitor.clone(),
            notifier.clone(),
            records.clone(),
        )
        .with_retry_policy(RetryPolicy::from_config(config.feedback()))
        .with_integrations(integrations.clone());

        let auto_sync = if self.auto_sync && tokio::runtime::Handle::try_current().is_ok() {
            Some(AutoSync::spawn(sync.clone(), &monitor))
        } else {
            if self.auto_sync {
                tracing::warn!("No tokio runtime, automatic sync on reconnect is disabled");
            }
            None
        };

        Ok(FeedbackProvider {
            config,
            store,
            api,
            monitor,
            notifier,
            optimistic: OptimisticManager::new(),
            records,
            state: RwLock::new(UiState::default()),
            sync,
            integrations,
            _auto_sync: auto_sync,
        })
    }

    /// Build the provider and load persisted records into memory
    pub async fn build_restored(self) -> Result<FeedbackProvider> {
        let provider = self.build()?;
        provider.restore_pending().await;
        Ok(provider)
    }
}

/// Feedback state and actions exposed to the UI
pub struct FeedbackProvider {
    config: Config,
    store: PendingStore,
    api: Option<Arc<dyn FeedbackApi>>,
    monitor: NetworkMonitor,
    notifier: Notifier,
    optimistic: OptimisticManager,
    records: Arc<RwLock<Vec<FeedbackRecord>>>,
    state: RwLock<UiState>,
    sync: SyncService,
    integrations: Arc<IntegrationHub>,
    _auto_sync: Option<AutoSync>,
}

impl FeedbackProvider {
    pub fn builder(config: impl Into<Config>) -> FeedbackProviderBuilder {
        FeedbackProviderBuilder {
            config: config.into(),
            store: None,
            api: None,
            monitor: None,
            integrations: None,
            auto_sync: true,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn monitor(&self) -> &NetworkMonitor {
        &self.monitor
    }

    pub fn pending_store(&self) -> &PendingStore {
        &self.store
    }

    // ========== Modal and UI state ==========

    pub async fn open_modal(&self) {
        let mut state = self.state.write().await;
        state.is_open = true;
        state.error = None;
    }

    pub async fn close_modal(&self) {
        self.state.write().await.is_open = false;
    }

    pub async fn is_open(&self) -> bool {
        self.state.read().await.is_open
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.read().await.submitting > 0
    }

    /// Last user-facing error
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub fn is_offline(&self) -> bool {
        self.monitor.is_offline()
    }

    /// Snapshot of the in-memory feedback list
    pub async fn feedbacks(&self) -> Vec<FeedbackRecord> {
        self.records.read().await.clone()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    async fn fail(&self, error: FeedbackError) -> FeedbackError {
        let message = error.user_message();
        self.state.write().await.error = Some(message.clone());
        self.notifier.error(message);
        error
    }

    // ========== Submissions ==========

    /// Submit new feedback
    ///
    /// Returns the record as it stands after the attempt: `synced` if the
    /// endpoint accepted it, `pending` if it was queued.
    pub async fn submit_feedback(
        &self,
        message: &str,
        feedback_type: FeedbackType,
        extra: FeedbackExtra,
    ) -> Result<FeedbackRecord> {
        if let Err(e) = validate_submission(message, &extra.attachments, self.config.feedback()) {
            return Err(self.fail(e.into()).await);
        }

        {
            let mut state = self.state.write().await;
            state.submitting += 1;
            state.error = None;
        }
        let result = self.deliver_new(message, feedback_type, extra).await;
        self.state.write().await.submitting -= 1;

        match result {
            Ok(record) => {
                self.close_modal().await;
                Ok(record)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    async fn deliver_new(
        &self,
        message: &str,
        feedback_type: FeedbackType,
        extra: FeedbackExtra,
    ) -> Result<FeedbackRecord> {
        let offline_support = self.config.feedback().offline_support;
        let offline = self.monitor.is_offline();

        if offline && !offline_support {
            return Err(FeedbackError::network("offline and offline support is disabled"));
        }
        if self.api.is_none() && !offline_support {
            return Err(crate::shared::config::ConfigError::MissingValue("endpoint").into());
        }

        let mut record = FeedbackRecord::new(message, feedback_type, extra);
        self.records.write().await.push(record.clone());
        tracing::debug!("Created feedback {}", record.id);

        let api = match self.api.as_ref() {
            Some(api) if !offline => api,
            _ => {
                self.store.save(&record).await;
                if offline {
                    self.notifier
                        .info("You're offline. Your feedback was saved and will be sent when you reconnect.");
                } else {
                    self.notifier.info("Your feedback was saved on this device.");
                }
                return Ok(record);
            }
        };

        match api.submit(&record).await {
            Ok(()) => {
                let status = record
                    .submission_status
                    .apply(StatusEvent::Sent)
                    .map_err(|e| FeedbackError::storage(e.to_string()))?;
                record.submission_status = status;
                self.set_memory_status(&record).await;
                self.notifier.success("Thank you for your feedback!");
                self.integrations.spawn_dispatch(record.clone());
                Ok(record)
            }
            Err(e) if offline_support && e.is_delivery_failure() => {
                tracing::info!("Feedback {} not delivered, queued for retry: {}", record.id, e);
                record.last_error = Some(e.to_string());
                self.store.save(&record).await;
                self.set_memory_status(&record).await;
                self.notifier
                    .info("We couldn't reach the server. Your feedback was saved and will be retried.");
                Ok(record)
            }
            Err(e) => {
                self.records.write().await.retain(|r| r.id != record.id);
                Err(e)
            }
        }
    }

    async fn set_memory_status(&self, record: &FeedbackRecord) {
        let mut records = self.records.write().await;
        if let Some(existing) = records.iter_mut().find(|r| r.id == record.id) {
            existing.submission_status = record.submission_status;
            existing.last_error = record.last_error.clone();
        }
    }

    // ========== Votes ==========

    /// Vote for a feedback entry as the local voter
    ///
    /// The vote shows up immediately. If the endpoint refuses it, it is
    /// rolled back and the error is returned. A vote on a record that has
    /// not been delivered yet is stored on that record and goes out with it.
    pub async fn vote_feedback(&self, feedback_id: &str) -> Result<VoteOutcome> {
        let voter_id = self.store.voter_id().await;

        let (outcome, voters) = {
            let mut records = self.records.write().await;
            let outcome = self
                .optimistic
                .apply_vote(&mut records, feedback_id, &voter_id)
                .await;
            let voters = records
                .iter()
                .find(|r| r.id == feedback_id)
                .map(|r| r.voters.clone());
            (outcome, voters)
        };

        match outcome {
            VoteOutcome::NotFound => {
                let message = "That feedback could not be found.".to_string();
                self.state.write().await.error = Some(message.clone());
                self.notifier.error(message);
                return Ok(outcome);
            }
            VoteOutcome::AlreadyVoted => {
                self.notifier.info("You have already voted for this feedback.");
                return Ok(outcome);
            }
            VoteOutcome::Applied => {}
        }
        let offline = self.monitor.is_offline();

        // An undelivered record sends its voter list with it
        if self.persist_voters(feedback_id, voters).await {
            self.optimistic.confirm_vote(feedback_id, &voter_id).await;
            if offline {
                self.notifier
                    .info("You're offline. Your vote will be sent when you reconnect.");
            } else {
                self.notifier.success("Thanks for your vote!");
            }
            return Ok(outcome);
        }

        let api = match self.api.as_ref() {
            Some(api) if !offline => api,
            Some(_) if !self.config.feedback().offline_support => {
                self.revert_vote(feedback_id, &voter_id).await;
                return Err(self
                    .fail(FeedbackError::network("offline and offline support is disabled"))
                    .await);
            }
            Some(_) => {
                self.store
                    .enqueue_vote(PendingVote::new(feedback_id, voter_id.as_str()))
                    .await;
                self.optimistic.confirm_vote(feedback_id, &voter_id).await;
                self.notifier
                    .info("You're offline. Your vote will be sent when you reconnect.");
                return Ok(outcome);
            }
            None => {
                self.optimistic.confirm_vote(feedback_id, &voter_id).await;
                self.notifier.success("Thanks for your vote!");
                return Ok(outcome);
            }
        };

        match api.vote(feedback_id, &voter_id).await {
            Ok(()) => {
                self.optimistic.confirm_vote(feedback_id, &voter_id).await;
                self.notifier.success("Thanks for your vote!");
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!("Vote on {} rejected, rolling back: {}", feedback_id, e);
                self.revert_vote(feedback_id, &voter_id).await;
                Err(self.fail(e).await)
            }
        }
    }

    async fn revert_vote(&self, feedback_id: &str, voter_id: &str) {
        let voters = {
            let mut records = self.records.write().await;
            self.optimistic
                .rollback_vote(&mut records, feedback_id, voter_id)
                .await;
            records
                .iter()
                .find(|r| r.id == feedback_id)
                .map(|r| r.voters.clone())
        };
        self.persist_voters(feedback_id, voters).await;
    }

    /// Mirror the voter list into storage if the record is stored there
    ///
    /// Returns true if a stored record was updated.
    async fn persist_voters(&self, feedback_id: &str, voters: Option<Vec<String>>) -> bool {
        let Some(voters) = voters else {
            return false;
        };
        self.store
            .update(
                feedback_id,
                RecordPatch {
                    voters: Some(voters),
                    ..RecordPatch::default()
                },
            )
            .await
            .is_some()
    }

    // ========== Sync ==========

    /// Run a sync pass now
    pub async fn sync_pending(&self) -> SyncReport {
        self.sync.sync_pending().await
    }

    /// Load stored records into the in-memory list
    ///
    /// Records already in memory are left alone. Returns how many were added.
    pub async fn restore_pending(&self) -> usize {
        let stored = self.store.load_all().await;
        let mut records = self.records.write().await;
        let mut added = 0;
        for record in stored {
            if !records.iter().any(|r| r.id == record.id) {
                records.push(record);
                added += 1;
            }
        }
        if added > 0 {
            tracing::info!("Restored {} pending feedback item(s)", added);
        }
        added
    }
}
