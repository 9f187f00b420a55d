//! Provider and store fixtures

use feedkit::client::{FeedbackProvider, KeyValueStore, MemoryStore, NetworkMonitor, PendingStore};
use feedkit::shared::{FeedbackConfig, FeedbackExtra, FeedbackRecord, FeedbackType};
use std::sync::Arc;

/// A provider wired to an in-memory store the test can inspect
pub struct TestProvider {
    pub provider: FeedbackProvider,
    pub store: PendingStore,
    pub monitor: NetworkMonitor,
}

impl TestProvider {
    /// Provider against `endpoint` with offline support on
    pub fn new(endpoint: Option<String>, online: bool) -> Self {
        let mut builder = FeedbackConfig::builder();
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint(endpoint);
        }
        Self::with_config(builder.build().unwrap(), online)
    }

    pub fn with_config(config: FeedbackConfig, online: bool) -> Self {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let store = PendingStore::new(backend.clone(), &config);
        let monitor = NetworkMonitor::new(online);
        let provider = FeedbackProvider::builder(config)
            .store(backend)
            .monitor(monitor.clone())
            .auto_sync(false)
            .build()
            .unwrap();
        Self {
            provider,
            store,
            monitor,
        }
    }
}

pub fn new_record(message: &str) -> FeedbackRecord {
    FeedbackRecord::new(message, FeedbackType::Bug, FeedbackExtra::default())
}
