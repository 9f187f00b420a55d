//! Client Module
//!
//! Everything that performs I/O on behalf of the UI: the endpoint client,
//! local storage, connectivity tracking, sync and the provider that ties them
//! together.
//!
//! # Architecture
//!
//! - **`config`** - Configuration wrapper with environment overrides
//! - **`api`** - HTTP client for the feedback endpoint
//! - **`local_db`** - Key-value backends and the pending record store
//! - **`offline`** - Status transitions, retry policy, optimistic votes
//! - **`sync`** - Connectivity monitor, sync passes, auto-sync on reconnect
//! - **`notifier`** - Notification channel to the UI
//! - **`provider`** - The boundary the UI layer consumes
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs        - Module exports and documentation
//! ├── config.rs     - Configuration management
//! ├── api.rs        - Endpoint client
//! ├── notifier.rs   - Notifications
//! ├── provider.rs   - FeedbackProvider
//! ├── local_db/     - Storage
//! ├── offline/      - Offline rules
//! └── sync/         - Sync orchestration
//! ```

pub mod config;
pub mod api;
pub mod local_db;
pub mod offline;
pub mod sync;
pub mod notifier;
pub mod provider;

// Re-export commonly used types
pub use api::{FeedbackApi, HttpFeedbackApi};
pub use config::Config;
pub use local_db::{KeyValueStore, LocalDatabase, MemoryStore, PendingStore};
pub use notifier::Notifier;
pub use offline::VoteOutcome;
pub use provider::{FeedbackProvider, FeedbackProviderBuilder};
pub use sync::{NetworkMonitor, NetworkStatus, SyncReport, SyncService};
