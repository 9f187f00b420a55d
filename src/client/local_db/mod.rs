//! # Local Storage Module
//!
//! Key-value persistence for records that have not reached the endpoint yet.
//!
//! ## Architecture
//!
//! Storage is split in two layers:
//! - **Backends** (`KeyValueStore`): string values addressed by string keys.
//!   `LocalDatabase` keeps them in a SQLite file, `MemoryStore` in a map.
//! - **Pending store** (`PendingStore`): the feedback-aware adapter on top.
//!   It owns the key layout and swallows every backend failure.
//!
//! ## Key Components
//!
//! - `schema.rs`: SQL and schema versioning for the SQLite backend
//! - `pending.rs`: pending record list (save / load_all / remove / update)
//! - `identity.rs`: voter identity record
//! - `votes.rs`: votes cast while offline
//!
//! ## Usage
//!
//! ```rust,no_run
//! use feedkit::client::local_db::{LocalDatabase, PendingStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> feedkit::shared::Result<()> {
//! let db = LocalDatabase::new().await?;
//! let store = PendingStore::new(Arc::new(db), &Default::default());
//! let pending = store.load_all().await;
//! # Ok(())
//! # }
//! ```

pub mod schema;
pub mod pending;
pub mod identity;
pub mod votes;

pub use pending::{PendingStore, RecordPatch};
pub use votes::PendingVote;

use crate::shared::error::{FeedbackError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// String key-value backend
///
/// Every call is a suspension point. Implementations report failures; the
/// pending store decides what to do with them.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite-backed key-value store
///
/// Manages the SQLite connection pool. One row per key.
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open or create the database in the platform data directory
    pub async fn new() -> Result<Self> {
        Self::open(Self::get_db_path()).await
    }

    /// Open or create the database at `path`
    ///
    /// Uses WAL mode for better concurrency and performance.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| FeedbackError::storage(format!("{}: {}", parent.display(), e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::debug!("Opened local feedback store at {}", path.display());
        Ok(db)
    }

    /// Open a private in-memory database
    pub async fn in_memory() -> Result<Self> {
        // a single connection, otherwise each one gets its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Get database file path
    ///
    /// Uses the system's data directory when available.
    fn get_db_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("feedkit");
        path.push("feedback.db");
        path
    }

    /// Create tables and run any pending migrations
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(schema::CREATE_KV_STORE).execute(&self.pool).await?;
        sqlx::query(schema::CREATE_SCHEMA_MIGRATIONS)
            .execute(&self.pool)
            .await?;

        let current_version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        if !schema::needs_migration(current_version.0) {
            return Ok(());
        }
        tracing::info!(
            "Migrating local database from v{} to v{}",
            current_version.0,
            schema::CURRENT_SCHEMA_VERSION
        );
        for version in schema::get_pending_migrations(current_version.0) {
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(version)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for LocalDatabase {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(value)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-process key-value store
///
/// An optional byte quota per value mimics browser storage limits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            if value.len() > quota {
                return Err(FeedbackError::storage(format!(
                    "quota exceeded: {} bytes for '{}', limit {}",
                    value.len(),
                    key,
                    quota
                )));
            }
        }
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
