//! Persistence as seen by the lifecycle and the vote recorder.
//!
//! Writes are best-effort. When no database is configured, or it cannot be
//! reached at startup, the bot runs with [`DisabledStore`] and every write is
//! skipped.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::database::connection::{mask_url, DatabaseManager};
use crate::database::models::{PollRecord, VoteRecord};
use crate::error::BotError;
use crate::utils::logging::{log_database_error, log_database_operation};

/// Outcome of a successful store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreWrite {
    Written,
    /// Persistence is disabled, nothing was written
    Skipped,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Writes a finished poll. A poll is inserted once and never updated.
    async fn insert_poll(&self, record: &PollRecord) -> Result<StoreWrite, BotError>;

    /// Writes a vote, replacing any earlier vote with the same voter and poll.
    async fn upsert_vote(&self, vote: &VoteRecord) -> Result<StoreWrite, BotError>;

    /// Releases the underlying connection. Later writes fail.
    async fn close(&self);

    fn is_available(&self) -> bool;
}

/// SQLite-backed store, every row tagged with the configured namespace.
#[derive(Clone)]
pub struct SqliteStore {
    db: DatabaseManager,
    namespace: String,
}

impl SqliteStore {
    pub fn new(db: DatabaseManager, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.db.pool
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_poll(&self, record: &PollRecord) -> Result<StoreWrite, BotError> {
        let details = format!("poll {} ({})", record.poll_id, record.status.as_str());
        log_database_operation("INSERT", "polls", Some(&details));

        record
            .insert(&self.db.pool, &self.namespace)
            .await
            .map_err(|e| {
                log_database_error("INSERT", "polls", &e.to_string(), Some(&details));
                e
            })?;

        Ok(StoreWrite::Written)
    }

    async fn upsert_vote(&self, vote: &VoteRecord) -> Result<StoreWrite, BotError> {
        let details = format!("user {} poll {}", vote.user_id, vote.poll_id);
        log_database_operation("UPSERT", "votes", Some(&details));

        vote.upsert(&self.db.pool, &self.namespace).await.map_err(|e| {
            log_database_error("UPSERT", "votes", &e.to_string(), Some(&details));
            BotError::from(e)
        })?;

        Ok(StoreWrite::Written)
    }

    async fn close(&self) {
        self.db.close().await;
    }

    fn is_available(&self) -> bool {
        !self.db.pool.is_closed()
    }
}

/// No-persistence mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

#[async_trait]
impl RecordStore for DisabledStore {
    async fn insert_poll(&self, record: &PollRecord) -> Result<StoreWrite, BotError> {
        tracing::debug!("Persistence disabled, poll {} not stored", record.poll_id);
        Ok(StoreWrite::Skipped)
    }

    async fn upsert_vote(&self, vote: &VoteRecord) -> Result<StoreWrite, BotError> {
        tracing::debug!("Persistence disabled, vote by {} not stored", vote.user_id);
        Ok(StoreWrite::Skipped)
    }

    async fn close(&self) {}

    fn is_available(&self) -> bool {
        false
    }
}

/// Connects and migrates the configured database, falling back to [`DisabledStore`] on any failure.
pub async fn connect_store(config: &Config) -> Arc<dyn RecordStore> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
        return Arc::new(DisabledStore);
    };

    let db = match DatabaseManager::new(url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!("Failed to connect to {}: {}. Database features will be disabled.", mask_url(url), e);
            return Arc::new(DisabledStore);
        }
    };

    if let Err(e) = db.run_migrations().await {
        tracing::warn!("Failed to migrate {}: {}. Database features will be disabled.", mask_url(url), e);
        db.close().await;
        return Arc::new(DisabledStore);
    }

    tracing::info!(
        "Connected to database {} (namespace {})",
        mask_url(url),
        config.database_namespace
    );
    Arc::new(SqliteStore::new(db, config.database_namespace.clone()))
}
