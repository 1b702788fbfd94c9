use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::path::Path;
use tracing::info;

use crate::error::BotError;

/// Owns the SQLite pool that backs poll and vote records.
#[derive(Clone)]
pub struct DatabaseManager {
    pub pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(database_url: &str) -> Result<Self, BotError> {
        ensure_parent_dir(database_url)?;

        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating database {}", mask_url(database_url));
            Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), BotError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Waits for in-flight queries, then closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed");
    }
}

/// Path of the database file behind a `sqlite:` URL, if it names one.
pub fn sqlite_path(database_url: &str) -> Option<&str> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}

fn ensure_parent_dir(database_url: &str) -> Result<(), BotError> {
    let Some(parent) = sqlite_path(database_url).and_then(|p| Path::new(p).parent()) else {
        return Ok(());
    };

    if !parent.as_os_str().is_empty() && !parent.exists() {
        info!("Creating directory {}", parent.display());
        std::fs::create_dir_all(parent)
            .map_err(|e| BotError::Persistence(format!("cannot create {}: {e}", parent.display())))?;
    }

    Ok(())
}

/// Shows only the file name of a SQLite URL.
pub fn mask_url(url: &str) -> String {
    match sqlite_path(url).and_then(|p| Path::new(p).file_name()) {
        Some(filename) => format!("sqlite:.../{}", filename.to_string_lossy()),
        None => url.to_string(),
    }
}
