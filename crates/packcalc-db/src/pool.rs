//! # SQLite Handle
//!
//! Opens the pack database, applies the embedded schema and hands out
//! repositories that share one pool.
//!
//! ```text
//! DbConfig ──► Database::new ──► SqlitePool (WAL, foreign keys)
//!                  │                 │
//!                  └─ migrations     ├─► CatalogRepository
//!                                    └─► CalculationRepository
//! ```
//!
//! A `:memory:` database lives exactly as long as its connection, so
//! [`DbConfig::in_memory`] pins a single connection that is never recycled.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::calculation::CalculationRepository;
use crate::repository::catalog::CatalogRepository;

/// Where the database lives and how big its pool is.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Pool ceiling. Default 5.
    pub max_connections: u32,

    /// Connections kept open while idle. Default 1.
    pub min_connections: u32,

    /// How long a request waits for a free connection.
    pub acquire_timeout: Duration,

    /// `None` keeps idle connections forever.
    pub idle_timeout: Option<Duration>,

    /// `None` never recycles a connection.
    pub max_lifetime: Option<Duration>,
}

impl DbConfig {
    /// File-backed database at `path`, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Private, throwaway database for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            max_lifetime: None,
        }
    }
}

/// Pooled, migrated SQLite database.
///
/// Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening pack database");

        let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Item rows cascade with their calculation
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;

        info!(max_connections = config.max_connections, "Pack database ready");
        Ok(Database { pool })
    }

    /// The raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn packs(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    pub fn calculations(&self) -> CalculationRepository {
        CalculationRepository::new(self.pool.clone())
    }

    /// Closes the pool. Later queries fail.
    pub async fn close(&self) {
        info!("Closing pack database");
        self.pool.close().await;
    }

    /// `true` when a query round-trips and every embedded migration is applied.
    pub async fn health_check(&self) -> bool {
        match migrations::migration_status(&self.pool).await {
            Ok((total, applied)) if applied >= total => true,
            Ok((total, applied)) => {
                warn!(total, applied, "Pack database schema is behind");
                false
            }
            Err(e) => {
                warn!(error = %e, "Pack database health check failed");
                false
            }
        }
    }
}
