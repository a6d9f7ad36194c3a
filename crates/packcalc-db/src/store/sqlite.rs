//! # SQLite Store
//!
//! Durable catalog and log on top of [`Database`] and its repositories.

use async_trait::async_trait;

use super::{CalculationLog, CatalogStore};
use crate::error::DbResult;
use crate::pool::{Database, DbConfig};
use packcalc_core::{CalculationRecord, PackSolution};

/// `CatalogStore` + `CalculationLog` persisted in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wraps an already-migrated database.
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    /// Opens (and migrates) a database from config.
    pub async fn connect(config: DbConfig) -> DbResult<Self> {
        Ok(SqliteStore::new(Database::new(config).await?))
    }

    /// Fresh, isolated in-memory database (for tests).
    pub async fn in_memory() -> DbResult<Self> {
        SqliteStore::connect(DbConfig::in_memory()).await
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn read_catalog(&self) -> DbResult<Vec<i64>> {
        self.db.packs().list_sizes().await
    }

    async fn replace_catalog(&self, packs: &[i64]) -> DbResult<Vec<i64>> {
        self.db.packs().replace_all(packs).await
    }

    async fn is_healthy(&self) -> bool {
        self.db.health_check().await
    }
}

#[async_trait]
impl CalculationLog for SqliteStore {
    async fn append(&self, items: i64, solution: &PackSolution) -> DbResult<CalculationRecord> {
        let record = CalculationRecord::new(items, solution);
        self.db.calculations().append(&record).await?;
        Ok(record)
    }

    async fn recent(&self, limit: u32) -> DbResult<Vec<CalculationRecord>> {
        self.db.calculations().recent(limit).await
    }

    async fn find(&self, id: &str) -> DbResult<Option<CalculationRecord>> {
        self.db.calculations().get_by_id(id).await
    }

    async fn count(&self) -> DbResult<i64> {
        self.db.calculations().count().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
