//! # Catalog Repository
//!
//! Database operations for the pack catalog.
//!
//! ## Replace, Never Patch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    replace_all([1000, 250, 500, 250])                   │
//! │                                                                         │
//! │  normalize ──► [250, 500, 1000]        (reject before any SQL)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  ├── DELETE FROM packs                                                 │
//! │  ├── INSERT 250                                                        │
//! │  ├── INSERT 500                                                        │
//! │  └── INSERT 1000                                                       │
//! │  COMMIT                  ← readers see the old or the new catalog,     │
//! │                            never a mix                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use packcalc_core::validation::normalize_catalog;

/// Repository for pack catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Lists every pack size, ascending.
    ///
    /// ## Errors
    /// `CorruptRecord` if a stored size is not positive (the table CHECK
    /// makes this unreachable unless the file was edited by hand).
    pub async fn list_sizes(&self) -> DbResult<Vec<i64>> {
        let sizes: Vec<i64> = sqlx::query_scalar("SELECT size FROM packs ORDER BY size ASC")
            .fetch_all(&self.pool)
            .await?;

        if let Some(&bad) = sizes.iter().find(|&&size| size <= 0) {
            return Err(DbError::corrupt("pack", format!("stored size {bad} is not positive")));
        }

        debug!(count = sizes.len(), "Loaded pack catalog");
        Ok(sizes)
    }

    /// Atomically replaces the whole catalog.
    ///
    /// The input is validated and normalized first; an invalid catalog is
    /// rejected with `InvalidCatalog` and storage is left untouched.
    ///
    /// ## Returns
    /// The catalog as stored (sorted, de-duplicated).
    pub async fn replace_all(&self, packs: &[i64]) -> DbResult<Vec<i64>> {
        let sizes = normalize_catalog(packs)?;
        let now = Utc::now();

        debug!(sizes = ?sizes, "Replacing pack catalog");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM packs").execute(&mut *tx).await?;

        for &size in &sizes {
            sqlx::query("INSERT INTO packs (size, created_at) VALUES (?1, ?2)")
                .bind(size)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(sizes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
