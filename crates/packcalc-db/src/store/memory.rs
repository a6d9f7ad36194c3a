//! # In-Memory Store
//!
//! Process-local catalog and log. Used when no database path is configured
//! and throughout the service tests.
//!
//! Everything is lost on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CalculationLog, CatalogStore};
use crate::error::DbResult;
use packcalc_core::validation::normalize_catalog;
use packcalc_core::{CalculationRecord, PackSolution};

/// `CatalogStore` + `CalculationLog` backed by two `RwLock`s.
///
/// Readers get copies; nothing handed out aliases the stored state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    packs: RwLock<Vec<i64>>,
    /// Oldest first.
    calculations: RwLock<Vec<CalculationRecord>>,
}

impl MemoryStore {
    /// Creates a store with an empty catalog and empty log.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Creates a store pre-loaded with a (validated) catalog.
    pub fn with_catalog(packs: &[i64]) -> DbResult<Self> {
        let sizes = normalize_catalog(packs)?;
        Ok(MemoryStore {
            packs: RwLock::new(sizes),
            calculations: RwLock::new(Vec::new()),
        })
    }

    /// The most recently appended record, if any.
    pub async fn last_calculation(&self) -> Option<CalculationRecord> {
        self.calculations.read().await.last().cloned()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn read_catalog(&self) -> DbResult<Vec<i64>> {
        Ok(self.packs.read().await.clone())
    }

    async fn replace_catalog(&self, packs: &[i64]) -> DbResult<Vec<i64>> {
        let sizes = normalize_catalog(packs)?;
        debug!(sizes = ?sizes, "Replacing in-memory catalog");

        *self.packs.write().await = sizes.clone();
        Ok(sizes)
    }
}

#[async_trait]
impl CalculationLog for MemoryStore {
    async fn append(&self, items: i64, solution: &PackSolution) -> DbResult<CalculationRecord> {
        let record = CalculationRecord::new(items, solution);
        self.calculations.write().await.push(record.clone());
        Ok(record)
    }

    async fn recent(&self, limit: u32) -> DbResult<Vec<CalculationRecord>> {
        let log = self.calculations.read().await;
        Ok(log.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn find(&self, id: &str) -> DbResult<Option<CalculationRecord>> {
        let log = self.calculations.read().await;
        Ok(log.iter().find(|record| record.id == id).cloned())
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.calculations.read().await.len() as i64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
