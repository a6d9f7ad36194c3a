//! # Pack Service
//!
//! Glue between HTTP handlers, the optimizer and the store.
//!
//! ## Calculate Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate(items)                                                      │
//! │       │                                                                 │
//! │       ├── store.read_catalog()                                         │
//! │       │                                                                 │
//! │       ├── optimizer.check()        ← validation + search ceiling       │
//! │       │                              (nothing allocated yet)           │
//! │       ▼                                                                 │
//! │  spawn_blocking(optimize) ──── timeout(deadline) ──► Timeout           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.append(items, solution)     ← failure is returned, not ignored  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CalculationRecord                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A run that misses its deadline keeps its blocking thread until it
//! finishes; its result is dropped and nothing is logged for it.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use packcalc_core::validation::{validate_page_limit, validate_target};
use packcalc_core::{CalculationRecord, CoreError, PackOptimizer, PackSolution};
use packcalc_db::{CalculationLog, CatalogStore, DbError, PackStore};

/// Largest page `history` will return.
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Page size when the caller does not ask for one.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

// =============================================================================
// Errors
// =============================================================================

/// Everything that can go wrong inside the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Optimizer or input validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Catalog store or calculation log failure.
    #[error(transparent)]
    Store(#[from] DbError),

    /// The optimizer missed its deadline.
    #[error("Calculation exceeded the {timeout_ms} ms deadline")]
    Timeout { timeout_ms: u64 },

    /// The blocking worker panicked or was cancelled.
    #[error("Calculation worker failed: {0}")]
    Worker(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Service
// =============================================================================

/// Pack calculation service.
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct PackService {
    store: Arc<dyn PackStore>,
    optimizer: PackOptimizer,
    timeout: Option<Duration>,
}

impl PackService {
    /// Creates a service with no search ceiling and no deadline.
    pub fn new(store: Arc<dyn PackStore>) -> Self {
        PackService {
            store,
            optimizer: PackOptimizer::new(),
            timeout: None,
        }
    }

    /// Rejects targets whose search window exceeds `ceiling`.
    pub fn with_max_search_limit(mut self, ceiling: usize) -> Self {
        self.optimizer = self.optimizer.max_search_limit(ceiling);
        self
    }

    /// Bounds each optimizer run. `None` disables the deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The store behind this service.
    pub fn store(&self) -> &Arc<dyn PackStore> {
        &self.store
    }

    /// Whether the store can serve requests.
    pub async fn is_healthy(&self) -> bool {
        self.store.is_healthy().await
    }

    /// Current catalog, ascending.
    pub async fn get_packs(&self) -> ServiceResult<Vec<i64>> {
        Ok(self.store.read_catalog().await?)
    }

    /// Validates, normalizes and installs a new catalog.
    pub async fn set_packs(&self, packs: &[i64]) -> ServiceResult<Vec<i64>> {
        let stored = self.store.replace_catalog(packs).await?;
        info!(packs = ?stored, "Pack catalog replaced");
        Ok(stored)
    }

    /// Solves `items` against the stored catalog and logs the result.
    pub async fn calculate(&self, items: i64) -> ServiceResult<CalculationRecord> {
        validate_target(items).map_err(CoreError::from)?;

        let packs = self.store.read_catalog().await?;
        self.calculate_with(items, &packs).await
    }

    /// Solves `items` against an explicit catalog and logs the result.
    pub async fn calculate_with(&self, items: i64, packs: &[i64]) -> ServiceResult<CalculationRecord> {
        let limit = self.optimizer.check(items, packs)?;
        debug!(items, limit, "Calculation accepted");

        let solution = self.run_optimizer(items, packs.to_vec()).await?;
        let record = self.store.append(items, &solution).await?;

        info!(
            id = %record.id,
            items,
            total_items = record.total_items,
            pack_count = record.pack_count,
            "Calculation recorded"
        );
        Ok(record)
    }

    /// Most recent calculations first. `None` means the default page size.
    pub async fn history(&self, limit: Option<u32>) -> ServiceResult<Vec<CalculationRecord>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        validate_page_limit(limit, MAX_HISTORY_LIMIT).map_err(CoreError::from)?;

        Ok(self.store.recent(limit).await?)
    }

    /// One logged calculation by id.
    pub async fn calculation(&self, id: &str) -> ServiceResult<CalculationRecord> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Calculation", id).into())
    }

    async fn run_optimizer(&self, items: i64, packs: Vec<i64>) -> ServiceResult<PackSolution> {
        let optimizer = self.optimizer;
        let task = tokio::task::spawn_blocking(move || optimizer.optimize(items, &packs));

        let joined = match self.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    let timeout_ms = deadline.as_millis() as u64;
                    warn!(items, timeout_ms, "Calculation timed out");
                    return Err(ServiceError::Timeout { timeout_ms });
                }
            },
            None => task.await,
        };

        let solution = joined.map_err(|e| ServiceError::Worker(e.to_string()))??;
        Ok(solution)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
