//! # Store Traits
//!
//! The two storage contracts the service depends on, plus their backends.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   CatalogStore                     CalculationLog                      │
//! │   ├── read_catalog()               ├── append(items, solution)         │
//! │   └── replace_catalog(sizes)       ├── recent(limit)                   │
//! │              │                     ├── find(id)                        │
//! │              │                     └── count()                         │
//! │              └───────────┬──────────────────┘                          │
//! │                          ▼                                              │
//! │                     PackStore  (blanket: both traits)                  │
//! │                          │                                              │
//! │            ┌─────────────┴─────────────┐                               │
//! │            ▼                           ▼                               │
//! │      MemoryStore                 SqliteStore                           │
//! │      (RwLock, no file)           (Database + repositories)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service holds an `Arc<dyn PackStore>` and never knows which backend
//! it is talking to.

use async_trait::async_trait;
use tracing::info;

use crate::error::DbResult;
use packcalc_core::{CalculationRecord, PackSolution};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Source of truth for the active pack catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Current catalog, ascending. May be empty.
    async fn read_catalog(&self) -> DbResult<Vec<i64>>;

    /// Validates, normalizes and atomically installs a new catalog.
    ///
    /// Returns the catalog as stored. On error the previous catalog stays.
    async fn replace_catalog(&self, packs: &[i64]) -> DbResult<Vec<i64>>;

    /// Whether the backing storage can serve requests.
    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Append-only audit log of successful calculations.
#[async_trait]
pub trait CalculationLog: Send + Sync {
    /// Records one solution for `items` requested items.
    async fn append(&self, items: i64, solution: &PackSolution) -> DbResult<CalculationRecord>;

    /// Most recent records first, at most `limit` of them.
    async fn recent(&self, limit: u32) -> DbResult<Vec<CalculationRecord>>;

    /// One record by id, if it exists.
    async fn find(&self, id: &str) -> DbResult<Option<CalculationRecord>>;

    /// Number of records in the log.
    async fn count(&self) -> DbResult<i64>;
}

/// Everything the service needs from storage.
pub trait PackStore: CatalogStore + CalculationLog {}

impl<T: CatalogStore + CalculationLog + ?Sized> PackStore for T {}

/// Installs `defaults` when the store has no catalog yet.
///
/// ## Returns
/// `true` if the defaults were written.
pub async fn seed_catalog_if_empty<S>(store: &S, defaults: &[i64]) -> DbResult<bool>
where
    S: CatalogStore + ?Sized,
{
    if !store.read_catalog().await?.is_empty() {
        return Ok(false);
    }

    let installed = store.replace_catalog(defaults).await?;
    info!(packs = ?installed, "Seeded empty pack catalog");
    Ok(true)
}

// =============================================================================
// Unit Tests
// =============================================================================
