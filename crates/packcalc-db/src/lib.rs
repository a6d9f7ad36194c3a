//! # packcalc-db: Storage Layer for Packcalc
//!
//! This crate owns the pack catalog and the calculation log.
//! It ships an in-memory backend and a SQLite backend (sqlx) behind the
//! same pair of traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Packcalc Data Flow                               │
//! │                                                                         │
//! │  PackService (packcalc-api)                                            │
//! │       │   Arc<dyn PackStore>                                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     packcalc-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    store      │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │               │    │               │    │  (embedded)  │  │   │
//! │  │   │ MemoryStore   │    │ CatalogRepo   │    │              │  │   │
//! │  │   │ SqliteStore ──┼───►│ Calculation-  │    │ 001_initial_ │  │   │
//! │  │   │               │    │   Repo        │    │  schema.sql  │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │  Database (pool.rs)           │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (DATABASE_PATH)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - `CatalogStore` / `CalculationLog` traits and both backends
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`repository`] - SQLite repositories (catalog, calculation)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use packcalc_db::{CatalogStore, DbConfig, SqliteStore};
//!
//! let store = SqliteStore::connect(DbConfig::new("packcalc.db")).await?;
//! store.replace_catalog(&[250, 500, 1000]).await?;
//! let packs = store.read_catalog().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::calculation::CalculationRepository;
pub use repository::catalog::CatalogRepository;
pub use store::{
    seed_catalog_if_empty, CalculationLog, CatalogStore, MemoryStore, PackStore, SqliteStore,
};
