//! # Repository Module
//!
//! SQLite repository implementations for Packcalc.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteStore (store::sqlite)                                           │
//! │       │                                                                 │
//! │       │  db.packs().list_sizes()                                       │
//! │       ▼                                                                 │
//! │  CatalogRepository             CalculationRepository                   │
//! │  ├── list_sizes()              ├── append(record)                      │
//! │  └── replace_all(sizes)        ├── recent(limit)                       │
//! │                                ├── get_by_id(id)                       │
//! │                                └── count()                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - Pack catalog reads and atomic replacement
//! - [`CalculationRepository`](calculation::CalculationRepository) - Calculation log append and listing

pub mod calculation;
pub mod catalog;
