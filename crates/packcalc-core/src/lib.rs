//! # packcalc-core: Pure Pack Optimization for Packcalc
//!
//! This crate is the **heart** of Packcalc. It decides which packs to ship
//! for an order, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Packcalc Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP clients                                 │   │
//! │  │    GET /packs ──► POST /calculate ──► GET /calculations        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    packcalc-api (axum)                          │   │
//! │  │    routes, PackService, timeouts, error mapping                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ packcalc-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │ optimizer  │  │   error   │  │validation │ │   │
//! │  │   │ Breakdown │  │  DP table  │  │ CoreError │  │  target   │ │   │
//! │  │   │ Solution  │  │ backtrack  │  │ ErrorKind │  │  catalog  │ │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    packcalc-db (Storage Layer)                  │   │
//! │  │        pack catalog, calculation log, memory + SQLite           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`optimizer`] - Minimal-overshoot, minimal-pack-count search
//! - [`types`] - Domain types (Breakdown, PackSolution, CalculationRecord)
//! - [`error`] - Domain error types
//! - [`validation`] - Target and catalog validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Quantities**: Sizes, counts and totals are `i64`, never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use packcalc_core::{optimize, DEFAULT_PACK_SIZES};
//!
//! let solution = optimize(12_001, &DEFAULT_PACK_SIZES).unwrap();
//!
//! // 2 × 5000 + 1 × 2000 + 1 × 250
//! assert_eq!(solution.total_items, 12_250);
//! assert_eq!(solution.pack_count, 4);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod optimizer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use packcalc_core::optimize` instead of
// `use packcalc_core::optimizer::optimize`

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use optimizer::{optimize, search_limit, PackOptimizer};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Catalog installed when a store starts empty.
pub const DEFAULT_PACK_SIZES: [i64; 5] = [250, 500, 1000, 2000, 5000];

/// Default ceiling on the optimizer search window.
///
/// Each call allocates two `usize` tables of `limit + 1` entries, so ten
/// million entries is roughly 160 MB of scratch space at the worst.
pub const DEFAULT_MAX_SEARCH_LIMIT: usize = 10_000_000;
