//! # Error Types
//!
//! Domain-specific error types for packcalc-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  packcalc-core errors (this file)                                      │
//! │  ├── CoreError        - Optimizer failures                             │
//! │  └── ValidationError  - Target / catalog input failures                │
//! │                                                                         │
//! │  packcalc-db errors (separate crate)                                   │
//! │  └── DbError          - Catalog store / calculation log failures       │
//! │                                                                         │
//! │  packcalc-api errors (in app)                                          │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError → Client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (target, limit, size)
//! 3. Errors are enum variants, never String
//! 4. Every failure maps to exactly one [`ErrorKind`]

use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of optimizer failures.
///
/// Callers use this to pick user-facing messaging without matching on
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Non-positive target, empty catalog, or non-positive pack size.
    InvalidInput,
    /// No combination reaches the target inside the search window.
    Unreachable,
    /// Backtracking broke an internal invariant. Always a bug.
    ReconstructionFailure,
    /// The search window is too large for the configured or platform limits.
    ResourceExceeded,
}

// =============================================================================
// Core Error
// =============================================================================

/// Pack optimizer errors.
///
/// None of these are retried: the optimizer is deterministic, so the same
/// inputs always fail the same way.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No reachable total exists in `[target, limit]`.
    ///
    /// ## When This Occurs
    /// Never for a valid catalog: repeating the largest pack always lands
    /// inside the window. Reported rather than retried if it ever happens.
    #[error("No pack combination reaches {target} items within {limit}")]
    Unreachable { target: i64, limit: usize },

    /// Backtracking could not attribute every item of the achieved total.
    #[error("Reconstruction failed for total {total}: {remaining} items unattributed")]
    ReconstructionFailure { total: usize, remaining: usize },

    /// `target + max_size - 1` does not fit the platform integer range, or
    /// its tables would be longer than any allocation can be.
    #[error("Search space for target {target} with pack size {max_size} overflows")]
    SearchSpaceOverflow { target: i64, max_size: i64 },

    /// The allocator refused the tables for an otherwise valid window.
    #[error("Could not allocate search tables for limit {limit}")]
    AllocationFailed { limit: usize },

    /// The search window is larger than the configured ceiling.
    ///
    /// ## User Workflow
    /// ```text
    /// POST /calculate { items: 900000000 }
    ///      │
    ///      ▼
    /// search_limit() = 900004999 > max_search_limit
    ///      │
    ///      ▼
    /// ResourceExceeded { limit: 900004999, ceiling: 10000000 }
    ///      │
    ///      ▼
    /// No table is allocated
    /// ```
    #[error("Search limit {limit} exceeds configured maximum {ceiling}")]
    ResourceExceeded { limit: usize, ceiling: usize },
}

impl CoreError {
    /// Returns the coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::InvalidInput,
            CoreError::Unreachable { .. } => ErrorKind::Unreachable,
            CoreError::ReconstructionFailure { .. } => ErrorKind::ReconstructionFailure,
            CoreError::SearchSpaceOverflow { .. }
            | CoreError::AllocationFailed { .. }
            | CoreError::ResourceExceeded { .. } => ErrorKind::ResourceExceeded,
        }
    }

    /// Whether the error was caused by the caller's input.
    #[inline]
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any table is built.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required value is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A catalog entry is zero or negative.
    #[error("pack size {size} is invalid: sizes must be positive")]
    InvalidPackSize { size: i64 },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
