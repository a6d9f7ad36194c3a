//! # Validation Module
//!
//! Input validation for optimizer calls and catalog updates.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler                                                 │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── Immediate 400 for malformed bodies                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── target > 0                                                        │
//! │  └── catalog non-empty, every size > 0                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (size > 0)                                                  │
//! │  └── PRIMARY KEY on size (no duplicates)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use packcalc_core::validation::{normalize_catalog, validate_target};
//!
//! validate_target(12001).unwrap();
//!
//! let packs = normalize_catalog(&[500, 250, 500, 1000]).unwrap();
//! assert_eq!(packs, vec![250, 500, 1000]);
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Target
// =============================================================================

/// Validates an order target (number of items requested).
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## Example
/// ```rust
/// use packcalc_core::validation::validate_target;
///
/// assert!(validate_target(1).is_ok());
/// assert!(validate_target(0).is_err());
/// assert!(validate_target(-10).is_err());
/// ```
pub fn validate_target(target: i64) -> ValidationResult<()> {
    if target <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "target".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Catalog
// =============================================================================

/// Validates a single pack size.
#[inline]
pub fn validate_pack_size(size: i64) -> ValidationResult<()> {
    if size <= 0 {
        return Err(ValidationError::InvalidPackSize { size });
    }

    Ok(())
}

/// Validates a pack catalog.
///
/// ## Rules
/// - Must contain at least one size
/// - Every size must be positive
/// - Duplicates are allowed (they are redundant, not wrong)
pub fn validate_catalog(packs: &[i64]) -> ValidationResult<()> {
    if packs.is_empty() {
        return Err(ValidationError::Required {
            field: "packs".to_string(),
        });
    }

    packs.iter().try_for_each(|&size| validate_pack_size(size))
}

/// Validates a catalog and returns a private sorted, de-duplicated copy.
///
/// The caller's slice is never touched.
///
/// ## Example
/// ```rust
/// use packcalc_core::validation::normalize_catalog;
///
/// assert_eq!(normalize_catalog(&[53, 23, 31, 23]).unwrap(), vec![23, 31, 53]);
/// assert!(normalize_catalog(&[]).is_err());
/// assert!(normalize_catalog(&[10, 0]).is_err());
/// ```
pub fn normalize_catalog(packs: &[i64]) -> ValidationResult<Vec<i64>> {
    validate_catalog(packs)?;

    let mut sorted = packs.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    Ok(sorted)
}

/// Validates a history page size.
///
/// ## Rules
/// - Must be between 1 and `max`
pub fn validate_page_limit(limit: u32, max: u32) -> ValidationResult<()> {
    if limit == 0 || limit > max {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(max),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
