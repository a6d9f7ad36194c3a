//! # Domain Types
//!
//! Core domain types used throughout Packcalc.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │   Breakdown     │   │  PackSolution   │   │ CalculationRecord   │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  size → qty     │◄──│  breakdown      │   │  id (UUID)          │   │
//! │  │  250 → 1        │   │  total_items    │   │  items (target)     │   │
//! │  │  500 → 2        │   │  pack_count     │   │  total_items        │   │
//! │  └─────────────────┘   └─────────────────┘   │  pack_count         │   │
//! │                                              │  breakdown          │   │
//! │                                              │  created_at         │   │
//! │                                              └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Integer Quantities
//! Every size, count and total is an `i64`. Validation rejects zero and
//! negative values at the boundary; nothing here is ever fractional.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Breakdown
// =============================================================================

/// The chosen multiset of packs, expressed as pack size → quantity.
///
/// ## Invariants
/// - Every quantity present is ≥ 1
/// - Σ(size × quantity) is the achieved total
///
/// Serializes as a JSON object keyed by pack size: `{"250": 1, "500": 2}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakdown(BTreeMap<i64, i64>);

impl Breakdown {
    /// Creates an empty breakdown.
    #[inline]
    pub fn new() -> Self {
        Breakdown(BTreeMap::new())
    }

    /// Adds one pack of the given size.
    pub fn add_pack(&mut self, size: i64) {
        *self.0.entry(size).or_insert(0) += 1;
    }

    /// Records `quantity` packs of `size`. Zero quantities are skipped.
    pub fn insert(&mut self, size: i64, quantity: i64) {
        if quantity > 0 {
            self.0.insert(size, quantity);
        }
    }

    /// Quantity for a pack size (0 when absent).
    #[inline]
    pub fn quantity(&self, size: i64) -> i64 {
        self.0.get(&size).copied().unwrap_or(0)
    }

    /// Σ(size × quantity).
    pub fn total_items(&self) -> i64 {
        self.0.iter().map(|(size, qty)| size * qty).sum()
    }

    /// Σ quantity.
    pub fn pack_count(&self) -> i64 {
        self.0.values().sum()
    }

    /// Number of distinct pack sizes used.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(size, quantity)` in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0.iter().map(|(&size, &qty)| (size, qty))
    }
}

impl FromIterator<(i64, i64)> for Breakdown {
    fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
        let mut breakdown = Breakdown::new();
        for (size, qty) in iter {
            breakdown.insert(size, qty);
        }
        breakdown
    }
}

// =============================================================================
// Pack Solution
// =============================================================================

/// The optimizer's answer for one `(target, catalog)` pair.
///
/// ## Guarantees
/// - `total_items >= target`
/// - no smaller reachable total is `>= target`
/// - `pack_count` is the fewest packs summing to `total_items`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PackSolution {
    /// Pack size → quantity.
    #[ts(type = "Record<string, number>")]
    pub breakdown: Breakdown,

    /// Items actually shipped.
    pub total_items: i64,

    /// Packs actually shipped.
    pub pack_count: i64,
}

impl PackSolution {
    /// Items shipped beyond the requested target.
    #[inline]
    pub fn waste(&self, target: i64) -> i64 {
        self.total_items - target
    }
}

// =============================================================================
// Calculation Record
// =============================================================================

/// One entry of the calculation audit log.
///
/// Snapshot of a successful optimizer call: the requested item count plus
/// the solution as it was returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Items requested (the optimizer target).
    pub items: i64,

    /// Items shipped.
    pub total_items: i64,

    /// Packs shipped.
    pub pack_count: i64,

    /// Pack size → quantity.
    #[ts(type = "Record<string, number>")]
    pub breakdown: Breakdown,

    /// When the calculation was recorded.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CalculationRecord {
    /// Builds a record for a fresh solution with a new id and the current time.
    pub fn new(items: i64, solution: &PackSolution) -> Self {
        CalculationRecord {
            id: uuid::Uuid::new_v4().to_string(),
            items,
            total_items: solution.total_items,
            pack_count: solution.pack_count,
            breakdown: solution.breakdown.clone(),
            created_at: Utc::now(),
        }
    }

    /// Items shipped beyond the request.
    #[inline]
    pub fn waste(&self) -> i64 {
        self.total_items - self.items
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
