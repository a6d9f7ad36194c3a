//! # Pack Optimizer
//!
//! Chooses which packs to ship for an order.
//!
//! ## Objective (lexicographic)
//! 1. Ship at least the ordered number of items
//! 2. Ship as few items as possible
//! 3. Among those, ship as few packs as possible
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Unbounded knapsack, indexed by TOTAL (not by pack count)              │
//! │                                                                         │
//! │  packs = [4, 6]   target = 7   limit = 7 + 6 - 1 = 12                  │
//! │                                                                         │
//! │  s          0  1  2  3  4  5  6  7  8  9 10 11 12                      │
//! │  min_packs  0  ∞  ∞  ∞  1  ∞  1  ∞  2  ∞  2  ∞  2                      │
//! │  last_used  -  -  -  -  4  -  6  -  4  -  4  -  6                      │
//! │                         ▲                                              │
//! │  scan s = 7.. ──────────┴── first finite entry: s = 8                  │
//! │                                                                         │
//! │  walk back: 8 ─(4)─► 4 ─(4)─► 0    ⇒  {4: 2}, 8 items, 2 packs         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why `target + max_size - 1` Is Enough
//! Let `r` be the largest reachable total below `target` (0 always is).
//! `r + max_size` is reachable, is `>= target`, and is at most
//! `target - 1 + max_size`. So the smallest reachable total `>= target`
//! always sits inside the window.
//!
//! ## Tie-Break
//! Pack sizes are tried in ascending order and only a strictly smaller
//! count replaces the current entry, so the smallest size that reaches a
//! minimal count wins. Totals and counts never depend on this; only the
//! exact breakdown does, and it is reproducible across calls.
//!
//! ## Usage
//! ```rust
//! use packcalc_core::optimizer::optimize;
//!
//! let solution = optimize(7, &[4, 6]).unwrap();
//! assert_eq!(solution.total_items, 8);
//! assert_eq!(solution.pack_count, 2);
//! assert_eq!(solution.breakdown.quantity(4), 2);
//! ```

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::{Breakdown, PackSolution};
use crate::validation::{normalize_catalog, validate_target};

/// Marks a total that no combination of packs reaches.
const UNREACHABLE: usize = usize::MAX;

/// Marks a total with no recorded last pack.
const NO_PACK: usize = usize::MAX;

/// Extra reconstruction steps allowed beyond `limit` before giving up.
const RECONSTRUCTION_SLACK: usize = 10;

/// Longest `Vec<usize>` the allocator can be asked for.
const MAX_TABLE_LEN: usize = isize::MAX as usize / std::mem::size_of::<usize>();

// =============================================================================
// Public API
// =============================================================================

/// Runs the optimizer with no search ceiling.
///
/// Shorthand for `PackOptimizer::new().optimize(target, packs)`.
pub fn optimize(target: i64, packs: &[i64]) -> CoreResult<PackSolution> {
    PackOptimizer::new().optimize(target, packs)
}

/// Returns the largest total the optimizer will consider (`target + max_size - 1`).
///
/// The tables hold `limit + 1` entries each, so hosts can call this first and
/// refuse work that would allocate too much.
///
/// ## Example
/// ```rust
/// use packcalc_core::optimizer::search_limit;
///
/// assert_eq!(search_limit(250, &[250, 500, 1000]).unwrap(), 1249);
/// ```
pub fn search_limit(target: i64, packs: &[i64]) -> CoreResult<usize> {
    validate_target(target)?;
    let sorted = normalize_catalog(packs)?;
    window(target, &sorted)
}

/// Configurable pack optimizer.
///
/// ## Example
/// ```rust
/// use packcalc_core::optimizer::PackOptimizer;
/// use packcalc_core::ErrorKind;
///
/// let optimizer = PackOptimizer::new().max_search_limit(1_000);
///
/// assert!(optimizer.optimize(500, &[250, 500]).is_ok());
///
/// let err = optimizer.optimize(5_000, &[250, 500]).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::ResourceExceeded);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackOptimizer {
    /// Largest `limit` allowed before any table is allocated.
    max_search_limit: Option<usize>,
}

impl PackOptimizer {
    /// Creates an optimizer with no search ceiling.
    #[inline]
    pub const fn new() -> Self {
        PackOptimizer {
            max_search_limit: None,
        }
    }

    /// Rejects calls whose search window would exceed `ceiling`.
    pub fn max_search_limit(mut self, ceiling: usize) -> Self {
        self.max_search_limit = Some(ceiling);
        self
    }

    /// The configured ceiling, if any.
    #[inline]
    pub fn ceiling(&self) -> Option<usize> {
        self.max_search_limit
    }

    /// Validates the inputs and returns the search window, enforcing the ceiling.
    pub fn check(&self, target: i64, packs: &[i64]) -> CoreResult<usize> {
        validate_target(target)?;
        let sorted = normalize_catalog(packs)?;
        let limit = window(target, &sorted)?;
        self.enforce_ceiling(limit)?;
        Ok(limit)
    }

    /// Computes the breakdown for `target` items over the `packs` catalog.
    ///
    /// ## Errors
    /// - `Validation` - target ≤ 0, empty catalog, or a size ≤ 0
    /// - `SearchSpaceOverflow` - the window does not fit in `usize`
    /// - `ResourceExceeded` - the window is above the configured ceiling
    /// - `Unreachable` / `ReconstructionFailure` - invariant breaks; never
    ///   expected for a validated catalog
    pub fn optimize(&self, target: i64, packs: &[i64]) -> CoreResult<PackSolution> {
        validate_target(target)?;
        let catalog = normalize_catalog(packs)?;
        let limit = window(target, &catalog)?;
        self.enforce_ceiling(limit)?;

        debug!(target, limit, sizes = catalog.len(), "Building pack table");

        // Every size is <= limit, and limit fits in usize, so these casts are lossless.
        let sizes: Vec<usize> = catalog.iter().map(|&size| size as usize).collect();
        let start = target as usize;

        let table = PackTable::build(&sizes, limit)?;

        let total = table
            .best_total(start)
            .ok_or(CoreError::Unreachable { target, limit })?;

        let breakdown = table.reconstruct(&catalog, &sizes, total)?;
        let pack_count = breakdown.pack_count();

        debug!(target, total, pack_count, "Pack solution found");

        Ok(PackSolution {
            breakdown,
            total_items: total as i64,
            pack_count,
        })
    }

    fn enforce_ceiling(&self, limit: usize) -> CoreResult<()> {
        match self.max_search_limit {
            Some(ceiling) if limit > ceiling => {
                Err(CoreError::ResourceExceeded { limit, ceiling })
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Search Window
// =============================================================================

/// `target + max_size - 1`, with overflow rejected instead of wrapped.
///
/// Also rejects windows whose tables could never be allocated.
///
/// `sorted` must be a validated, ascending catalog.
fn window(target: i64, sorted: &[i64]) -> CoreResult<usize> {
    let max_size = sorted.last().copied().unwrap_or(1);
    let overflow = || CoreError::SearchSpaceOverflow { target, max_size };

    let limit = target.checked_add(max_size - 1).ok_or_else(overflow)?;
    let limit = usize::try_from(limit).map_err(|_| overflow())?;

    // Tables are limit + 1 long.
    if limit >= MAX_TABLE_LEN {
        return Err(overflow());
    }

    Ok(limit)
}

// =============================================================================
// DP Table
// =============================================================================

/// Two parallel tables over every candidate total `0..=limit`.
struct PackTable {
    /// Fewest packs summing exactly to `s`, or `UNREACHABLE`.
    min_packs: Vec<usize>,
    /// Index (into the sorted catalog) of a pack achieving `min_packs[s]`.
    last_used: Vec<usize>,
}

impl PackTable {
    fn build(sizes: &[usize], limit: usize) -> CoreResult<Self> {
        let mut min_packs = filled(UNREACHABLE, limit)?;
        let mut last_used = filled(NO_PACK, limit)?;
        min_packs[0] = 0;

        for s in 1..=limit {
            for (idx, &size) in sizes.iter().enumerate() {
                // Ascending: every later size is larger too.
                if size > s {
                    break;
                }

                let prev = min_packs[s - size];
                if prev != UNREACHABLE && prev + 1 < min_packs[s] {
                    min_packs[s] = prev + 1;
                    last_used[s] = idx;
                }
            }
        }

        Ok(PackTable {
            min_packs,
            last_used,
        })
    }

    #[inline]
    fn limit(&self) -> usize {
        self.min_packs.len() - 1
    }

    /// Smallest reachable total in `[start, limit]`.
    fn best_total(&self, start: usize) -> Option<usize> {
        (start..=self.limit()).find(|&s| self.min_packs[s] != UNREACHABLE)
    }

    /// Walks `last_used` back from `total` to zero.
    fn reconstruct(&self, catalog: &[i64], sizes: &[usize], total: usize) -> CoreResult<Breakdown> {
        let mut breakdown = Breakdown::new();
        let mut remaining = total;
        let max_steps = self.limit() + RECONSTRUCTION_SLACK;
        let mut steps = 0usize;

        while remaining > 0 {
            let idx = self.last_used[remaining];
            let size = match sizes.get(idx) {
                Some(&size) if size > 0 && size <= remaining => size,
                _ => return Err(CoreError::ReconstructionFailure { total, remaining }),
            };

            breakdown.add_pack(catalog[idx]);
            remaining -= size;

            steps += 1;
            if steps > max_steps {
                return Err(CoreError::ReconstructionFailure { total, remaining });
            }
        }

        debug_assert_eq!(breakdown.pack_count() as usize, self.min_packs[total]);
        Ok(breakdown)
    }
}

/// `limit + 1` copies of `value`, or `AllocationFailed` instead of aborting.
fn filled(value: usize, limit: usize) -> CoreResult<Vec<usize>> {
    let len = limit + 1;
    let mut table = Vec::new();
    table
        .try_reserve_exact(len)
        .map_err(|_| CoreError::AllocationFailed { limit })?;
    table.resize(len, value);
    Ok(table)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ValidationError};
    use proptest::prelude::*;

    fn assert_solution(solution: &PackSolution, total: i64, count: i64, expected: &[(i64, i64)]) {
        assert_eq!(solution.total_items, total, "total items");
        assert_eq!(solution.pack_count, count, "pack count");

        let expected: Breakdown = expected.iter().copied().collect();
        assert_eq!(solution.breakdown, expected, "breakdown");
    }

    // -------------------------------------------------------------------------
    // Reference scenarios
    // -------------------------------------------------------------------------

    #[test]
    fn test_large_target_with_coprime_packs() {
        let solution = optimize(500_000, &[23, 31, 53]).unwrap();
        assert_solution(&solution, 500_000, 9438, &[(23, 2), (31, 7), (53, 9429)]);
    }

    #[test]
    fn test_small_target_uses_smallest_pack() {
        let solution = optimize(5, &[10, 20, 50]).unwrap();
        assert_solution(&solution, 10, 1, &[(10, 1)]);
        assert_eq!(solution.waste(5), 5);
    }

    #[test]
    fn test_unreachable_exact_target_rounds_up() {
        let solution = optimize(7, &[4, 6]).unwrap();
        assert_solution(&solution, 8, 2, &[(4, 2)]);
    }

    #[test]
    fn test_single_pack_size() {
        let solution = optimize(250, &[100]).unwrap();
        assert_solution(&solution, 300, 3, &[(100, 3)]);
    }

    #[test]
    fn test_empty_catalog_is_invalid_input() {
        let err = optimize(100, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Classic catalog
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_catalog_orders() {
        let packs = [250, 500, 1000, 2000, 5000];

        assert_solution(&optimize(1, &packs).unwrap(), 250, 1, &[(250, 1)]);
        assert_solution(&optimize(250, &packs).unwrap(), 250, 1, &[(250, 1)]);
        assert_solution(&optimize(251, &packs).unwrap(), 500, 1, &[(500, 1)]);
        assert_solution(&optimize(501, &packs).unwrap(), 750, 2, &[(250, 1), (500, 1)]);
        assert_solution(
            &optimize(12_001, &packs).unwrap(),
            12_250,
            4,
            &[(250, 1), (2000, 1), (5000, 2)],
        );
    }

    // -------------------------------------------------------------------------
    // Input handling
    // -------------------------------------------------------------------------

    #[test]
    fn test_non_positive_target_is_invalid_input() {
        for target in [0, -1, i64::MIN] {
            let err = optimize(target, &[10, 20]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "target {target}");
        }
    }

    #[test]
    fn test_non_positive_pack_size_is_invalid_input() {
        let err = optimize(10, &[5, 0]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidPackSize { size: 0 })
        ));

        assert!(optimize(10, &[-5]).is_err());
    }

    #[test]
    fn test_duplicates_and_order_do_not_matter() {
        let a = optimize(12_001, &[5000, 250, 2000, 250, 1000, 500]).unwrap();
        let b = optimize(12_001, &[250, 500, 1000, 2000, 5000]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_catalog_is_not_mutated() {
        let packs = vec![53, 23, 31, 23];
        optimize(100, &packs).unwrap();
        assert_eq!(packs, vec![53, 23, 31, 23]);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let first = optimize(9_999, &[23, 31, 53]).unwrap();
        let second = optimize(9_999, &[23, 31, 53]).unwrap();
        assert_eq!(first, second);
    }

    // -------------------------------------------------------------------------
    // Limits
    // -------------------------------------------------------------------------

    #[test]
    fn test_search_limit() {
        assert_eq!(search_limit(7, &[4, 6]).unwrap(), 12);
        assert_eq!(search_limit(1, &[1]).unwrap(), 1);
        assert!(search_limit(0, &[4]).is_err());
    }

    #[test]
    fn test_overflow_is_rejected() {
        let err = optimize(i64::MAX, &[2]).unwrap_err();
        assert!(matches!(err, CoreError::SearchSpaceOverflow { .. }));
        assert_eq!(err.kind(), ErrorKind::ResourceExceeded);

        assert!(search_limit(i64::MAX - 5, &[10]).is_err());

        // Fits in an integer, but no table that long can exist
        let err = optimize(i64::MAX / 4, &[1]).unwrap_err();
        assert!(matches!(err, CoreError::SearchSpaceOverflow { .. }));
        assert!(search_limit(i64::MAX / 4, &[1]).is_err());
    }

    #[test]
    fn test_unallocatable_table_is_an_error() {
        let limit = MAX_TABLE_LEN - 2;
        let err = PackTable::build(&[1], limit).err().unwrap();
        assert!(matches!(err, CoreError::AllocationFailed { limit: l } if l == limit));
        assert_eq!(err.kind(), ErrorKind::ResourceExceeded);
    }

    #[test]
    fn test_ceiling_rejects_before_building() {
        let optimizer = PackOptimizer::new().max_search_limit(1_000);
        assert_eq!(optimizer.ceiling(), Some(1_000));

        let err = optimizer.optimize(1_000_000_000, &[250]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ResourceExceeded {
                limit: 1_000_000_249,
                ceiling: 1_000
            }
        ));

        assert_eq!(optimizer.check(751, &[250]).unwrap(), 1_000);
        assert!(optimizer.check(752, &[250]).is_err());
    }

    #[test]
    fn test_reconstruction_detects_broken_table() {
        let sizes = [4usize, 6];
        let catalog = [4i64, 6];
        let mut table = PackTable::build(&sizes, 12).unwrap();
        table.last_used[4] = NO_PACK;

        let err = table.reconstruct(&catalog, &sizes, 8).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ReconstructionFailure {
                total: 8,
                remaining: 4
            }
        ));
    }

    // -------------------------------------------------------------------------
    // Property tests
    // -------------------------------------------------------------------------

    /// Exhaustive search over pack counts: the lexicographically smallest
    /// `(total, count)` with `total >= target`. Knows nothing about the window.
    fn brute_force(target: i64, packs: &[i64]) -> (i64, i64) {
        fn walk(packs: &[i64], sum: i64, count: i64, target: i64, best: &mut Option<(i64, i64)>) {
            if sum >= target {
                if best.map_or(true, |b| (sum, count) < b) {
                    *best = Some((sum, count));
                }
                return;
            }
            let Some((&size, rest)) = packs.split_first() else {
                return;
            };
            let mut k = 0;
            loop {
                let s = sum + k * size;
                walk(rest, s, count + k, target, best);
                if s >= target {
                    break;
                }
                k += 1;
            }
        }

        let mut best = None;
        walk(packs, 0, 0, target, &mut best);
        best.expect("a positive catalog always reaches the target")
    }

    fn check_against_brute_force(target: i64, packs: &[i64]) -> Result<(), TestCaseError> {
        let solution = optimize(target, packs).unwrap();
        let (total, count) = brute_force(target, packs);

        prop_assert!(solution.total_items >= target);
        prop_assert_eq!(solution.total_items, total);
        prop_assert_eq!(solution.pack_count, count);
        prop_assert_eq!(solution.breakdown.total_items(), solution.total_items);
        prop_assert_eq!(solution.breakdown.pack_count(), solution.pack_count);
        for (size, qty) in solution.breakdown.iter() {
            prop_assert!(packs.contains(&size));
            prop_assert!(qty >= 1);
        }
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(96))]

        #[test]
        fn prop_matches_brute_force(
            packs in prop::collection::vec(1i64..=40, 1..=3),
            target in 1i64..=120,
        ) {
            check_against_brute_force(target, &packs)?;
        }

        #[test]
        fn prop_sparse_catalogs_stay_in_window(
            small in 2i64..=9,
            large in 60i64..=250,
            target in 1i64..=600,
        ) {
            check_against_brute_force(target, &[small, large])?;
        }

        #[test]
        fn prop_idempotent(
            packs in prop::collection::vec(1i64..=500, 1..=5),
            target in 1i64..=5_000,
        ) {
            let first = optimize(target, &packs).unwrap();
            let second = optimize(target, &packs).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
