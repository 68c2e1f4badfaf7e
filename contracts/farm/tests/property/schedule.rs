#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the halving schedule resolver.
//!
//! Invariants tested:
//! - Weighted emission is additive over any split point
//! - Weighted emission equals a block-by-block walk of the step table
//! - Extending the schedule never changes ranges that ended at the cut-over block

use halving_farm::schedule::{HalvingSchedule, NEVER};
use proptest::prelude::*;
use soroban_sdk::{Env, Vec};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn build(env: &Env, start: u64, interval: u64, multipliers: &[u32]) -> HalvingSchedule {
    let mut table = Vec::new(env);
    for m in multipliers {
        table.push_back(*m);
    }
    HalvingSchedule::genesis(env, start, interval, table).unwrap()
}

/// Weight of a single block, found by scanning the table.
fn block_weight(schedule: &HalvingSchedule, block: u64) -> i128 {
    if block < schedule.start_block {
        return 0;
    }
    for (index, boundary) in schedule.boundaries.iter().enumerate() {
        if block < boundary {
            if boundary == NEVER {
                return 0;
            }
            return i128::from(schedule.multiplier_at(index as u32));
        }
    }
    0
}

fn multipliers() -> impl Strategy<Value = std::vec::Vec<u32>> {
    prop::collection::vec(0u32..=256, 1..8)
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    /// Splitting a range anywhere never changes its total weight.
    #[test]
    fn prop_weighted_emission_is_additive(
        start in 0u64..500,
        interval in 1u64..100,
        table in multipliers(),
        from in 0u64..1_000,
        len_a in 1u64..400,
        len_b in 1u64..400,
    ) {
        let env = Env::default();
        let s = build(&env, start, interval, &table);

        let mid = from + len_a;
        let to = mid + len_b;
        let whole = s.weighted_emission(from, to).unwrap();
        let left = s.weighted_emission(from, mid).unwrap();
        let right = s.weighted_emission(mid, to).unwrap();

        prop_assert_eq!(left + right, whole);
    }

    /// The resolver agrees with a naive per-block scan.
    #[test]
    fn prop_weighted_emission_matches_block_scan(
        start in 0u64..200,
        interval in 1u64..50,
        table in multipliers(),
        from in 0u64..500,
        len in 1u64..300,
    ) {
        let env = Env::default();
        let s = build(&env, start, interval, &table);

        let to = from + len;
        let expected: i128 = (from..to).map(|b| block_weight(&s, b)).sum();

        prop_assert_eq!(s.weighted_emission(from, to).unwrap(), expected);
    }

    /// Nothing is ever emitted past the last real boundary.
    #[test]
    fn prop_no_emission_after_last_boundary(
        start in 0u64..1_000,
        interval in 1u64..100,
        table in multipliers(),
        len in 1u64..10_000,
    ) {
        let env = Env::default();
        let s = build(&env, start, interval, &table);

        let end = start + interval * (table.len() as u64 - 1);
        prop_assert_eq!(s.weighted_emission(end, end + len).unwrap(), 0);
    }

    /// Ranges that finished at or before the extension block resolve
    /// identically before and after the extension.
    #[test]
    fn prop_extension_preserves_history(
        table in multipliers(),
        current in 100u64..400,
        gaps in prop::collection::vec(1u64..60, 1..12),
        from in 0u64..400,
        len in 1u64..400,
    ) {
        let env = Env::default();
        let s = build(&env, 100, 25, &table);

        let mut update = Vec::new(&env);
        let mut next = current;
        for gap in gaps {
            next += gap;
            update.push_back(next);
        }
        let extended = s.extend(&env, current, &update).unwrap();

        let to = (from + len).min(current);
        if from < to {
            prop_assert_eq!(
                s.weighted_emission(from, to).unwrap(),
                extended.weighted_emission(from, to).unwrap()
            );
        }
        prop_assert_eq!(extended.boundaries.last(), Some(NEVER));
    }
}
