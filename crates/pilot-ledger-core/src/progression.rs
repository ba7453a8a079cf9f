//! License-level progression.
//!
//! A pilot's license level is advanced by filling a level-specific clock.
//! The clock's capacity depends on the level the pilot is currently at:
//!
//! | Current level | Segments |
//! |---------------|----------|
//! | 1..=5         | 3        |
//! | 6..=9         | 4        |
//! | 10..=12       | 5        |
//! | anything else | 3        |
//!
//! Level 0 uses the fallback capacity, so three ticks take a fresh pilot
//! from level 0 to level 1.
//!
//! [`compute_license_level`] is pure and total. Non-positive tick totals
//! leave the starting level untouched with zero progress: negative progress
//! is discarded rather than de-levelling the pilot.

use serde::{Deserialize, Serialize};

/// Highest reachable license level.
pub const MAX_LICENSE_LEVEL: i32 = 12;

/// Capacity used for levels outside the table (including level 0).
const FALLBACK_SEGMENTS: i32 = 3;

/// A (level, partial progress) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseProgress {
    /// License level, `0..=12` when started from a valid level.
    pub level: i32,
    /// Ticks on the current level's clock.
    pub progress: i32,
}

impl LicenseProgress {
    /// Build a progress pair.
    pub const fn new(level: i32, progress: i32) -> Self {
        Self { level, progress }
    }
}

/// Number of segments on the license-level clock at `license_level`.
pub const fn ll_clock_segments(license_level: i32) -> i32 {
    match license_level {
        1..=5 => 3,
        6..=9 => 4,
        10..=12 => 5,
        _ => FALLBACK_SEGMENTS,
    }
}

/// Replay a cumulative tick count into a license level and partial progress.
///
/// Starting at `starting_level`, each full clock consumed advances the level
/// by one. Stops when the remaining ticks cannot fill the current level's
/// clock, or at level 12, where progress is capped to level 12's capacity.
pub fn compute_license_level(total_ticks: i64, starting_level: i32) -> LicenseProgress {
    let mut level = starting_level;
    let mut remaining = total_ticks;

    while remaining > 0 && level < MAX_LICENSE_LEVEL {
        let segments = i64::from(ll_clock_segments(level));
        if remaining >= segments {
            remaining = remaining.saturating_sub(segments);
            level = level.saturating_add(1);
        } else {
            return LicenseProgress::new(level, narrow(remaining));
        }
    }

    if level >= MAX_LICENSE_LEVEL {
        let cap = i64::from(ll_clock_segments(MAX_LICENSE_LEVEL));
        return LicenseProgress::new(MAX_LICENSE_LEVEL, narrow(remaining.clamp(0, cap)));
    }

    LicenseProgress::new(level, 0)
}

/// Total ticks needed to reach `level` with `progress` ticks on its clock,
/// starting from level 0. The inverse of [`compute_license_level`] for
/// reachable states.
///
/// A negative level is an empty license: no ticks, whatever the progress.
pub fn ticks_for(level: i32, progress: i32) -> i64 {
    if level < 0 {
        return 0;
    }
    let target = level.clamp(0, MAX_LICENSE_LEVEL);
    let full_levels = (0..target).fold(0_i64, |acc, l| {
        acc.saturating_add(i64::from(ll_clock_segments(l)))
    });
    let partial = progress.clamp(0, ll_clock_segments(target));
    full_levels.saturating_add(i64::from(partial))
}

/// Narrow a value already bounded by a clock capacity.
fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_table() {
        assert_eq!(ll_clock_segments(0), 3);
        assert_eq!(ll_clock_segments(1), 3);
        assert_eq!(ll_clock_segments(5), 3);
        assert_eq!(ll_clock_segments(6), 4);
        assert_eq!(ll_clock_segments(9), 4);
        assert_eq!(ll_clock_segments(10), 5);
        assert_eq!(ll_clock_segments(12), 5);
        assert_eq!(ll_clock_segments(13), 3);
        assert_eq!(ll_clock_segments(-1), 3);
    }

    #[test]
    fn zero_ticks_stay_at_zero() {
        assert_eq!(compute_license_level(0, 0), LicenseProgress::new(0, 0));
    }

    #[test]
    fn partial_fill_does_not_advance() {
        assert_eq!(compute_license_level(2, 0), LicenseProgress::new(0, 2));
    }

    #[test]
    fn exact_fill_advances_with_zero_progress() {
        assert_eq!(compute_license_level(3, 0), LicenseProgress::new(1, 0));
    }

    #[test]
    fn crosses_into_four_segment_levels() {
        // Levels 0..=5 cost 3 each (18), levels 6 and 7 cost 4 each (8),
        // leaving 3 ticks on level 8's four-segment clock.
        assert_eq!(compute_license_level(29, 0), LicenseProgress::new(8, 3));
    }

    #[test]
    fn reaches_level_twelve_at_forty_four() {
        assert_eq!(compute_license_level(43, 0), LicenseProgress::new(11, 4));
        assert_eq!(compute_license_level(44, 0), LicenseProgress::new(12, 0));
        assert_eq!(compute_license_level(46, 0), LicenseProgress::new(12, 2));
    }

    #[test]
    fn progress_caps_at_level_twelve() {
        assert_eq!(compute_license_level(1000, 0), LicenseProgress::new(12, 5));
        assert_eq!(compute_license_level(1000, 12), LicenseProgress::new(12, 5));
    }

    #[test]
    fn negative_ticks_keep_starting_level() {
        // Negative totals are discarded, never de-levelling.
        assert_eq!(compute_license_level(-5, 3), LicenseProgress::new(3, 0));
        assert_eq!(compute_license_level(-5, 0), LicenseProgress::new(0, 0));
    }

    #[test]
    fn starting_level_shifts_capacities() {
        // From level 6 the clock holds 4, so 5 ticks reach level 7 with 1.
        assert_eq!(compute_license_level(5, 6), LicenseProgress::new(7, 1));
    }

    #[test]
    fn ticks_for_inverts_reachable_states() {
        for total in 0..=49 {
            let state = compute_license_level(total, 0);
            let expected = total.min(49);
            assert_eq!(ticks_for(state.level, state.progress), expected, "total {total}");
        }
    }

    #[test]
    fn ticks_for_clamps_out_of_range_input() {
        assert_eq!(ticks_for(-2, 7), 0);
        assert_eq!(ticks_for(2, 9), 9);
        assert_eq!(ticks_for(20, 0), 44);
    }

    #[test]
    fn negative_level_is_an_empty_license() {
        assert_eq!(ticks_for(-1, 0), 0);
        assert_eq!(ticks_for(-2, 3), 0);
        assert_eq!(ticks_for(0, 2), 2);
    }
}
