//! Progress clock fill model.
//!
//! A clock's fill is never stored independently of its inputs: it is always
//! derived from the ticks contributed by log entries, the manual ticks
//! applied outside the log, and the per-tick multiplier.
//!
//! # Design Principles
//!
//! - All arithmetic saturates (no silent overflow, no panics).
//! - The result is clamped to `0..=segments`, so negative tick totals empty
//!   the clock instead of underflowing it.
//! - Summation order is irrelevant; inputs are plain sums.

use pilot_ledger_types::{Clock, ClockProgress};
use serde::{Deserialize, Serialize};

/// The derived fill state of one clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockFill {
    /// Filled segments, `0..=segments`.
    pub filled: i32,
    /// Whether every segment is filled.
    pub is_completed: bool,
}

/// Compute a clock's fill from its inputs.
///
/// `filled = clamp((log_ticks + manual_ticks) * tick_amount, 0, segments)`
/// and the clock is complete once `filled >= segments`.
///
/// Callers are expected to pass `segments >= 1` and `tick_amount >= 1` (the
/// API rejects anything else). The function stays total for other inputs: a
/// non-positive `segments` is treated as 0 capacity.
pub fn compute_clock_fill(
    segments: i32,
    tick_amount: i32,
    log_ticks: i64,
    manual_ticks: i64,
) -> ClockFill {
    let capacity = i64::from(segments.max(0));
    let total_ticks = log_ticks.saturating_add(manual_ticks);
    let raw = total_ticks.saturating_mul(i64::from(tick_amount));
    let clamped = raw.clamp(0, capacity);
    // clamped is within 0..=i32::MAX because capacity came from an i32.
    let filled = i32::try_from(clamped).unwrap_or(i32::MAX);

    ClockFill {
        filled,
        is_completed: clamped >= capacity,
    }
}

/// Sum the ticks contributed by a set of progress links.
pub fn sum_log_ticks<'a, I>(progress: I) -> i64
where
    I: IntoIterator<Item = &'a ClockProgress>,
{
    progress
        .into_iter()
        .fold(0_i64, |acc, p| acc.saturating_add(i64::from(p.ticks_applied)))
}

/// Compute the fill of a stored clock given its progress links.
pub fn fill_for<'a, I>(clock: &Clock, progress: I) -> ClockFill
where
    I: IntoIterator<Item = &'a ClockProgress>,
{
    compute_clock_fill(
        clock.segments,
        clock.tick_amount,
        sum_log_ticks(progress),
        i64::from(clock.manual_ticks),
    )
}

/// Segments still empty on a clock.
pub const fn remaining_segments(segments: i32, fill: ClockFill) -> i32 {
    segments.saturating_sub(fill.filled)
}
