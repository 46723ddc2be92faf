//! Row eligibility — decides what one record needs this sweep.
//!
//! Pure function over (record, sweep context); side effects (defensive
//! write-backs) belong to the engine. Rules apply in order, first match wins.

use std::cmp::Ordering;

use certpost_core::record::{Record, SweepContext};

/// Why a row was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadySent,
    Incomplete,
    NotDue,
}

/// What the sweep should do with a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Skip(SkipReason),
    Due,
    InvalidDate,
}

/// Classify one record against the current sweep instant.
///
/// A row is due when its scheduled instant is at or before the sweep
/// instant, not only on exact-minute equality: a sweep that fires late or
/// skips a minute must not strand the row forever. The due check requires
/// the normalized time to actually parse as `HH:MM`; a row whose time field
/// stayed garbage after normalization never fires, whatever its date.
/// `HH:MM` strings are zero-padded, so lexicographic order is chronological
/// order.
pub fn evaluate(record: &Record, ctx: &SweepContext) -> RowAction {
    if record.already_sent() {
        return RowAction::Skip(SkipReason::AlreadySent);
    }
    if !record.is_complete() {
        return RowAction::Skip(SkipReason::Incomplete);
    }
    let Some(completion_date) = record.completion_date() else {
        return RowAction::InvalidDate;
    };
    if record.scheduled_hhmm().is_none() {
        return RowAction::Skip(SkipReason::NotDue);
    }

    let due = match completion_date.cmp(&ctx.current_date) {
        Ordering::Less => true,
        Ordering::Equal => record.scheduled_time <= ctx.current_time,
        Ordering::Greater => false,
    };
    if due {
        RowAction::Due
    } else {
        RowAction::Skip(SkipReason::NotDue)
    }
}
