//! Advisory predicates for date edits.
//!
//! The date pickers (or any non-interactive caller) consult these *before*
//! dispatching a date event; the reducer itself accepts whatever it is given.
//! A caller that skips the check must be prepared to signal an invalid range
//! itself.

use chrono::NaiveDate;

use crate::domain::month::add_months;

/// Global limits of the settings interval, taken from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsBounds {
    pub floor: NaiveDate,
    pub ceiling: NaiveDate,
}

/// Whether `candidate` must be rejected as a settings-window start.
///
/// Rejected when it comes within 2 months of the window's current end, within
/// 2 months of the global ceiling, or at/before the global floor.
pub fn start_disabled(candidate: NaiveDate, current_end: NaiveDate, bounds: SettingsBounds) -> bool {
    candidate >= add_months(current_end, -2)
        || candidate >= add_months(bounds.ceiling, -2)
        || candidate <= bounds.floor
}

/// Whether `candidate` must be rejected as a settings-window end.
///
/// Rejected when it comes within 2 months after the window's current start,
/// within 3 months after the global floor, or at/after one month before the
/// global ceiling (the ceiling month stays free for the forecast start).
pub fn end_disabled(candidate: NaiveDate, current_start: NaiveDate, bounds: SettingsBounds) -> bool {
    candidate <= add_months(current_start, 2)
        || candidate <= add_months(bounds.floor, 3)
        || candidate >= add_months(bounds.ceiling, -1)
}
