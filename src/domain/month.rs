//! Whole-month date arithmetic.
//!
//! Every date the engine touches is month-granular: we normalize to the first
//! of the month and do all shifts/diffs in whole months. A span of 1 month
//! means `start == end`.

use chrono::{Datelike, NaiveDate};

/// Snap a date to the first day of its month.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Shift a date by `months` whole months (negative shifts go backwards).
///
/// The result is always on the first of a month.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Signed month difference `end - start` (day-of-month ignored).
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32
}

/// Inclusive month count of `[start, end]`: `months_between + 1`.
pub fn month_span(start: NaiveDate, end: NaiveDate) -> i32 {
    months_between(start, end) + 1
}

/// Display form used throughout the UI and reports: `MM-YYYY`.
pub fn format_month(date: NaiveDate) -> String {
    format!("{:02}-{}", date.month(), date.year())
}
