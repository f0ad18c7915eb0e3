//! Building the row table from raw backend records.
//!
//! The builder flattens each record's nested intervals into a row and stamps
//! on the form-owned fields (`min_test`/`max_test`) and the snapshot-owned
//! floor date; those are never read from the record itself. Sentinel handling
//! already happened at deserialization time, so placeholders simply carry
//! through.

use chrono::NaiveDate;

use crate::domain::month::add_months;
use crate::domain::{AlgorithmRow, MonthInterval};
use crate::io::snapshot::AlgorithmRecord;

/// Convert raw records into the ordered row table.
///
/// The forecast window always starts the month after the settings window
/// ends, whatever the record claimed; the record keeps its forecast end.
pub fn build_rows(
    records: &[AlgorithmRecord],
    min_test: i32,
    max_test: i32,
    floor_date: NaiveDate,
) -> Vec<AlgorithmRow> {
    records
        .iter()
        .map(|rec| {
            let settings = MonthInterval::new(
                rec.settings_interval.period_start,
                rec.settings_interval.period_end,
            );
            let forecast = MonthInterval::new(
                add_months(settings.end, 1),
                rec.forecast_interval.period_end,
            );
            AlgorithmRow {
                algorithm: rec.algorithm.clone(),
                settings,
                forecast,
                duration_months: rec.number_months_setting,
                min_test,
                max_test,
                approximation: rec.approximation,
                determination: rec.determination,
                deviation: rec.deviation,
                compliance: rec.compliance_criteria,
                floor_date,
            }
        })
        .collect()
}
