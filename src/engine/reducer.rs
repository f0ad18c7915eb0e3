//! The table reducer: one closed event type, one entry point.
//!
//! Every mutation of the row table goes through [`reduce`], which maps the
//! previous table to a new one without touching anything else. Keeping the
//! transition surface closed makes the table deterministic to replay: a
//! serialized event list applied to the same snapshot always yields the same
//! table.
//!
//! Postcondition of every event: for each row with a known duration,
//! `settings.span_months() == duration_months`.

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::domain::month::{add_months, first_of_month, month_span};
use crate::domain::AlgorithmRow;

/// Which bound of the global settings window changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateEdge {
    Start,
    End,
}

/// Algorithm selection arriving from the estimation-duration tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferredAlgorithm {
    pub algorithm: String,
    pub setting_months: i32,
}

/// All table transitions. Serializable so an event script can be replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TableEvent {
    /// A bound of the global settings window moved: every row takes the new
    /// bound and its duration is recomputed from its own opposite bound.
    GlobalDateChanged { edge: DateEdge, value: NaiveDate },
    /// One row's settings-window end moved: its start follows at the current
    /// duration and the forecast window restarts the month after.
    RowEndDateChanged { row: usize, value: NaiveDate },
    /// One row's testing duration changed: its settings-window start moves so
    /// the window ends where it did. Forecast bounds stay put.
    RowDurationChanged { row: usize, months: i32 },
    /// The preferred algorithm changed: the matching row takes the selected
    /// duration (dates recomputed as in `RowDurationChanged`), every other
    /// row falls back to the default trend length with dates untouched.
    PreferredAlgorithmChanged {
        selection: PreferredAlgorithm,
        default_trend_months: i32,
    },
    /// The global maximum testing bound changed: every row's forecast window
    /// is rescaled from its own forecast start.
    GlobalMaxTestingChanged { months: i32 },
}

/// Apply one event to the table, returning the new table.
///
/// Total over well-formed input: unknown row indexes and unmatched algorithm
/// names leave dates alone rather than failing.
pub fn reduce(rows: &[AlgorithmRow], event: &TableEvent) -> Vec<AlgorithmRow> {
    match event {
        TableEvent::GlobalDateChanged { edge, value } => {
            let value = first_of_month(*value);
            rows.iter()
                .map(|row| {
                    let mut row = row.clone();
                    match edge {
                        DateEdge::Start => row.settings.start = value,
                        DateEdge::End => row.settings.end = value,
                    }
                    row.duration_months =
                        Some(month_span(row.settings.start, row.settings.end));
                    row
                })
                .collect()
        }

        TableEvent::RowEndDateChanged { row: index, value } => {
            let value = first_of_month(*value);
            map_row(rows, *index, |mut row| {
                // A placeholder duration falls back to the current span so
                // the span invariant still holds afterwards.
                let duration = row
                    .duration_months
                    .unwrap_or_else(|| row.settings.span_months());
                row.forecast.start = add_months(value, 1);
                row.settings.start = add_months(value, -(duration - 1));
                row.settings.end = value;
                row.duration_months = Some(duration);
                row
            })
        }

        TableEvent::RowDurationChanged { row: index, months } => {
            map_row(rows, *index, |mut row| {
                row.settings.start = add_months(row.settings.end, -(months - 1));
                row.duration_months = Some(*months);
                row
            })
        }

        TableEvent::PreferredAlgorithmChanged {
            selection,
            default_trend_months,
        } => rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if row.algorithm == selection.algorithm {
                    row.settings.start =
                        add_months(row.settings.end, -(selection.setting_months - 1));
                    row.duration_months = Some(selection.setting_months);
                } else {
                    row.duration_months = Some(*default_trend_months);
                }
                row
            })
            .collect(),

        TableEvent::GlobalMaxTestingChanged { months } => rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.forecast.end = add_months(row.forecast.start, months - 1);
                row.max_test = *months;
                row
            })
            .collect(),
    }
}

fn map_row(
    rows: &[AlgorithmRow],
    index: usize,
    f: impl Fn(AlgorithmRow) -> AlgorithmRow,
) -> Vec<AlgorithmRow> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if i == index {
                f(row.clone())
            } else {
                row.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthInterval;
    use chrono::NaiveDate;

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn row(algorithm: &str, s0: NaiveDate, s1: NaiveDate, duration: Option<i32>) -> AlgorithmRow {
        AlgorithmRow {
            algorithm: algorithm.to_string(),
            settings: MonthInterval::new(s0, s1),
            forecast: MonthInterval::new(add_months(s1, 1), add_months(s1, 24)),
            duration_months: duration,
            min_test: 4,
            max_test: 24,
            approximation: Some(0.97),
            determination: Some(0.8),
            deviation: Some(3.5),
            compliance: true,
            floor_date: ym(2020, 1),
        }
    }

    fn spans_hold(rows: &[AlgorithmRow]) -> bool {
        rows.iter().all(|r| match r.duration_months {
            Some(d) => r.settings.span_months() == d,
            None => true,
        })
    }

    #[test]
    fn global_start_change_moves_every_row_and_recomputes_duration() {
        let rows = vec![
            row("sazonov", ym(2023, 1), ym(2024, 6), Some(18)),
            row("maksimov", ym(2023, 7), ym(2024, 3), Some(9)),
        ];
        let out = reduce(
            &rows,
            &TableEvent::GlobalDateChanged {
                edge: DateEdge::Start,
                value: ym(2023, 10),
            },
        );
        assert_eq!(out[0].settings.start, ym(2023, 10));
        assert_eq!(out[0].settings.end, ym(2024, 6));
        assert_eq!(out[0].duration_months, Some(9));
        assert_eq!(out[1].duration_months, Some(6));
        assert!(spans_hold(&out));
    }

    #[test]
    fn global_end_change_keeps_each_rows_own_start() {
        let rows = vec![
            row("sazonov", ym(2023, 1), ym(2024, 6), Some(18)),
            row("maksimov", ym(2023, 7), ym(2024, 3), Some(9)),
        ];
        let out = reduce(
            &rows,
            &TableEvent::GlobalDateChanged {
                edge: DateEdge::End,
                value: ym(2024, 9),
            },
        );
        assert_eq!(out[0].duration_months, Some(21));
        assert_eq!(out[1].settings.start, ym(2023, 7));
        assert_eq!(out[1].duration_months, Some(15));
        assert!(spans_hold(&out));
    }

    #[test]
    fn row_end_change_shifts_window_and_forecast_start() {
        let rows = vec![
            row("sazonov", ym(2023, 1), ym(2024, 6), Some(6)),
            row("maksimov", ym(2023, 7), ym(2024, 3), Some(9)),
        ];
        let out = reduce(
            &rows,
            &TableEvent::RowEndDateChanged {
                row: 0,
                value: ym(2024, 4),
            },
        );
        assert_eq!(out[0].settings.end, ym(2024, 4));
        assert_eq!(out[0].settings.start, ym(2023, 11));
        assert_eq!(out[0].forecast.start, ym(2024, 5));
        // Untouched neighbor.
        assert_eq!(out[1], rows[1]);
        assert!(spans_hold(&out));
    }

    #[test]
    fn row_end_change_with_placeholder_duration_uses_current_span() {
        let rows = vec![row("sazonov", ym(2024, 1), ym(2024, 6), None)];
        let out = reduce(
            &rows,
            &TableEvent::RowEndDateChanged {
                row: 0,
                value: ym(2024, 8),
            },
        );
        assert_eq!(out[0].duration_months, Some(6));
        assert_eq!(out[0].settings.start, ym(2024, 3));
        assert_eq!(out[0].forecast.start, ym(2024, 9));
        assert!(spans_hold(&out));
    }

    #[test]
    fn duration_change_moves_start_only() {
        // settings end 2024-06, duration 6 -> 4 gives start 2024-03.
        let rows = vec![row("sazonov", ym(2024, 1), ym(2024, 6), Some(6))];
        let forecast_before = rows[0].forecast;
        let out = reduce(&rows, &TableEvent::RowDurationChanged { row: 0, months: 4 });
        assert_eq!(out[0].settings.start, ym(2024, 3));
        assert_eq!(out[0].settings.end, ym(2024, 6));
        assert_eq!(out[0].duration_months, Some(4));
        assert_eq!(out[0].forecast, forecast_before);
        assert!(spans_hold(&out));
    }

    #[test]
    fn preferred_algorithm_steers_one_row_and_defaults_the_rest() {
        let rows = vec![
            row("sazonov", ym(2023, 1), ym(2024, 6), Some(18)),
            row("maksimov", ym(2023, 7), ym(2024, 3), Some(9)),
        ];
        let out = reduce(
            &rows,
            &TableEvent::PreferredAlgorithmChanged {
                selection: PreferredAlgorithm {
                    algorithm: "maksimov".to_string(),
                    setting_months: 5,
                },
                default_trend_months: 12,
            },
        );
        assert_eq!(out[1].settings.start, ym(2023, 11));
        assert_eq!(out[1].duration_months, Some(5));
        // Non-matching row: duration reset, dates untouched.
        assert_eq!(out[0].settings, rows[0].settings);
        assert_eq!(out[0].duration_months, Some(12));
    }

    #[test]
    fn preferred_algorithm_without_match_touches_no_dates() {
        let rows = vec![
            row("sazonov", ym(2023, 1), ym(2024, 6), Some(18)),
            row("maksimov", ym(2023, 7), ym(2024, 3), Some(9)),
        ];
        let out = reduce(
            &rows,
            &TableEvent::PreferredAlgorithmChanged {
                selection: PreferredAlgorithm {
                    algorithm: "pirverdyan".to_string(),
                    setting_months: 5,
                },
                default_trend_months: 12,
            },
        );
        for (before, after) in rows.iter().zip(&out) {
            assert_eq!(after.settings, before.settings);
            assert_eq!(after.forecast, before.forecast);
            assert_eq!(after.duration_months, Some(12));
        }
    }

    #[test]
    fn max_testing_change_rescales_forecast_from_its_start() {
        // forecast start 2024-07, value 12 -> forecast end 2025-06.
        let mut base = row("sazonov", ym(2023, 1), ym(2024, 6), Some(18));
        base.forecast = MonthInterval::new(ym(2024, 7), ym(2026, 6));
        let out = reduce(
            &[base],
            &TableEvent::GlobalMaxTestingChanged { months: 12 },
        );
        assert_eq!(out[0].forecast.start, ym(2024, 7));
        assert_eq!(out[0].forecast.end, ym(2025, 6));
        assert_eq!(out[0].max_test, 12);
    }

    #[test]
    fn max_testing_change_is_idempotent() {
        let rows = vec![
            row("sazonov", ym(2023, 1), ym(2024, 6), Some(18)),
            row("maksimov", ym(2023, 7), ym(2024, 3), Some(9)),
        ];
        let event = TableEvent::GlobalMaxTestingChanged { months: 10 };
        let once = reduce(&rows, &event);
        let twice = reduce(&once, &event);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_row_index_changes_nothing() {
        let rows = vec![row("sazonov", ym(2023, 1), ym(2024, 6), Some(18))];
        let out = reduce(
            &rows,
            &TableEvent::RowDurationChanged { row: 7, months: 4 },
        );
        assert_eq!(out, rows);
    }

    #[test]
    fn events_round_trip_through_json() {
        let events = vec![
            TableEvent::GlobalDateChanged {
                edge: DateEdge::End,
                value: ym(2024, 9),
            },
            TableEvent::RowDurationChanged { row: 1, months: 8 },
            TableEvent::GlobalMaxTestingChanged { months: 12 },
        ];
        let json = serde_json::to_string(&events).unwrap();
        let back: Vec<TableEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events);
    }
}
