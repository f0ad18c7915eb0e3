//! Single-owner editing session over one snapshot.
//!
//! The session owns the form and the row table exclusively; events are
//! applied one at a time through the reducer, so every state change fully
//! resolves before the next is accepted. Date-valued edits are gated by the
//! bounds predicates *here*, at the input boundary — the reducer stays total
//! and never rejects input.
//!
//! Rebuild rules (table rebuilt from the latest backend records):
//! - a session is created from a snapshot
//! - an accepted recalculate response replaces the record source
//! - the *minimum* testing bound changes
//!
//! A *maximum* testing bound change only rescales forecast windows in place.
//! The two bounds deliberately do not share a path.

use chrono::NaiveDate;

use crate::domain::month::{first_of_month, format_month};
use crate::domain::{AlgorithmRow, FormState};
use crate::engine::{
    build_rows, end_disabled, reduce, start_disabled, DateEdge, PreferredAlgorithm,
    SettingsBounds, TableEvent,
};
use crate::error::AppError;
use crate::io::export::{build_report_content, ReportContent};
use crate::io::snapshot::{AlgorithmRecord, GroupInfo, GroupKeys, RecalculateResponse, Snapshot};
use crate::io::submit::{
    build_recalculate, build_save, submit_blockers, RecalculateRequest, SaveRequest,
};

#[derive(Debug)]
pub struct Session {
    snapshot: Snapshot,
    computed: Option<RecalculateResponse>,
    bounds: SettingsBounds,
    pub form: FormState,
    pub rows: Vec<AlgorithmRow>,
}

impl Session {
    /// Build a session from a freshly fetched snapshot. A non-zero error code
    /// means the backend has no usable data; no session is built.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, AppError> {
        if !snapshot.error.is_ok() {
            let description = if snapshot.error.description.is_empty() {
                format!("Backend reported error code {}.", snapshot.error.code)
            } else {
                snapshot.error.description.clone()
            };
            return Err(AppError::new(3, description));
        }

        let form = snapshot.seed_form();
        let bounds = snapshot.bounds();
        let mut session = Self {
            snapshot,
            computed: None,
            bounds,
            form,
            rows: Vec::new(),
        };
        session.rebuild();
        Ok(session)
    }

    pub fn keys(&self) -> &GroupKeys {
        &self.snapshot.keys
    }

    pub fn group_info(&self) -> &GroupInfo {
        &self.snapshot.group_info
    }

    pub fn bounds(&self) -> SettingsBounds {
        self.bounds
    }

    /// Latest record source: recalculate criteria once a response was
    /// accepted, the snapshot table before that.
    fn source_records(&self) -> &[AlgorithmRecord] {
        match &self.computed {
            Some(resp) if !resp.displacement_characteristic_criteria.is_empty() => {
                &resp.displacement_characteristic_criteria
            }
            _ => &self.snapshot.displacement_characteristic_table,
        }
    }

    /// Rebuild the table from scratch, discarding any local edits.
    fn rebuild(&mut self) {
        self.rows = build_rows(
            self.source_records(),
            self.form.min_testing_months,
            self.form.max_testing_months,
            self.bounds.floor,
        );
    }

    /// Queue entry point: apply one table event through the reducer.
    pub fn dispatch(&mut self, event: &TableEvent) {
        self.rows = reduce(&self.rows, event);
    }

    /// Replay a recorded event script, in order.
    pub fn dispatch_all<'a>(&mut self, events: impl IntoIterator<Item = &'a TableEvent>) {
        for event in events {
            self.dispatch(event);
        }
    }

    pub fn set_settings_start(&mut self, value: NaiveDate) -> Result<(), AppError> {
        let value = first_of_month(value);
        if start_disabled(value, self.form.settings_end, self.bounds) {
            return Err(AppError::new(
                2,
                format!(
                    "{} is not selectable as the settings-window start.",
                    format_month(value)
                ),
            ));
        }
        self.form.settings_start = value;
        self.dispatch(&TableEvent::GlobalDateChanged {
            edge: DateEdge::Start,
            value,
        });
        Ok(())
    }

    pub fn set_settings_end(&mut self, value: NaiveDate) -> Result<(), AppError> {
        let value = first_of_month(value);
        if end_disabled(value, self.form.settings_start, self.bounds) {
            return Err(AppError::new(
                2,
                format!(
                    "{} is not selectable as the settings-window end.",
                    format_month(value)
                ),
            ));
        }
        self.form.settings_end = value;
        self.dispatch(&TableEvent::GlobalDateChanged {
            edge: DateEdge::End,
            value,
        });
        Ok(())
    }

    pub fn set_row_end(&mut self, row: usize, value: NaiveDate) -> Result<(), AppError> {
        let value = first_of_month(value);
        let current = self
            .rows
            .get(row)
            .ok_or_else(|| AppError::new(2, format!("No table row {row}.")))?;
        if end_disabled(value, current.settings.start, self.bounds) {
            return Err(AppError::new(
                2,
                format!(
                    "{} is not selectable as the settings end of '{}'.",
                    format_month(value),
                    current.algorithm
                ),
            ));
        }
        self.dispatch(&TableEvent::RowEndDateChanged { row, value });
        Ok(())
    }

    pub fn set_row_duration(&mut self, row: usize, months: i32) -> Result<(), AppError> {
        let current = self
            .rows
            .get(row)
            .ok_or_else(|| AppError::new(2, format!("No table row {row}.")))?;
        if months < self.form.min_testing_months || months > self.form.max_testing_months {
            return Err(AppError::new(
                2,
                format!(
                    "Testing duration for '{}' must stay within {}..={} months.",
                    current.algorithm,
                    self.form.min_testing_months,
                    self.form.max_testing_months
                ),
            ));
        }
        self.dispatch(&TableEvent::RowDurationChanged { row, months });
        Ok(())
    }

    /// Steer one row to the externally preferred algorithm; everyone else
    /// falls back to the snapshot's default trend length.
    pub fn set_preferred(&mut self, selection: PreferredAlgorithm) {
        let default_trend_months = self.snapshot.trend_months;
        self.dispatch(&TableEvent::PreferredAlgorithmChanged {
            selection,
            default_trend_months,
        });
    }

    /// Changing the minimum testing bound rebuilds the whole table from the
    /// latest backend records; pending local edits are discarded.
    pub fn set_min_testing(&mut self, months: i32) -> Result<(), AppError> {
        if months < 1 || months > self.form.max_testing_months {
            return Err(AppError::new(
                2,
                format!(
                    "Minimum testing duration must stay within 1..={} months.",
                    self.form.max_testing_months
                ),
            ));
        }
        self.form.min_testing_months = months;
        self.rebuild();
        Ok(())
    }

    /// Changing the maximum testing bound only rescales each row's forecast
    /// window in place; local edits survive.
    pub fn set_max_testing(&mut self, months: i32) -> Result<(), AppError> {
        if months < self.form.min_testing_months {
            return Err(AppError::new(
                2,
                format!(
                    "Maximum testing duration must be at least {} months.",
                    self.form.min_testing_months
                ),
            ));
        }
        self.form.max_testing_months = months;
        self.dispatch(&TableEvent::GlobalMaxTestingChanged { months });
        Ok(())
    }

    pub fn recalculate_request(&self) -> Result<RecalculateRequest, AppError> {
        self.check_blockers()?;
        Ok(build_recalculate(&self.snapshot.keys, &self.form, &self.rows))
    }

    /// Accept a compute response. A reported error leaves the table and form
    /// exactly as they were.
    pub fn accept_recalculated(&mut self, response: RecalculateResponse) -> Result<(), AppError> {
        if !response.error.is_ok() {
            let description = if response.error.description.is_empty() {
                format!("Compute service reported error code {}.", response.error.code)
            } else {
                response.error.description.clone()
            };
            return Err(AppError::new(3, description));
        }
        self.computed = Some(response);
        self.rebuild();
        Ok(())
    }

    /// Build the save payload. Requires an accepted compute response, since
    /// the saved report echoes its curves.
    pub fn save_request(&self, save_date: NaiveDate) -> Result<SaveRequest, AppError> {
        self.check_blockers()?;
        let computed = self
            .computed
            .as_ref()
            .ok_or_else(|| AppError::new(2, "Nothing to save: recalculate first."))?;
        Ok(build_save(
            &self.snapshot.keys,
            &self.form,
            &self.rows,
            computed,
            save_date,
        ))
    }

    pub fn report_content(&self) -> ReportContent {
        build_report_content(
            &self.snapshot,
            &self.form,
            &self.rows,
            self.computed.as_ref(),
        )
    }

    fn check_blockers(&self) -> Result<(), AppError> {
        let blockers = submit_blockers(&self.form);
        if let Some(first) = blockers.first() {
            return Err(AppError::new(2, format!("Cannot submit: {first}.")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_snapshot;
    use crate::domain::month::add_months;
    use crate::io::snapshot::ServiceError;

    fn session() -> Session {
        Session::from_snapshot(generate_snapshot(42, 4).unwrap()).unwrap()
    }

    #[test]
    fn snapshot_error_code_blocks_session() {
        let mut snap = generate_snapshot(42, 4).unwrap();
        snap.error = ServiceError {
            code: 17,
            description: "no data for group".to_string(),
        };
        let err = Session::from_snapshot(snap).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "no data for group");
    }

    #[test]
    fn min_testing_change_rebuilds_and_discards_local_edits() {
        let mut s = session();
        let before = s.rows[0].clone();
        let duration = before.duration_months.unwrap();
        let edited = if duration > s.form.min_testing_months {
            duration - 1
        } else {
            duration + 1
        };

        s.set_row_duration(0, edited).unwrap();
        assert_eq!(s.rows[0].duration_months, Some(edited));

        s.set_min_testing(s.form.min_testing_months).unwrap();
        // Rebuilt from the backend records: the local edit is gone.
        assert_eq!(s.rows[0].duration_months, Some(duration));
        assert_eq!(s.rows[0].settings, before.settings);
    }

    #[test]
    fn max_testing_change_rescales_in_place_and_keeps_local_edits() {
        let mut s = session();
        let duration = s.rows[0].duration_months.unwrap();
        let edited = if duration > s.form.min_testing_months {
            duration - 1
        } else {
            duration + 1
        };
        s.set_row_duration(0, edited).unwrap();

        s.set_max_testing(12).unwrap();
        // The edit survives; the forecast window is rescaled from its start.
        assert_eq!(s.rows[0].duration_months, Some(edited));
        for row in &s.rows {
            assert_eq!(row.max_test, 12);
            assert_eq!(row.forecast.end, add_months(row.forecast.start, 11));
        }
    }

    #[test]
    fn rejected_date_edit_leaves_table_untouched() {
        let mut s = session();
        let before = s.rows.clone();
        // The floor itself is never selectable as a start.
        let err = s.set_settings_start(s.bounds().floor).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(s.rows, before);
    }

    #[test]
    fn accepted_recalculate_rebuilds_from_criteria_rows() {
        let mut s = session();
        let other = generate_snapshot(7, 3).unwrap();
        let response = RecalculateResponse {
            displacement_characteristic_criteria: other.displacement_characteristic_table,
            ..RecalculateResponse::default()
        };
        s.accept_recalculated(response).unwrap();
        assert_eq!(s.rows.len(), 3);
    }

    #[test]
    fn failed_recalculate_leaves_everything_untouched() {
        let mut s = session();
        let rows_before = s.rows.clone();
        let form_before = s.form.clone();
        let response = RecalculateResponse {
            error: ServiceError {
                code: 5,
                description: "criteria not met".to_string(),
            },
            ..RecalculateResponse::default()
        };
        let err = s.accept_recalculated(response).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(s.rows, rows_before);
        assert_eq!(s.form, form_before);
    }

    #[test]
    fn save_needs_an_accepted_compute_response() {
        let s = session();
        let err = s.save_request(s.form.settings_end).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn replay_script_is_deterministic() {
        let script = vec![
            TableEvent::RowDurationChanged { row: 0, months: 8 },
            TableEvent::GlobalMaxTestingChanged { months: 18 },
        ];
        let mut a = session();
        let mut b = session();
        a.dispatch_all(&script);
        b.dispatch_all(&script);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.rows[0].duration_months, Some(8));
    }

    #[test]
    fn preferred_selection_uses_snapshot_trend_length() {
        let mut s = session();
        let target = s.rows[1].algorithm.clone();
        s.set_preferred(PreferredAlgorithm {
            algorithm: target.clone(),
            setting_months: 7,
        });
        for row in &s.rows {
            if row.algorithm == target {
                assert_eq!(row.duration_months, Some(7));
            } else {
                assert_eq!(row.duration_months, Some(12));
            }
        }
    }
}
