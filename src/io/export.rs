//! Report-content assembly for the export boundary.
//!
//! The engine does not render or export anything itself; it only hands the
//! external document builder the tables it needs (the same blocks the saved
//! report is built from). Chart images are the exporter's problem.

use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::{AlgorithmRow, FormState};
use crate::error::AppError;
use crate::io::snapshot::{RecalculateResponse, Snapshot};
use crate::io::submit::configured_rows;

/// One table handed to the document exporter.
#[derive(Debug, Clone, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub data: Value,
}

/// Everything the exporter needs to build the report document.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContent {
    pub tables: Vec<ReportTable>,
    #[serde(rename = "type")]
    pub kind: String,
}

pub fn build_report_content(
    snapshot: &Snapshot,
    form: &FormState,
    rows: &[AlgorithmRow],
    computed: Option<&RecalculateResponse>,
) -> ReportContent {
    let group_summary = json!({
        "settings_interval_start": snapshot.settings_interval.period_start,
        "settings_interval_end": snapshot.settings_interval.period_end,
        "trend_start": snapshot.trend.period_start,
        "trend_end": snapshot.trend.period_end,
        "determination_factor": snapshot.determination_factor,
        "trend_months": snapshot.trend_months,
        "ventures_name": snapshot.group_info.ventures_name,
        "workshop_name": snapshot.group_info.workshop_name,
        "field_name": snapshot.group_info.field_name,
        "group_well_name": snapshot.group_info.group_well_name,
        "start_date": form.settings_start,
        "end_date": form.settings_end,
    });

    // The forecast fond prefers the freshest source: the snapshot's saved
    // list, else the latest compute response.
    let forecast_fond = if snapshot.well_fond_forecast_list.is_null() {
        computed
            .map(|c| c.well_fond_forecast_list.clone())
            .unwrap_or(Value::Null)
    } else {
        snapshot.well_fond_forecast_list.clone()
    };

    let characteristics =
        serde_json::to_value(configured_rows(rows)).unwrap_or(Value::Null);

    ReportContent {
        tables: vec![
            ReportTable {
                title: "Well group".to_string(),
                data: json!([group_summary]),
            },
            ReportTable {
                title: "Actual indicators".to_string(),
                data: snapshot.well_fond_fact_list.clone(),
            },
            ReportTable {
                title: "Base indicators".to_string(),
                data: forecast_fond,
            },
            ReportTable {
                title: "Displacement characteristics".to_string(),
                data: characteristics,
            },
        ],
        kind: "formalization".to_string(),
    }
}

/// Write the report content as JSON, for hand-off to the document service.
pub fn write_report_json(path: &std::path::Path, content: &ReportContent) -> Result<(), AppError> {
    let file = std::fs::File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create report JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, content)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthInterval;
    use chrono::NaiveDate;

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn snapshot() -> Snapshot {
        serde_json::from_str(
            r#"{
                "error": {"code": 0, "description": ""},
                "ventures": "v1", "workshop": "w1", "field": "f1", "group_well": "g1",
                "group_info": {"ventures_name": "Venture One"},
                "settings_interval": {"period_start": "2020-01-01", "period_end": "2024-12-01"},
                "trend": {"period_start": "2022-01-01", "period_end": "2024-06-01"},
                "trend_months": 12,
                "well_fond_fact_list": [{"name": "fact"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn content_has_all_four_tables_and_filtered_rows() {
        let snap = snapshot();
        let form = snap.seed_form();
        let rows = vec![
            AlgorithmRow {
                algorithm: "sazonov".to_string(),
                settings: MonthInterval::new(ym(2023, 1), ym(2024, 6)),
                forecast: MonthInterval::new(ym(2024, 7), ym(2026, 6)),
                duration_months: Some(18),
                min_test: 4,
                max_test: 24,
                approximation: None,
                determination: None,
                deviation: None,
                compliance: true,
                floor_date: ym(2020, 1),
            },
            AlgorithmRow {
                duration_months: None,
                algorithm: "maksimov".to_string(),
                ..rows_template(ym(2023, 1), ym(2024, 6))
            },
        ];

        let content = build_report_content(&snap, &form, &rows, None);
        assert_eq!(content.kind, "formalization");
        assert_eq!(content.tables.len(), 4);
        assert_eq!(content.tables[0].data[0]["ventures_name"], "Venture One");
        assert_eq!(content.tables[1].data[0]["name"], "fact");
        // Only the configured row makes it into the characteristics table.
        assert_eq!(content.tables[3].data.as_array().unwrap().len(), 1);
        assert_eq!(content.tables[3].data[0]["algorithm"], "sazonov");
    }

    fn rows_template(start: NaiveDate, end: NaiveDate) -> AlgorithmRow {
        AlgorithmRow {
            algorithm: String::new(),
            settings: MonthInterval::new(start, end),
            forecast: MonthInterval::new(ym(2024, 7), ym(2026, 6)),
            duration_months: Some(1),
            min_test: 4,
            max_test: 24,
            approximation: None,
            determination: None,
            deviation: None,
            compliance: false,
            floor_date: start,
        }
    }
}
