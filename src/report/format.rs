//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::month::format_month;
use crate::domain::{AlgorithmRow, FormState};
use crate::engine::SettingsBounds;
use crate::io::snapshot::GroupInfo;

/// Format the form header: group identity, windows, bounds, criteria.
pub fn format_form_summary(info: &GroupInfo, form: &FormState, bounds: SettingsBounds) -> String {
    let mut out = String::new();

    out.push_str("=== dci - Displacement Characteristic Intervals ===\n");
    out.push_str(&format!(
        "Group: {} / {} / {} / {}\n",
        fallback(&info.ventures_name),
        fallback(&info.workshop_name),
        fallback(&info.field_name),
        fallback(&info.group_well_name),
    ));
    out.push_str(&format!(
        "Settings window: {} .. {} (limits {} .. {})\n",
        format_month(form.settings_start),
        format_month(form.settings_end),
        format_month(bounds.floor),
        format_month(bounds.ceiling),
    ));
    out.push_str(&format!(
        "Testing duration: {}..={} months\n",
        form.min_testing_months, form.max_testing_months
    ));
    out.push_str(&format!(
        "Sources: liquid id={} water id={}\n",
        form.liquid_source.id, form.pumping_source.id
    ));
    out.push_str(&format!(
        "Criteria: approximation>={:.2} determination>={:.2}",
        form.approximation, form.determination
    ));
    if form.use_deviation {
        out.push_str(&format!(" deviation<={:.2}", form.deviation));
    }
    if form.use_moving {
        out.push_str(&format!(" moving>={:.2}", form.moving));
    }
    out.push('\n');

    out
}

/// Format the interval table. Placeholder fields render as `-`.
pub fn format_row_table(rows: &[AlgorithmRow]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<20} {:>8} {:>8} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>4}\n",
        "algorithm", "set from", "set to", "months", "fc from", "fc to", "approx", "determ", "deviat",
        "crit"
    ));
    out.push_str(&format!(
        "{:-<20} {:-<8} {:-<8} {:-<6} {:-<8} {:-<8} {:-<8} {:-<8} {:-<8} {:-<4}\n",
        "", "", "", "", "", "", "", "", "", ""
    ));

    for row in rows {
        out.push_str(&format!(
            "{:<20} {:>8} {:>8} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>4}\n",
            truncate(&row.algorithm, 20),
            format_month(row.settings.start),
            format_month(row.settings.end),
            fmt_months(row.duration_months),
            format_month(row.forecast.start),
            format_month(row.forecast.end),
            fmt_metric(row.approximation),
            fmt_metric(row.determination),
            fmt_metric(row.deviation),
            if row.compliance { "yes" } else { "no" },
        ));
    }

    out
}

fn fmt_months(v: Option<i32>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn fmt_metric(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}

fn fallback(s: &str) -> &str {
    if s.is_empty() { "?" } else { s }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthInterval;
    use chrono::NaiveDate;

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn placeholders_render_as_dashes() {
        let rows = vec![AlgorithmRow {
            algorithm: "maksimov".to_string(),
            settings: MonthInterval::new(ym(2023, 7), ym(2024, 6)),
            forecast: MonthInterval::new(ym(2024, 7), ym(2026, 6)),
            duration_months: None,
            min_test: 4,
            max_test: 24,
            approximation: None,
            determination: Some(0.812),
            deviation: None,
            compliance: false,
            floor_date: ym(2020, 1),
        }];
        let table = format_row_table(&rows);
        let data_line = table.lines().nth(2).unwrap();
        assert!(data_line.contains("maksimov"));
        assert!(data_line.contains(" - "));
        assert!(data_line.contains("0.812"));
        assert!(data_line.trim_end().ends_with("no"));
    }

    #[test]
    fn long_algorithm_names_are_truncated() {
        assert_eq!(truncate("nazarov_sipachev_extended", 20), "nazarov_sipachev_ex.");
        assert_eq!(truncate("sazonov", 20), "sazonov");
    }
}
