//! Deserialization of backend payloads.
//!
//! Two shapes matter:
//!
//! - [`Snapshot`] — the full dataset the table is (re)built from, including
//!   the saved calculation metadata that seeds the form
//! - [`RecalculateResponse`] — the compute service's answer, carrying fresh
//!   criteria rows plus curve/fond blocks the engine only echoes back on save
//!
//! Numeric row fields may arrive as the string `"NaN"` instead of a number;
//! those become `None` (the display placeholder), never zero.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{month, FormState};
use crate::engine::SettingsBounds;

/// Structured error object returned by every backend endpoint.
/// `code == 0` means usable data; anything else disables submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub description: String,
}

impl ServiceError {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// A nested `{period_start, period_end}` interval as the backend sends it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireInterval {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// One per-algorithm record, from either the snapshot table or the
/// recalculate criteria list.
#[derive(Debug, Clone, Deserialize)]
pub struct AlgorithmRecord {
    pub algorithm: String,
    pub settings_interval: WireInterval,
    pub forecast_interval: WireInterval,
    #[serde(default, deserialize_with = "nan_opt_i32")]
    pub number_months_setting: Option<i32>,
    #[serde(default, deserialize_with = "nan_opt_f64")]
    pub approximation: Option<f64>,
    #[serde(default, deserialize_with = "nan_opt_f64")]
    pub determination: Option<f64>,
    #[serde(default, deserialize_with = "nan_opt_f64")]
    pub deviation: Option<f64>,
    #[serde(default)]
    pub compliance_criteria: bool,
}

/// Identifying keys of the well group the dataset belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct GroupKeys {
    pub ventures: String,
    pub workshop: String,
    pub field: String,
    pub group_well: String,
}

/// Human-readable names for the group keys (report header material).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupInfo {
    #[serde(default)]
    pub ventures_name: String,
    #[serde(default)]
    pub workshop_name: String,
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub group_well_name: String,
}

/// Saved calculation metadata; seeds the form when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedCalculation {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub daily_liquid_production_id: Option<String>,
    #[serde(default)]
    pub daily_liquid_production_value: Option<f64>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub daily_water_pumping_production_id: Option<String>,
    #[serde(default)]
    pub daily_water_pumping_production_value: Option<f64>,
    #[serde(default)]
    pub min_count_month: Option<i32>,
    #[serde(default)]
    pub max_count_month: Option<i32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub approximation: Option<f64>,
    #[serde(default)]
    pub determination: Option<f64>,
    #[serde(default)]
    pub use_deviation_calculated: Option<bool>,
    #[serde(default)]
    pub use_deviation_calculated_value: Option<f64>,
    #[serde(default)]
    pub use_mobile_reserves: Option<bool>,
    #[serde(default)]
    pub use_mobile_reserves_value: Option<f64>,
}

/// Full dataset returned by the snapshot endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub error: ServiceError,
    #[serde(flatten)]
    pub keys: GroupKeys,
    #[serde(default)]
    pub group_info: GroupInfo,
    /// Global limits every settings window must stay inside.
    pub settings_interval: WireInterval,
    /// Period the base trend was built on; date fallback for the form.
    pub trend: WireInterval,
    /// Default trend length in months, applied to non-preferred rows.
    pub trend_months: i32,
    #[serde(default)]
    pub determination_factor: Option<f64>,
    #[serde(default)]
    pub displacement_characteristic_table: Vec<AlgorithmRecord>,
    #[serde(default)]
    pub displacement_characteristic_calculation: Option<SavedCalculation>,
    #[serde(default)]
    pub well_fond_fact_list: Value,
    #[serde(default)]
    pub well_fond_forecast_list: Value,
}

impl Snapshot {
    pub fn bounds(&self) -> SettingsBounds {
        SettingsBounds {
            floor: month::first_of_month(self.settings_interval.period_start),
            ceiling: month::first_of_month(self.settings_interval.period_end),
        }
    }

    /// Seed the form: saved calculation metadata when present, fixed defaults
    /// otherwise, with the date range falling back to the trend period.
    pub fn seed_form(&self) -> FormState {
        let mut form = FormState::defaults(self.trend.period_start, self.trend.period_end);
        let Some(calc) = &self.displacement_characteristic_calculation else {
            return form;
        };

        if let Some(id) = &calc.daily_liquid_production_id {
            form.liquid_source.id = id.clone();
        }
        form.liquid_source.manual_value = calc.daily_liquid_production_value;
        if let Some(id) = &calc.daily_water_pumping_production_id {
            form.pumping_source.id = id.clone();
        }
        form.pumping_source.manual_value = calc.daily_water_pumping_production_value;

        if let Some(v) = calc.min_count_month {
            form.min_testing_months = v;
        }
        if let Some(v) = calc.max_count_month {
            form.max_testing_months = v;
        }
        if let Some(d) = calc.start_date {
            form.settings_start = month::first_of_month(d);
        }
        if let Some(d) = calc.end_date {
            form.settings_end = month::first_of_month(d);
        }
        if let Some(v) = calc.approximation {
            form.approximation = v;
        }
        if let Some(v) = calc.determination {
            form.determination = v;
        }
        if let Some(v) = calc.use_deviation_calculated_value {
            form.deviation = v;
        }
        if let Some(v) = calc.use_deviation_calculated {
            form.use_deviation = v;
        }
        if let Some(v) = calc.use_mobile_reserves_value {
            form.moving = v;
        }
        if let Some(v) = calc.use_mobile_reserves {
            form.use_moving = v;
        }
        form
    }
}

/// Daily forecast curve lists. The engine never inspects the curves; they are
/// opaque values echoed into the save payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyCurves {
    #[serde(default)]
    pub liquid_forecast_list: Value,
    #[serde(default)]
    pub oil_forecast_list: Value,
    #[serde(default)]
    pub water_forecast_list: Value,
    #[serde(default)]
    pub water_pumping_forecast_list: Value,
}

/// Compute service response to a recalculate request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecalculateResponse {
    #[serde(default)]
    pub error: ServiceError,
    #[serde(default)]
    pub displacement_characteristic_criteria: Vec<AlgorithmRecord>,
    #[serde(default)]
    pub coordinates_daily_displacement_characteristic: Option<DailyCurves>,
    #[serde(default)]
    pub start_forecast_date: Value,
    #[serde(default)]
    pub start_setting_date: Value,
    #[serde(default)]
    pub injection_fond: Value,
    #[serde(default)]
    pub production_fond: Value,
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub well_fond_forecast_list: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Num(f64),
    Text(String),
}

/// Number-or-sentinel field: `"NaN"` (and any other non-numeric text) maps to
/// the placeholder.
fn nan_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumOrText>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(NumOrText::Num(v)) => v.is_finite().then_some(v),
        Some(NumOrText::Text(s)) => parse_lenient(&s),
    })
}

fn nan_opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumOrText>::deserialize(deserializer)?;
    let v = match raw {
        None => None,
        Some(NumOrText::Num(v)) => v.is_finite().then_some(v),
        Some(NumOrText::Text(s)) => parse_lenient(&s),
    };
    Ok(v.map(|v| v.round() as i32))
}

fn parse_lenient(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "NaN" || trimmed == "-" {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Source ids arrive as either a number or a string; keep them as strings.
fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumOrText>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(NumOrText::Num(v)) => {
            if v.fract() == 0.0 {
                Some(format!("{}", v as i64))
            } else {
                Some(v.to_string())
            }
        }
        Some(NumOrText::Text(s)) => Some(s),
    })
}
