//! Outbound payload assembly.
//!
//! Two requests leave the engine: a recalculate request for the compute
//! service and a save request for the persistence service. Both are built
//! from the current form + row table; the save request additionally echoes
//! the compute results back unchanged.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{AlgorithmRow, FormState};
use crate::io::snapshot::{GroupKeys, RecalculateResponse};

/// A forecast-source selection as the backend expects it: the manual value
/// travels only under the constant id.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSelection {
    pub id: String,
    pub value: Option<f64>,
}

/// One configured row in the outgoing `algorithm_date_list`.
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmDates {
    pub algorithm: String,
    pub setting_interval_start: NaiveDate,
    pub setting_interval_end: NaiveDate,
    pub forecast_interval_start: NaiveDate,
    pub forecast_interval_end: NaiveDate,
    pub number_months_setting: i32,
}

/// Selection-criteria thresholds and their enable flags.
#[derive(Debug, Clone, Serialize)]
pub struct CriteriaBlock {
    pub determination: f64,
    pub approximation: f64,
    pub deviation: f64,
    pub moving: f64,
    pub use_deviation: bool,
    pub use_moving: bool,
}

/// Request sent to the compute service.
#[derive(Debug, Clone, Serialize)]
pub struct RecalculateRequest {
    #[serde(flatten)]
    pub keys: GroupKeys,
    pub liquid_production_daily_average: SourceSelection,
    pub water_pumping_daily_average: SourceSelection,
    pub minimum_number_months_testing: i32,
    pub maximum_number_months_testing: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub criteria: CriteriaBlock,
    pub algorithm_date_list: Vec<AlgorithmDates>,
}

/// The calculation block persisted on save.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationBlock {
    pub algorithm_date_list: Vec<AlgorithmDates>,
    pub approximation: f64,
    pub daily_liquid_production_id: String,
    pub daily_liquid_production_value: Option<f64>,
    pub daily_water_pumping_production_id: String,
    pub daily_water_pumping_production_value: Option<f64>,
    pub determination: f64,
    pub end_date: NaiveDate,
    pub group_id: String,
    pub id: Option<i64>,
    pub max_count_month: i32,
    pub min_count_month: i32,
    pub save_date: NaiveDate,
    pub start_date: NaiveDate,
    pub use_deviation_calculated: bool,
    pub use_deviation_calculated_value: f64,
    pub use_mobile_reserves: bool,
    pub use_mobile_reserves_value: f64,
}

/// Request sent to the save service: the calculation block plus compute
/// results echoed back untouched.
#[derive(Debug, Clone, Serialize)]
pub struct SaveRequest {
    #[serde(flatten)]
    pub keys: GroupKeys,
    pub fluid_daily_curve: Value,
    pub oil_daily_curve: Value,
    pub water_daily_curve: Value,
    pub water_pumping_daily_curve: Value,
    pub start_forecast_date: Value,
    pub start_setting_date: Value,
    pub injection_fond: Value,
    pub production_fond: Value,
    pub date: Value,
    pub well_fond_forecast_list: Value,
    pub displacement_characteristic_calculation: CalculationBlock,
}

/// The filtered outgoing row list: rows still carrying the duration
/// placeholder are not yet configured and are excluded. Order is preserved.
pub fn configured_rows(rows: &[AlgorithmRow]) -> Vec<AlgorithmDates> {
    rows.iter()
        .filter_map(|row| {
            let months = row.duration_months?;
            Some(AlgorithmDates {
                algorithm: row.algorithm.clone(),
                setting_interval_start: row.settings.start,
                setting_interval_end: row.settings.end,
                forecast_interval_start: row.forecast.start,
                forecast_interval_end: row.forecast.end,
                number_months_setting: months,
            })
        })
        .collect()
}

pub fn build_recalculate(
    keys: &GroupKeys,
    form: &FormState,
    rows: &[AlgorithmRow],
) -> RecalculateRequest {
    RecalculateRequest {
        keys: keys.clone(),
        liquid_production_daily_average: SourceSelection {
            id: form.liquid_source.id.clone(),
            value: form.liquid_source.submit_value(),
        },
        water_pumping_daily_average: SourceSelection {
            id: form.pumping_source.id.clone(),
            value: form.pumping_source.submit_value(),
        },
        minimum_number_months_testing: form.min_testing_months,
        maximum_number_months_testing: form.max_testing_months,
        start_date: form.settings_start,
        end_date: form.settings_end,
        criteria: CriteriaBlock {
            determination: form.determination,
            approximation: form.approximation,
            deviation: form.deviation,
            moving: form.moving,
            use_deviation: form.use_deviation,
            use_moving: form.use_moving,
        },
        algorithm_date_list: configured_rows(rows),
    }
}

/// `save_date` is supplied by the caller so payload assembly stays
/// deterministic.
pub fn build_save(
    keys: &GroupKeys,
    form: &FormState,
    rows: &[AlgorithmRow],
    computed: &RecalculateResponse,
    save_date: NaiveDate,
) -> SaveRequest {
    let curves = computed
        .coordinates_daily_displacement_characteristic
        .clone()
        .unwrap_or_default();

    SaveRequest {
        keys: keys.clone(),
        fluid_daily_curve: curves.liquid_forecast_list,
        oil_daily_curve: curves.oil_forecast_list,
        water_daily_curve: curves.water_forecast_list,
        water_pumping_daily_curve: curves.water_pumping_forecast_list,
        start_forecast_date: computed.start_forecast_date.clone(),
        start_setting_date: computed.start_setting_date.clone(),
        injection_fond: computed.injection_fond.clone(),
        production_fond: computed.production_fond.clone(),
        date: computed.date.clone(),
        well_fond_forecast_list: computed.well_fond_forecast_list.clone(),
        displacement_characteristic_calculation: CalculationBlock {
            algorithm_date_list: configured_rows(rows),
            approximation: form.approximation,
            daily_liquid_production_id: form.liquid_source.id.clone(),
            daily_liquid_production_value: form.liquid_source.submit_value(),
            daily_water_pumping_production_id: form.pumping_source.id.clone(),
            daily_water_pumping_production_value: form.pumping_source.submit_value(),
            determination: form.determination,
            end_date: form.settings_end,
            group_id: keys.group_well.clone(),
            id: None,
            max_count_month: form.max_testing_months,
            min_count_month: form.min_testing_months,
            save_date,
            start_date: form.settings_start,
            use_deviation_calculated: form.use_deviation,
            use_deviation_calculated_value: form.deviation,
            use_mobile_reserves: form.use_moving,
            use_mobile_reserves_value: form.moving,
        },
    }
}

/// Form states that must block submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocker {
    /// Constant liquid-production source without a manual value.
    LiquidValueMissing,
    /// Constant water-pumping source without a manual value.
    PumpingValueMissing,
    /// Deviation criterion enabled with a zero threshold.
    DeviationValueMissing,
    /// Mobile-reserves criterion enabled with a zero threshold.
    MovingValueMissing,
}

impl std::fmt::Display for SubmitBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SubmitBlocker::LiquidValueMissing => {
                "constant liquid-production forecast needs a daily value"
            }
            SubmitBlocker::PumpingValueMissing => {
                "constant water-pumping forecast needs a daily value"
            }
            SubmitBlocker::DeviationValueMissing => {
                "deviation criterion is enabled but its threshold is empty"
            }
            SubmitBlocker::MovingValueMissing => {
                "mobile-reserves criterion is enabled but its threshold is empty"
            }
        };
        write!(f, "{text}")
    }
}

/// All blockers currently raised by the form.
pub fn submit_blockers(form: &FormState) -> Vec<SubmitBlocker> {
    let mut out = Vec::new();
    if form.liquid_source.is_constant() && form.liquid_source.manual_value.unwrap_or(0.0) == 0.0 {
        out.push(SubmitBlocker::LiquidValueMissing);
    }
    if form.pumping_source.is_constant() && form.pumping_source.manual_value.unwrap_or(0.0) == 0.0 {
        out.push(SubmitBlocker::PumpingValueMissing);
    }
    if form.use_deviation && form.deviation == 0.0 {
        out.push(SubmitBlocker::DeviationValueMissing);
    }
    if form.use_moving && form.moving == 0.0 {
        out.push(SubmitBlocker::MovingValueMissing);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlgorithmRow, MonthInterval, CONSTANT_FORECAST_ID};

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn row(algorithm: &str, duration: Option<i32>) -> AlgorithmRow {
        AlgorithmRow {
            algorithm: algorithm.to_string(),
            settings: MonthInterval::new(ym(2023, 1), ym(2024, 6)),
            forecast: MonthInterval::new(ym(2024, 7), ym(2026, 6)),
            duration_months: duration,
            min_test: 4,
            max_test: 24,
            approximation: Some(0.97),
            determination: Some(0.8),
            deviation: None,
            compliance: true,
            floor_date: ym(2020, 1),
        }
    }

    fn form() -> FormState {
        FormState::defaults(ym(2022, 1), ym(2024, 6))
    }

    #[test]
    fn placeholder_rows_are_filtered_in_order() {
        let rows = vec![
            row("sazonov", Some(18)),
            row("maksimov", None),
            row("pirverdyan", Some(9)),
        ];
        let out = configured_rows(&rows);
        let names: Vec<&str> = out.iter().map(|r| r.algorithm.as_str()).collect();
        assert_eq!(names, ["sazonov", "pirverdyan"]);
        assert_eq!(out[0].number_months_setting, 18);
        assert_eq!(out[1].number_months_setting, 9);
    }

    #[test]
    fn recalculate_request_carries_form_and_filtered_rows() {
        let keys = GroupKeys {
            ventures: "v1".into(),
            workshop: "w1".into(),
            field: "f1".into(),
            group_well: "g1".into(),
        };
        let mut form = form();
        form.liquid_source.id = CONSTANT_FORECAST_ID.to_string();
        form.liquid_source.manual_value = Some(11.0);
        form.pumping_source.manual_value = Some(99.0);

        let req = build_recalculate(&keys, &form, &[row("sazonov", Some(18)), row("x", None)]);
        assert_eq!(req.liquid_production_daily_average.value, Some(11.0));
        // Non-constant source never submits its manual value.
        assert_eq!(req.water_pumping_daily_average.value, None);
        assert_eq!(req.minimum_number_months_testing, 4);
        assert_eq!(req.algorithm_date_list.len(), 1);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["ventures"], "v1");
        assert_eq!(json["water_pumping_daily_average"]["value"], Value::Null);
        assert_eq!(json["criteria"]["use_moving"], false);
    }

    #[test]
    fn save_request_echoes_compute_results_unchanged() {
        let keys = GroupKeys::default();
        let computed: RecalculateResponse = serde_json::from_str(
            r#"{
                "error": {"code": 0, "description": ""},
                "coordinates_daily_displacement_characteristic": {
                    "liquid_forecast_list": {"name": "liquid", "curve": [[1, 2.0]]},
                    "oil_forecast_list": {"name": "oil", "curve": []}
                },
                "injection_fond": [3, 4],
                "date": "2024-07-01"
            }"#,
        )
        .unwrap();

        let req = build_save(
            &keys,
            &form(),
            &[row("sazonov", Some(18))],
            &computed,
            ym(2024, 8),
        );
        assert_eq!(req.fluid_daily_curve["name"], "liquid");
        assert_eq!(req.injection_fond, serde_json::json!([3, 4]));
        assert_eq!(req.displacement_characteristic_calculation.save_date, ym(2024, 8));
        assert_eq!(req.displacement_characteristic_calculation.id, None);
        assert_eq!(
            req.displacement_characteristic_calculation
                .algorithm_date_list
                .len(),
            1
        );
    }

    #[test]
    fn blockers_follow_flags_and_constant_sources() {
        let mut form = form();
        assert!(submit_blockers(&form).is_empty());

        form.liquid_source.id = CONSTANT_FORECAST_ID.to_string();
        form.use_moving = true;
        let blockers = submit_blockers(&form);
        assert_eq!(
            blockers,
            vec![
                SubmitBlocker::LiquidValueMissing,
                SubmitBlocker::MovingValueMissing
            ]
        );

        form.liquid_source.manual_value = Some(5.0);
        form.moving = 12.0;
        assert!(submit_blockers(&form).is_empty());
    }
}
