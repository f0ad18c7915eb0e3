//! Synthetic snapshot generation.
//!
//! Produces a deterministic, seed-driven dataset shaped exactly like the
//! backend's snapshot, so the table and replay machinery can run offline.

use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde_json::Value;

use crate::domain::month::add_months;
use crate::error::AppError;
use crate::io::snapshot::{
    AlgorithmRecord, GroupInfo, GroupKeys, ServiceError, Snapshot, WireInterval,
};

/// Displacement-characteristic algorithm families offered by the backend.
const ALGORITHMS: [&str; 6] = [
    "sazonov",
    "maksimov",
    "nazarov_sipachev",
    "sipachev_pasevich",
    "pirverdyan",
    "kambarov",
];

const DEFAULT_TREND_MONTHS: i32 = 12;

pub fn generate_snapshot(seed: u64, algorithm_count: usize) -> Result<Snapshot, AppError> {
    if algorithm_count == 0 {
        return Err(AppError::new(2, "Algorithm count must be > 0."));
    }
    if algorithm_count > ALGORITHMS.len() {
        return Err(AppError::new(
            2,
            format!("At most {} algorithms are available.", ALGORITHMS.len()),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let noise: Normal<f64> = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let floor = add_months(
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default(),
        rng.gen_range(0..12),
    );
    let ceiling = add_months(floor, rng.gen_range(60..84));
    let trend_end = add_months(ceiling, -6);
    let trend_start = add_months(trend_end, -(DEFAULT_TREND_MONTHS - 1));

    let mut records = Vec::with_capacity(algorithm_count);
    for (i, name) in ALGORITHMS.iter().take(algorithm_count).enumerate() {
        // Keep at least the first algorithm fully configured.
        let configured = i == 0 || !rng.gen_bool(0.15);

        let duration = rng.gen_range(6..=24);
        let settings_end = trend_end;
        let settings_start = add_months(settings_end, -(duration - 1));
        let forecast_start = add_months(settings_end, 1);
        let forecast_end = add_months(forecast_start, 23);

        let approximation = (0.9 + 0.04 * noise.sample(&mut rng)).clamp(0.0, 1.0);
        let determination = (0.75 + 0.1 * noise.sample(&mut rng)).clamp(0.0, 1.0);
        let deviation = (5.0 * noise.sample(&mut rng)).abs();

        records.push(AlgorithmRecord {
            algorithm: (*name).to_string(),
            settings_interval: WireInterval {
                period_start: settings_start,
                period_end: settings_end,
            },
            forecast_interval: WireInterval {
                period_start: forecast_start,
                period_end: forecast_end,
            },
            number_months_setting: configured.then_some(duration),
            approximation: configured.then_some(approximation),
            determination: configured.then_some(determination),
            deviation: configured.then_some(deviation),
            compliance_criteria: configured && determination >= 0.7,
        });
    }

    Ok(Snapshot {
        error: ServiceError::default(),
        keys: GroupKeys {
            ventures: "demo-ventures".to_string(),
            workshop: "demo-workshop".to_string(),
            field: "demo-field".to_string(),
            group_well: "demo-group".to_string(),
        },
        group_info: GroupInfo {
            ventures_name: "Demo Ventures".to_string(),
            workshop_name: "Workshop 1".to_string(),
            field_name: "Demo Field".to_string(),
            group_well_name: "Group 1".to_string(),
        },
        settings_interval: WireInterval {
            period_start: floor,
            period_end: ceiling,
        },
        trend: WireInterval {
            period_start: trend_start,
            period_end: trend_end,
        },
        trend_months: DEFAULT_TREND_MONTHS,
        determination_factor: Some(0.7),
        displacement_characteristic_table: records,
        displacement_characteristic_calculation: None,
        well_fond_fact_list: Value::Null,
        well_fond_forecast_list: Value::Null,
    })
}
