//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can
//! be:
//!
//! - mutated in-memory by the event reducer
//! - rendered in terminal reports
//! - echoed into outbound recalculate/save payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::month;

/// Forecast-source id that denotes a constant (manually entered) daily value.
///
/// Only under this id does a selector's manual value travel to the backend;
/// for every other id the backend derives the value itself.
pub const CONSTANT_FORECAST_ID: &str = "4";

/// Default lower bound on the testing duration (months).
pub const DEFAULT_MIN_TESTING_MONTHS: i32 = 4;

/// Default upper bound on the testing duration (months).
pub const DEFAULT_MAX_TESTING_MONTHS: i32 = 24;

/// A month-granular closed date interval. Both bounds sit on the first of a
/// month; `start == end` is a one-month interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: month::first_of_month(start),
            end: month::first_of_month(end),
        }
    }

    /// Inclusive month count spanned by the interval.
    pub fn span_months(&self) -> i32 {
        month::month_span(self.start, self.end)
    }
}

/// One row of the interval table: the tuning state of a single
/// displacement-characteristic algorithm.
///
/// `None` in a numeric field is the display placeholder produced when the
/// backend sent the not-a-number sentinel; it is never coerced to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmRow {
    pub algorithm: String,
    /// Settings window: the range the curve parameters are tuned over.
    pub settings: MonthInterval,
    /// Forecast window, derived from the settings window's end.
    pub forecast: MonthInterval,
    /// Months spanned by the settings window (the testing duration).
    pub duration_months: Option<i32>,
    /// Lower testing bound, copied from the form for display.
    pub min_test: i32,
    /// Upper testing bound, copied from the form for display.
    pub max_test: i32,
    /// Approximation coefficient reached on the settings window.
    pub approximation: Option<f64>,
    /// Determination coefficient reached on the settings window.
    pub determination: Option<f64>,
    /// Deviation of the computed value from the last actual production.
    pub deviation: Option<f64>,
    /// Whether the algorithm met the selection criteria. Computed by the
    /// backend; used only for display tinting, never recomputed locally.
    pub compliance: bool,
    /// Global lower bound of the settings interval, copied from the snapshot.
    pub floor_date: NaiveDate,
}

impl AlgorithmRow {
    /// A row is configured once its duration no longer carries the
    /// placeholder; only configured rows are submitted for computation.
    pub fn is_configured(&self) -> bool {
        self.duration_months.is_some()
    }
}

/// One of the two daily forecast-source selectors (liquid production / water
/// pumping).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSource {
    pub id: String,
    /// Manual daily value; meaningful only when `id` is
    /// [`CONSTANT_FORECAST_ID`].
    pub manual_value: Option<f64>,
}

impl ForecastSource {
    pub fn is_constant(&self) -> bool {
        self.id == CONSTANT_FORECAST_ID
    }

    /// The value actually sent to the backend: the manual value under the
    /// constant id, `null` otherwise.
    pub fn submit_value(&self) -> Option<f64> {
        if self.is_constant() {
            self.manual_value
        } else {
            None
        }
    }
}

/// Global calculation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Global settings-window start.
    pub settings_start: NaiveDate,
    /// Global settings-window end.
    pub settings_end: NaiveDate,
    pub min_testing_months: i32,
    pub max_testing_months: i32,
    pub liquid_source: ForecastSource,
    pub pumping_source: ForecastSource,
    /// Approximation-coefficient threshold.
    pub approximation: f64,
    /// Determination-coefficient threshold.
    pub determination: f64,
    /// Allowed deviation of forecast from last actual oil production.
    pub deviation: f64,
    pub use_deviation: bool,
    /// Mobile-reserves threshold.
    pub moving: f64,
    pub use_moving: bool,
}

impl FormState {
    /// Fixed defaults used when the snapshot carries no saved calculation.
    /// The date range always comes from the caller (the snapshot trend).
    pub fn defaults(settings_start: NaiveDate, settings_end: NaiveDate) -> Self {
        Self {
            settings_start: month::first_of_month(settings_start),
            settings_end: month::first_of_month(settings_end),
            min_testing_months: DEFAULT_MIN_TESTING_MONTHS,
            max_testing_months: DEFAULT_MAX_TESTING_MONTHS,
            liquid_source: ForecastSource {
                id: "1".to_string(),
                manual_value: None,
            },
            pumping_source: ForecastSource {
                id: "1".to_string(),
                manual_value: None,
            },
            approximation: 0.95,
            determination: 0.7,
            deviation: 10.0,
            use_deviation: false,
            moving: 0.0,
            use_moving: false,
        }
    }
}
