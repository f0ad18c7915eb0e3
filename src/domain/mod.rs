//! Domain model for the interval table and the calculation form.

pub mod month;
pub mod types;

pub use types::{
    AlgorithmRow, ForecastSource, FormState, MonthInterval, CONSTANT_FORECAST_ID,
    DEFAULT_MAX_TESTING_MONTHS, DEFAULT_MIN_TESTING_MONTHS,
};
