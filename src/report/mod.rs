//! Terminal reporting.

pub mod format;

pub use format::{format_form_summary, format_row_table};
