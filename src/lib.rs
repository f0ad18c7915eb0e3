//! `dc-intervals` library crate.
//!
//! The binary (`dci`) is a thin wrapper around this library so that:
//!
//! - the interval engine is testable without spawning processes
//! - modules are reusable (e.g., future service/daemon embedding)
//! - code stays easy to navigate as the project grows
//!
//! The crate maintains the per-algorithm settings/forecast interval table used
//! by a displacement-characteristics forecasting workflow: a pure event
//! reducer over the table, date-bound predicates for the input boundary, and
//! assembly of the recalculate/save payloads sent to the compute backend.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod report;
