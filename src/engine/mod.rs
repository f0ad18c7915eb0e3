//! The interval-consistency core.
//!
//! Three pieces, all pure:
//!
//! - [`reducer`] — the closed set of table transitions, dispatched through a
//!   single `reduce` entry point so every state change is replayable
//! - [`bounds`] — advisory predicates restricting which dates the input
//!   boundary may accept
//! - [`structure`] — (re)building the row table from raw backend records
//!
//! The reducer never consults the bounds predicates itself: callers gate
//! date-valued events *before* dispatching them.

pub mod bounds;
pub mod reducer;
pub mod structure;

pub use bounds::{end_disabled, start_disabled, SettingsBounds};
pub use reducer::{reduce, DateEdge, PreferredAlgorithm, TableEvent};
pub use structure::build_rows;
