//! External collaborators: the HTTP backend and the synthetic snapshot
//! generator used for offline replay.

pub mod sample;
pub mod service;

pub use sample::generate_snapshot;
pub use service::IntervalClient;
