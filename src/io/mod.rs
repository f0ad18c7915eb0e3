//! Wire shapes and outbound payload assembly.

pub mod export;
pub mod snapshot;
pub mod submit;
