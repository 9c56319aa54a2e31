//! Domain layer types and invariants.

pub mod forecast;
pub mod network;
