//! Application services: request composition over the resolver ports.

pub mod context;
pub mod error;
pub mod forecast;
pub mod upstream;
