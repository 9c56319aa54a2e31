//! IP weather proxy: resolves a client's city from its address, fetches the
//! current weather for that city and answers with a short JSON document.
//! Answers are memoized per IP in a TTL-bound cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
