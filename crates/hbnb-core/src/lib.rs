//! Service plumbing shared by HBnB binaries: configuration loading, tracing,
//! request ids, health checks and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
