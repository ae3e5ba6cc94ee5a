//! Tracing integration for correlation scopes.

pub mod spans;
pub mod tracing_setup;
