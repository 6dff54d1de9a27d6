//! Shared helpers for `parlor` integration tests: one-time tracing setup
//! and collision-free identifiers.

pub mod logging;
pub mod unique_helpers;
