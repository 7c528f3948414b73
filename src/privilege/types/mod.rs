//! Foundational data structures, error types, and the format registry.

pub mod error;
pub mod format;
pub mod models;
pub mod namespace;
