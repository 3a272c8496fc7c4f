//! Shared test utilities used across ratefill crates.

pub mod ci;
pub mod tracing;
