//! Utility modules shared across the crate.

/// Explicit logging context and `env_logger` setup
pub mod log;
