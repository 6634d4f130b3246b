//! Core infrastructure module for the LambdaMART trainer.
//!
//! - [`types`]: Fundamental numeric aliases and the verbosity enumeration
//! - [`constants`]: Configuration defaults and fixed numeric constants
//! - [`error`]: The crate error type and `Result` alias
//! - [`utils`]: The explicit logging context
//!
//! ```rust
//! use lambdamart::core::{
//!     constants::DEFAULT_LEARNING_RATE,
//!     error::{LambdaMartError, Result},
//!     types::{Score, VerbosityLevel},
//!     utils::log::TrainingLogger,
//! };
//!
//! let logger = TrainingLogger::new(VerbosityLevel::Warning);
//! let shrunk: Score = 2.0 * DEFAULT_LEARNING_RATE;
//! assert!(shrunk > 0.0);
//! # let _ = logger;
//! # Ok::<(), LambdaMartError>(())
//! ```

pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

pub use constants::*;
pub use error::{LambdaMartError, Result};
pub use types::*;
pub use utils::log::{init_env_logger, TrainingLogger};

/// Version information for the core module
pub const CORE_MODULE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(!CORE_MODULE_VERSION.is_empty());
        assert!(VERSION_BANNER.starts_with("LambdaMART"));
    }

    #[test]
    fn test_module_reexports() {
        let _error: LambdaMartError = LambdaMartError::config("test");
        let _size: DataSize = 42;
        let _score: Score = 3.14;
        let _constant = DEFAULT_LEARNING_RATE;
        let _logger = TrainingLogger::silent();
    }
}
