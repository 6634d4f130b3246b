//! # Pure Rust LambdaMART
//!
//! A LambdaMART learning-to-rank trainer: gradient boosted regression trees
//! grown on pre-binned features, driven by pairwise LambdaRank gradients
//! weighted by the NDCG change of swapping each pair.
//!
//! ## Quick Start
//!
//! ```rust
//! use lambdamart::dataset::BinningConfig;
//! use lambdamart::{BinnedDataset, Booster, ConfigBuilder, RawDataset, TrainingLogger};
//! use ndarray::Array2;
//!
//! # fn main() -> lambdamart::Result<()> {
//! // Two queries of four documents, relevance follows feature 0.
//! let features = Array2::from_shape_fn((8, 1), |(i, _)| (i % 4) as f64);
//! let labels = (0..8).map(|i| (i % 4) as u32 / 2).collect();
//! let raw = RawDataset::from_dense(features.view(), labels, &[4, 4])?;
//!
//! let config = ConfigBuilder::new()
//!     .num_iterations(10)
//!     .max_label(1)
//!     .eval_at(vec![1, 3])
//!     .build()?;
//! let train = BinnedDataset::from_raw(&raw, &BinningConfig::from(&config))?;
//!
//! let mut booster = Booster::new(config, train, None)?;
//! let model = booster.train(&TrainingLogger::silent())?;
//!
//! assert_eq!(model.num_trees(), 10);
//! assert!(model.predict(&[3.0]) > model.predict(&[0.0]));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Numeric types, constants, error handling and the logging context
//! - [`config`]: Training parameters and the configuration file reader
//! - [`dataset`]: Raw and binned datasets, feature binning and text loaders
//! - [`tree`]: Histograms, split finding and the level-batched tree learner
//! - [`metrics`]: DCG tables and NDCG evaluation
//! - [`objective`]: LambdaRank gradients and hessians
//! - [`boosting`]: The boosting loop and the trained [`Model`]
//! - [`prediction`]: Prediction file output
//! - [`application`]: File-to-file training driver used by the binary
//!
//! ## Parallelism
//!
//! `num_threads` sizes a rayon pool used for histogram construction and for
//! per-query gradient computation. Results are merged in a fixed order, so a
//! trained model does not depend on the thread count.

#![warn(missing_docs)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Dataset management module
pub mod dataset;

// Tree learning module
pub mod tree;

// Ranking metrics module
pub mod metrics;

// Objective functions module
pub mod objective;

// Boosting module
pub mod boosting;

// Prediction output module
pub mod prediction;

// Training driver module
pub mod application;

// Re-export core functionality for convenience
pub use self::core::{
    constants::*,
    error::{LambdaMartError, Result},
    types::*,
    utils::log::{init_env_logger, TrainingLogger},
};

// Re-export configuration functionality
pub use config::{Config, ConfigBuilder};

// Re-export dataset functionality
pub use dataset::{BinnedDataset, RawDataset, TextLoader};

// Re-export training functionality
pub use boosting::{Booster, Model};
pub use objective::LambdaRank;
pub use tree::{Tree, TreeLearner};

// Re-export the driver
pub use application::Application;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_reexports() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        let _logger = TrainingLogger::silent();
        let _error: LambdaMartError = LambdaMartError::config("test");
    }
}
