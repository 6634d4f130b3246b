//! Core data types for the LambdaMART trainer.
//!
//! The aliases below fix the numeric widths used throughout the crate so the
//! histogram engine, the tree learner and the ranking objective agree on what
//! a score, a gradient or a bin id is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample indexing type.
pub type DataSize = usize;

/// Prediction score and gradient type.
/// 64-bit to keep pairwise lambda sums stable over large query groups.
pub type Score = f64;

/// Relevance grade of a sample. Grades are small non-negative integers.
pub type Label = u32;

/// Histogram accumulation type.
pub type Hist = f64;

/// Feature index type for identifying features in the dataset.
pub type FeatureIndex = usize;

/// Bin index type for discretized feature values. At most 255 bins exist per
/// feature, so a byte per sample is enough.
pub type BinIndex = u8;

/// Position of a node inside a tree arena.
pub type NodeIndex = usize;

/// Binary heap-style node identifier: root is 1, children of `id` are
/// `2 * id` and `2 * id + 1`.
pub type NodeId = u64;

/// Iteration number type for boosting iterations.
pub type IterationIndex = usize;

/// Logging verbosity, ordered from least to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only fatal conditions
    Fatal = -1,
    /// Warnings and above
    Warning = 0,
    /// Progress information (the default)
    Info = 1,
    /// Per-round tree growth details
    Debug = 2,
    /// Per-sample details
    Trace = 3,
}

impl VerbosityLevel {
    /// Maps the integer `verbosity` configuration value onto a level.
    /// Values outside `-1..=3` saturate to the nearest end.
    pub fn from_verbosity(verbosity: i32) -> Self {
        match verbosity {
            i32::MIN..=-1 => VerbosityLevel::Fatal,
            0 => VerbosityLevel::Warning,
            1 => VerbosityLevel::Info,
            2 => VerbosityLevel::Debug,
            _ => VerbosityLevel::Trace,
        }
    }

    /// Returns the `log` crate filter that admits exactly this level and above.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            VerbosityLevel::Fatal => log::LevelFilter::Error,
            VerbosityLevel::Warning => log::LevelFilter::Warn,
            VerbosityLevel::Info => log::LevelFilter::Info,
            VerbosityLevel::Debug => log::LevelFilter::Debug,
            VerbosityLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for VerbosityLevel {
    fn default() -> Self {
        VerbosityLevel::Info
    }
}

impl fmt::Display for VerbosityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerbosityLevel::Fatal => "fatal",
            VerbosityLevel::Warning => "warning",
            VerbosityLevel::Info => "info",
            VerbosityLevel::Debug => "debug",
            VerbosityLevel::Trace => "trace",
        };
        write!(f, "{}", name)
    }
}
