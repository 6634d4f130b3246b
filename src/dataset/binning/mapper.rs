//! Threshold table mapping raw feature values to bin ids.

use crate::core::types::BinIndex;
use serde::{Deserialize, Serialize};

/// Sorted upper thresholds of a feature's bins.
///
/// A value belongs to bin `b` iff `thresholds[b - 1] < value <= thresholds[b]`.
/// The last bin has no stored threshold and extends to +infinity, so a mapper
/// with `n` thresholds describes `n + 1` bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinMapper {
    thresholds: Vec<f64>,
}

impl BinMapper {
    /// Wraps a strictly increasing threshold table.
    pub fn new(thresholds: Vec<f64>) -> Self {
        debug_assert!(thresholds.windows(2).all(|w| w[0] < w[1]));
        BinMapper { thresholds }
    }

    /// A mapper with a single bin and no thresholds.
    pub fn single_bin() -> Self {
        BinMapper {
            thresholds: Vec::new(),
        }
    }

    /// Number of bins, always at least 1.
    pub fn num_bins(&self) -> usize {
        self.thresholds.len() + 1
    }

    /// The threshold table.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Upper threshold of `bin`, or +infinity for the last bin.
    pub fn upper_bound(&self, bin: BinIndex) -> f64 {
        self.thresholds
            .get(bin as usize)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Returns true if the feature has no usable split threshold.
    pub fn is_trivial(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Maps a raw value onto its bin.
    pub fn value_to_bin(&self, value: f64) -> BinIndex {
        self.thresholds.partition_point(|&t| t < value) as BinIndex
    }
}
