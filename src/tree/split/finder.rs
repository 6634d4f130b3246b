//! Threshold search over a cumulated histogram slot.

use crate::core::types::{BinIndex, FeatureIndex};
use crate::dataset::BinMapper;
use crate::tree::histogram::{BinStats, NodeStats};

/// Best threshold found for one feature of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    /// Feature index for the split
    pub feature: FeatureIndex,
    /// Samples with `bin <= threshold_bin` go left
    pub threshold_bin: BinIndex,
    /// Raw-value threshold matching `threshold_bin`
    pub threshold_value: f64,
    /// Improvement over the unsplit node; may be `<= 0`
    pub gain: f64,
    /// Left child statistics
    pub left: BinStats,
    /// Right child statistics
    pub right: BinStats,
}

/// Scores thresholds of a cumulated histogram.
#[derive(Debug, Clone, Copy)]
pub struct SplitFinder {
    min_data_in_leaf: usize,
}

impl SplitFinder {
    /// Creates a finder requiring `min_data_in_leaf` samples per side.
    pub fn new(min_data_in_leaf: usize) -> Self {
        SplitFinder { min_data_in_leaf }
    }

    /// Finds the threshold maximizing `left.g^2/left.n + right.g^2/right.n`.
    ///
    /// `bins` must hold right-suffix sums. Threshold `t` puts bins `>= t` on
    /// the right. Ties keep the smallest threshold. The reported gain is the
    /// best candidate value minus the node's own contribution.
    pub fn find_best_split(
        &self,
        bins: &[BinStats],
        feature: FeatureIndex,
        mapper: &BinMapper,
        node: &NodeStats,
    ) -> Option<SplitInfo> {
        let total = *bins.first()?;
        let min_count = self.min_data_in_leaf as f64;

        let mut best: Option<(usize, BinStats, BinStats)> = None;
        let mut best_value = 0.0;
        for t in 1..bins.len() {
            let right = bins[t];
            let left = total - right;
            if left.sum_count < min_count || right.sum_count < min_count {
                continue;
            }
            let value = left.gain_contribution() + right.gain_contribution();
            if value > best_value {
                best_value = value;
                best = Some((t, left, right));
            }
        }

        let (t, left, right) = best?;
        let threshold_bin = (t - 1) as BinIndex;
        Some(SplitInfo {
            feature,
            threshold_bin,
            threshold_value: mapper.upper_bound(threshold_bin),
            gain: best_value - node.gain_contribution(),
            left,
            right,
        })
    }
}
