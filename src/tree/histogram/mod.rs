//! Histogram engine for split search.
//!
//! A [`HistogramMatrix`] holds `(sum_count, sum_gradient)` accumulators
//! addressed by `(slot, bin)`. During one growth round every slot belongs to
//! one (feature, active candidate) pair of the current feature block. After
//! scanning, each slot is turned into right-suffix sums by [`cumulate`] so
//! every threshold can be scored in constant time.
//!
//! [`cumulate`]: HistogramMatrix::cumulate

pub mod builder;

pub use builder::{BlockScan, HistogramBuilder};

use crate::core::error::{LambdaMartError, Result};
use crate::core::types::{BinIndex, FeatureIndex, Hist};
use crate::dataset::BinMapper;
use crate::tree::split::{SplitFinder, SplitInfo};
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, Sub};

/// Aggregate count and gradient sum of a bin or a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BinStats {
    /// Number of samples
    pub sum_count: Hist,
    /// Sum of their gradients
    pub sum_gradient: Hist,
}

/// Statistics of a tree node, used as the baseline of its split gain.
pub type NodeStats = BinStats;

impl BinStats {
    /// Creates stats from a count and a gradient sum.
    pub fn new(sum_count: Hist, sum_gradient: Hist) -> Self {
        BinStats {
            sum_count,
            sum_gradient,
        }
    }

    /// Adds one sample.
    #[inline]
    pub fn add(&mut self, gradient: Hist) {
        self.sum_count += 1.0;
        self.sum_gradient += gradient;
    }

    /// `sum_gradient^2 / sum_count`, or 0 for an empty aggregate.
    #[inline]
    pub fn gain_contribution(&self) -> Hist {
        if self.sum_count > 0.0 {
            self.sum_gradient * self.sum_gradient / self.sum_count
        } else {
            0.0
        }
    }
}

impl AddAssign for BinStats {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.sum_count += other.sum_count;
        self.sum_gradient += other.sum_gradient;
    }
}

impl Sub for BinStats {
    type Output = BinStats;

    #[inline]
    fn sub(self, other: Self) -> BinStats {
        BinStats {
            sum_count: self.sum_count - other.sum_count,
            sum_gradient: self.sum_gradient - other.sum_gradient,
        }
    }
}

/// Dense `slots x bins` accumulator buffer, slot-major.
#[derive(Debug, Clone)]
pub struct HistogramMatrix {
    num_slots: usize,
    num_bins: usize,
    data: Vec<BinStats>,
}

impl HistogramMatrix {
    /// Allocates a zeroed buffer. Fails with a memory error instead of
    /// aborting when the allocation cannot be satisfied.
    pub fn new(num_slots: usize, num_bins: usize) -> Result<Self> {
        let mut matrix = HistogramMatrix {
            num_slots: 0,
            num_bins: 0,
            data: Vec::new(),
        };
        matrix.reshape(num_slots, num_bins)?;
        Ok(matrix)
    }

    /// Grows the buffer to hold at least `num_slots x num_bins` entries.
    /// Existing contents are discarded.
    pub fn reshape(&mut self, num_slots: usize, num_bins: usize) -> Result<()> {
        let len = num_slots.checked_mul(num_bins).ok_or_else(|| {
            LambdaMartError::memory(format!(
                "histogram of {} slots x {} bins overflows",
                num_slots, num_bins
            ))
        })?;

        if len > self.data.len() {
            let additional = len - self.data.len();
            self.data.try_reserve_exact(additional).map_err(|e| {
                LambdaMartError::memory(format!(
                    "cannot allocate histogram of {} slots x {} bins: {}",
                    num_slots, num_bins, e
                ))
            })?;
            self.data.resize(len, BinStats::default());
        }

        self.num_slots = num_slots;
        self.num_bins = num_bins;
        self.clear(num_slots);
        Ok(())
    }

    /// Number of addressable slots
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Bins per slot
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Zeroes the first `active_slots` slots.
    pub fn clear(&mut self, active_slots: usize) {
        let end = active_slots.min(self.num_slots) * self.num_bins;
        self.data[..end].fill(BinStats::default());
    }

    /// Adds one sample's gradient to `(slot, bin)`.
    #[inline]
    pub fn accumulate(&mut self, slot: usize, bin: BinIndex, gradient: Hist) {
        let index = slot * self.num_bins + bin as usize;
        self.data[index].add(gradient);
    }

    /// Accumulators of one slot.
    pub fn slot(&self, slot: usize) -> &[BinStats] {
        let start = slot * self.num_bins;
        &self.data[start..start + self.num_bins]
    }

    fn slot_mut(&mut self, slot: usize) -> &mut [BinStats] {
        let start = slot * self.num_bins;
        &mut self.data[start..start + self.num_bins]
    }

    /// Sets `default_bin` of a slot to `node_total` minus every other bin.
    ///
    /// Sparse columns never visit samples in their default bin, so that bin is
    /// recovered from the node total before cumulating.
    pub fn fill_default_bin(
        &mut self,
        slot: usize,
        feature_bins: usize,
        default_bin: BinIndex,
        node_total: BinStats,
    ) {
        let bins = &mut self.slot_mut(slot)[..feature_bins];
        let default_bin = default_bin as usize;
        let mut others = BinStats::default();
        for (bin, stats) in bins.iter().enumerate() {
            if bin != default_bin {
                others += *stats;
            }
        }
        bins[default_bin] = node_total - others;
    }

    /// Turns the first `feature_bins` bins of a slot into right-suffix sums,
    /// so that bin 0 holds the slot total.
    ///
    /// Must run exactly once per scan; the slot has to be cleared before it
    /// is accumulated again.
    pub fn cumulate(&mut self, slot: usize, feature_bins: usize) {
        let bins = &mut self.slot_mut(slot)[..feature_bins];
        for bin in (0..feature_bins.saturating_sub(1)).rev() {
            let next = bins[bin + 1];
            bins[bin] += next;
        }
    }

    /// Scores every threshold of a cumulated slot. Returns `None` if no
    /// threshold leaves `min_data_in_leaf` samples on both sides.
    pub fn best_split(
        &self,
        slot: usize,
        feature: FeatureIndex,
        mapper: &BinMapper,
        node: &NodeStats,
        min_data_in_leaf: usize,
    ) -> Option<SplitInfo> {
        let bins = &self.slot(slot)[..mapper.num_bins()];
        SplitFinder::new(min_data_in_leaf).find_best_split(bins, feature, mapper, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn filled(bins: &[(f64, f64)]) -> HistogramMatrix {
        let mut matrix = HistogramMatrix::new(2, bins.len()).unwrap();
        for (bin, &(count, gradient)) in bins.iter().enumerate() {
            let index = bins.len() + bin;
            matrix.data[index] = BinStats::new(count, gradient);
        }
        matrix
    }

    #[test]
    fn test_accumulate_and_clear() {
        let mut matrix = HistogramMatrix::new(3, 4).unwrap();
        matrix.accumulate(1, 2, 0.5);
        matrix.accumulate(1, 2, -1.5);
        matrix.accumulate(2, 0, 1.0);
        assert_eq!(matrix.slot(1)[2], BinStats::new(2.0, -1.0));
        assert_eq!(matrix.slot(2)[0], BinStats::new(1.0, 1.0));

        matrix.clear(2);
        assert_eq!(matrix.slot(1)[2], BinStats::default());
        assert_eq!(matrix.slot(2)[0], BinStats::new(1.0, 1.0));
    }

    #[test]
    fn test_cumulate_produces_suffix_sums() {
        let mut matrix = filled(&[(1.0, 1.0), (2.0, -2.0), (3.0, 0.5), (4.0, 4.0)]);
        matrix.cumulate(1, 4);
        let counts: Vec<f64> = matrix.slot(1).iter().map(|s| s.sum_count).collect();
        let gradients: Vec<f64> = matrix.slot(1).iter().map(|s| s.sum_gradient).collect();
        assert_eq!(counts, vec![10.0, 9.0, 7.0, 4.0]);
        assert_eq!(gradients, vec![3.5, 2.5, 4.5, 4.0]);
        // slot 0 untouched
        assert!(matrix.slot(0).iter().all(|s| *s == BinStats::default()));
    }

    #[test]
    fn test_cumulate_respects_feature_bins() {
        let mut matrix = filled(&[(1.0, 1.0), (1.0, 1.0), (5.0, 5.0)]);
        matrix.cumulate(1, 2);
        assert_eq!(matrix.slot(1)[0], BinStats::new(2.0, 2.0));
        assert_eq!(matrix.slot(1)[2], BinStats::new(5.0, 5.0));
    }

    #[test]
    fn test_fill_default_bin() {
        let mut matrix = filled(&[(0.0, 0.0), (2.0, 1.0), (1.0, -3.0)]);
        matrix.fill_default_bin(1, 3, 0, BinStats::new(10.0, 0.0));
        assert_eq!(matrix.slot(1)[0], BinStats::new(7.0, 2.0));
    }

    #[test]
    fn test_best_split_picks_separating_threshold() {
        // Negative gradients in the low bins, positive in the high ones.
        let mut matrix = filled(&[(2.0, -4.0), (2.0, -4.0), (2.0, 4.0), (2.0, 4.0)]);
        matrix.cumulate(1, 4);
        let mapper = BinMapper::new(vec![1.0, 2.0, 3.0]);
        let node = NodeStats::new(8.0, 0.0);
        let split = matrix.best_split(1, 7, &mapper, &node, 1).unwrap();
        assert_eq!(split.feature, 7);
        assert_eq!(split.threshold_bin, 1);
        assert_eq!(split.threshold_value, 2.0);
        assert_relative_eq!(split.gain, 32.0);
        assert_eq!(split.left, BinStats::new(4.0, -8.0));
        assert_eq!(split.right, BinStats::new(4.0, 8.0));
    }

    #[test]
    fn test_best_split_respects_min_data_in_leaf() {
        let mut matrix = filled(&[(1.0, -4.0), (5.0, 4.0)]);
        matrix.cumulate(1, 2);
        let mapper = BinMapper::new(vec![1.0]);
        let node = NodeStats::new(6.0, 0.0);
        assert!(matrix.best_split(1, 0, &mapper, &node, 1).is_some());
        assert!(matrix.best_split(1, 0, &mapper, &node, 2).is_none());
    }

    #[test]
    fn test_single_bin_feature_has_no_split() {
        let mut matrix = filled(&[(6.0, 3.0)]);
        matrix.cumulate(1, 1);
        let node = NodeStats::new(6.0, 3.0);
        assert!(matrix
            .best_split(1, 0, &BinMapper::single_bin(), &node, 1)
            .is_none());
    }

    #[test]
    fn test_reshape_grows_and_clears() {
        let mut matrix = HistogramMatrix::new(1, 2).unwrap();
        matrix.accumulate(0, 1, 1.0);
        matrix.reshape(4, 8).unwrap();
        assert_eq!(matrix.num_slots(), 4);
        assert_eq!(matrix.num_bins(), 8);
        assert!(matrix.slot(3).iter().all(|s| *s == BinStats::default()));
        assert!(HistogramMatrix::new(usize::MAX, 2).is_err());
    }
}
