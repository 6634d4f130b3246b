//! Feature-blocked histogram construction.
//!
//! Features are processed in blocks of `num_feature_blocking`. Within a block
//! every (feature, active candidate) pair owns one histogram slot, laid out as
//! `slot = feature_in_block * num_active + candidate`. A block is scanned,
//! cumulated and scored before the next one reuses the buffer. With a thread
//! pool, blocks run concurrently on per-job buffers and their results are
//! merged in feature order, so the outcome does not depend on the thread
//! count.

use crate::core::error::{LambdaMartError, Result};
use crate::core::types::{FeatureIndex, Score};
use crate::dataset::{BinnedDataset, FeatureColumn};
use crate::tree::histogram::{BinStats, HistogramMatrix, NodeStats};
use crate::tree::split::{keep_better, SplitInfo};
use rayon::prelude::*;
use std::ops::Range;

/// Marks a sample whose node is not active in the current round.
pub const NO_SLOT: usize = usize::MAX;

/// Per-round inputs shared by every feature block.
#[derive(Debug, Clone, Copy)]
pub struct BlockScan<'a> {
    /// Active candidate of each sample, or [`NO_SLOT`]
    pub sample_slots: &'a [usize],
    /// Count and gradient sum of the samples of each active candidate
    pub slot_totals: &'a [BinStats],
    /// Gain baseline of each active candidate
    pub node_stats: &'a [NodeStats],
    /// Per-sample gradients
    pub gradients: &'a [Score],
}

impl BlockScan<'_> {
    /// Number of active candidates
    pub fn num_active(&self) -> usize {
        self.node_stats.len()
    }
}

/// Drives scan, cumulate and score over feature blocks.
#[derive(Debug, Clone, Copy)]
pub struct HistogramBuilder {
    num_feature_blocking: usize,
    min_data_in_leaf: usize,
}

impl HistogramBuilder {
    /// Creates a builder scanning `num_feature_blocking` features per pass.
    pub fn new(num_feature_blocking: usize, min_data_in_leaf: usize) -> Self {
        HistogramBuilder {
            num_feature_blocking: num_feature_blocking.max(1),
            min_data_in_leaf,
        }
    }

    /// Histogram slots needed for one block with `num_active` candidates.
    pub fn slots_per_block(&self, num_active: usize) -> usize {
        self.num_feature_blocking * num_active
    }

    fn blocks(&self, num_features: usize) -> Vec<Range<FeatureIndex>> {
        (0..num_features)
            .step_by(self.num_feature_blocking)
            .map(|start| start..(start + self.num_feature_blocking).min(num_features))
            .collect()
    }

    /// Finds each active candidate's best split over all features, reusing
    /// `matrix` for every block.
    pub fn find_best_splits(
        &self,
        dataset: &BinnedDataset,
        scan: &BlockScan<'_>,
        matrix: &mut HistogramMatrix,
    ) -> Result<Vec<Option<SplitInfo>>> {
        let mut best = vec![None; scan.num_active()];
        for block in self.blocks(dataset.num_features()) {
            let block_best = self.scan_block(dataset, block, scan, matrix)?;
            merge_into(&mut best, block_best);
        }
        Ok(best)
    }

    /// Same as [`find_best_splits`](Self::find_best_splits), with blocks
    /// distributed over `pool`.
    pub fn find_best_splits_parallel(
        &self,
        pool: &rayon::ThreadPool,
        dataset: &BinnedDataset,
        scan: &BlockScan<'_>,
    ) -> Result<Vec<Option<SplitInfo>>> {
        let slots = self.slots_per_block(scan.num_active());
        let num_bins = dataset.max_num_bins();
        let blocks = self.blocks(dataset.num_features());

        let per_block: Vec<Result<Vec<Option<SplitInfo>>>> = pool.install(|| {
            blocks
                .into_par_iter()
                .map_init(
                    || HistogramMatrix::new(slots, num_bins),
                    |matrix, block| match matrix {
                        Ok(matrix) => self.scan_block(dataset, block, scan, matrix),
                        Err(e) => Err(LambdaMartError::memory(e.to_string())),
                    },
                )
                .collect()
        });

        let mut best = vec![None; scan.num_active()];
        for block_best in per_block {
            merge_into(&mut best, block_best?);
        }
        Ok(best)
    }

    /// Scans, cumulates and scores the features of one block.
    pub fn scan_block(
        &self,
        dataset: &BinnedDataset,
        features: Range<FeatureIndex>,
        scan: &BlockScan<'_>,
        matrix: &mut HistogramMatrix,
    ) -> Result<Vec<Option<SplitInfo>>> {
        let num_active = scan.num_active();
        let slots = features.len() * num_active;
        let num_bins = dataset.max_num_bins();
        if matrix.num_slots() < slots || matrix.num_bins() < num_bins {
            matrix.reshape(slots.max(matrix.num_slots()), num_bins.max(matrix.num_bins()))?;
        } else {
            matrix.clear(slots);
        }

        for (k, feature) in features.clone().enumerate() {
            let binned = dataset.feature(feature);
            let base = k * num_active;
            match binned.column() {
                FeatureColumn::Dense(bins) => {
                    for (sample, &bin) in bins.iter().enumerate() {
                        let slot = scan.sample_slots[sample];
                        if slot != NO_SLOT {
                            matrix.accumulate(base + slot, bin, scan.gradients[sample]);
                        }
                    }
                }
                FeatureColumn::Sparse(sparse) => {
                    for (sample, bin) in sparse.iter() {
                        let slot = scan.sample_slots[sample];
                        if slot != NO_SLOT {
                            matrix.accumulate(base + slot, bin, scan.gradients[sample]);
                        }
                    }
                    for (candidate, total) in scan.slot_totals.iter().enumerate() {
                        matrix.fill_default_bin(
                            base + candidate,
                            binned.num_bins(),
                            sparse.default_bin(),
                            *total,
                        );
                    }
                }
            }

            for candidate in 0..num_active {
                matrix.cumulate(base + candidate, binned.num_bins());
            }
        }

        let mut best = vec![None; num_active];
        for (k, feature) in features.enumerate() {
            let mapper = dataset.feature(feature).mapper();
            for (candidate, node) in scan.node_stats.iter().enumerate() {
                let split = matrix.best_split(
                    k * num_active + candidate,
                    feature,
                    mapper,
                    node,
                    self.min_data_in_leaf,
                );
                keep_better(&mut best[candidate], split);
            }
        }
        Ok(best)
    }
}

fn merge_into(best: &mut [Option<SplitInfo>], block_best: Vec<Option<SplitInfo>>) {
    for (current, candidate) in best.iter_mut().zip(block_best) {
        keep_better(current, candidate);
    }
}
