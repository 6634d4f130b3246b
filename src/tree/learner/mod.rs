//! Level-batched best-first tree learner.
//!
//! One call to [`TreeLearner::build_new_tree`] grows one tree:
//!
//! 1. the root is queued with `(count = n, gradient_sum = 0)`;
//! 2. each round pops up to `max_splits` candidates by impurity;
//! 3. histograms of the active candidates are built feature block by feature
//!    block, cumulated and scored;
//! 4. every candidate whose best gain exceeds `min_gain_to_split` is split,
//!    its samples move to `2 * id` or `2 * id + 1`, and children that are
//!    neither at the depth limit nor pure enough are queued;
//! 5. rounds repeat until the queue is empty. A round may mix candidates of
//!    different depths, and candidates beyond `max_splits` wait for a later
//!    round.

pub mod candidate;

pub use candidate::{CandidateQueue, SplitCandidate};

use crate::config::Config;
use crate::core::constants::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_LEAF_OUTPUT, DEFAULT_MAX_SPLITS, DEFAULT_MIN_DATA_IN_LEAF,
    DEFAULT_MIN_GAIN_TO_SPLIT, DEFAULT_MIN_IMPURITY_TO_SPLIT, DEFAULT_NUM_FEATURE_BLOCKING,
    DEFAULT_NUM_THREADS,
};
use crate::core::error::{LambdaMartError, Result};
use crate::core::types::{NodeId, Score};
use crate::core::utils::log::TrainingLogger;
use crate::dataset::BinnedDataset;
use crate::tree::histogram::builder::NO_SLOT;
use crate::tree::histogram::{BinStats, BlockScan, HistogramBuilder, HistogramMatrix, NodeStats};
use crate::tree::node::{NodeSplit, TreeNode};
use crate::tree::split::{ChildStats, SplitInfo};
use crate::tree::tree::{Tree, ROOT_NODE_ID};
use std::collections::HashMap;

/// Configuration for the tree learner.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLearnerConfig {
    /// Maximum tree depth, root = 1
    pub max_depth: usize,
    /// Maximum number of nodes evaluated per round
    pub max_splits: usize,
    /// Minimum number of samples in each child
    pub min_data_in_leaf: usize,
    /// Minimum gain required for a split
    pub min_gain_to_split: f64,
    /// Children below this impurity are not split further
    pub min_impurity_to_split: f64,
    /// Bound on the absolute leaf output
    pub max_leaf_output: f64,
    /// Features scanned per histogram pass
    pub num_feature_blocking: usize,
    /// Worker threads for the histogram pass
    pub num_threads: usize,
}

impl Default for TreeLearnerConfig {
    fn default() -> Self {
        TreeLearnerConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_splits: DEFAULT_MAX_SPLITS,
            min_data_in_leaf: DEFAULT_MIN_DATA_IN_LEAF,
            min_gain_to_split: DEFAULT_MIN_GAIN_TO_SPLIT,
            min_impurity_to_split: DEFAULT_MIN_IMPURITY_TO_SPLIT,
            max_leaf_output: DEFAULT_MAX_LEAF_OUTPUT,
            num_feature_blocking: DEFAULT_NUM_FEATURE_BLOCKING,
            num_threads: DEFAULT_NUM_THREADS,
        }
    }
}

impl From<&Config> for TreeLearnerConfig {
    fn from(config: &Config) -> Self {
        TreeLearnerConfig {
            max_depth: config.max_depth,
            max_splits: config.max_splits,
            min_data_in_leaf: config.min_data_in_leaf,
            min_gain_to_split: config.min_gain_to_split,
            min_impurity_to_split: config.min_impurity_to_split,
            max_leaf_output: config.max_leaf_output,
            num_feature_blocking: config.num_feature_blocking,
            num_threads: config.effective_num_threads(),
        }
    }
}

/// Tree under construction together with its pending candidates.
struct Growth {
    tree: Tree,
    queue: CandidateQueue,
}

/// Grows one regression tree per boosting iteration over a fixed dataset.
#[derive(Debug)]
pub struct TreeLearner {
    config: TreeLearnerConfig,
    builder: HistogramBuilder,
    histograms: HistogramMatrix,
    pool: Option<rayon::ThreadPool>,
    sample_to_node: Vec<NodeId>,
    sample_slots: Vec<usize>,
}

impl TreeLearner {
    /// Creates a learner for `dataset`, allocating the histogram buffer up
    /// front.
    pub fn new(dataset: &BinnedDataset, config: TreeLearnerConfig) -> Result<Self> {
        let builder = HistogramBuilder::new(config.num_feature_blocking, config.min_data_in_leaf);
        let histograms = HistogramMatrix::new(
            builder.slots_per_block(config.max_splits),
            dataset.max_num_bins(),
        )?;

        let pool = if config.num_threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.num_threads)
                .build()
                .map_err(|e| {
                    LambdaMartError::internal(format!("Failed to create thread pool: {}", e))
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(TreeLearner {
            config,
            builder,
            histograms,
            pool,
            sample_to_node: vec![ROOT_NODE_ID; dataset.num_samples()],
            sample_slots: vec![NO_SLOT; dataset.num_samples()],
        })
    }

    /// Learner configuration
    pub fn config(&self) -> &TreeLearnerConfig {
        &self.config
    }

    /// Node id of every sample after the last [`build_new_tree`] call.
    ///
    /// [`build_new_tree`]: Self::build_new_tree
    pub fn sample_to_node(&self) -> &[NodeId] {
        &self.sample_to_node
    }

    /// Grows a tree from per-sample gradients and hessians.
    pub fn build_new_tree(
        &mut self,
        dataset: &BinnedDataset,
        gradients: &[Score],
        hessians: &[Score],
        logger: &TrainingLogger,
    ) -> Result<Tree> {
        let num_samples = dataset.num_samples();
        for values in [gradients, hessians] {
            if values.len() != num_samples {
                return Err(LambdaMartError::dimension_mismatch(
                    format!("{} derivatives", num_samples),
                    format!("{} derivatives", values.len()),
                ));
            }
        }

        self.sample_to_node.clear();
        self.sample_to_node.resize(num_samples, ROOT_NODE_ID);
        self.sample_slots.clear();
        self.sample_slots.resize(num_samples, NO_SLOT);

        let mut root = ChildStats::default();
        for (&gradient, &hessian) in gradients.iter().zip(hessians) {
            root.add(gradient, hessian);
        }

        let mut growth = Growth {
            tree: Tree::new(0.0, root.impurity(), num_samples),
            queue: CandidateQueue::new(),
        };
        if num_samples > 0 {
            growth.queue.push(SplitCandidate {
                node: 0,
                id: ROOT_NODE_ID,
                depth: 1,
                stats: NodeStats::new(num_samples as f64, 0.0),
                impurity: root.impurity(),
            });
        }

        // Children at the depth limit are never queued, so this terminates.
        let mut round = 0;
        loop {
            let active = growth.queue.pop_batch(self.config.max_splits);
            if active.is_empty() {
                break;
            }
            round += 1;
            let depths: Vec<usize> = active.iter().map(|candidate| candidate.depth).collect();
            logger.debug_fmt(format_args!(
                "Round {}: evaluating {} nodes at depths {:?}, {} queued",
                round,
                active.len(),
                depths,
                growth.queue.len()
            ));

            let best = self.find_best_splits(dataset, gradients, &active)?;
            self.split_nodes(dataset, gradients, hessians, &active, &best, &mut growth, logger);
        }

        logger.debug_fmt(format_args!(
            "Tree built: {} leaves, depth {}",
            growth.tree.num_leaves(),
            growth.tree.depth()
        ));
        Ok(growth.tree)
    }

    /// Maps samples onto active slots and runs the histogram pass.
    fn find_best_splits(
        &mut self,
        dataset: &BinnedDataset,
        gradients: &[Score],
        active: &[SplitCandidate],
    ) -> Result<Vec<Option<SplitInfo>>> {
        let slot_of: HashMap<NodeId, usize> = active
            .iter()
            .enumerate()
            .map(|(slot, candidate)| (candidate.id, slot))
            .collect();

        let mut slot_totals = vec![BinStats::default(); active.len()];
        for (sample, node) in self.sample_to_node.iter().enumerate() {
            let slot = slot_of.get(node).copied().unwrap_or(NO_SLOT);
            self.sample_slots[sample] = slot;
            if slot != NO_SLOT {
                slot_totals[slot].add(gradients[sample]);
            }
        }

        let node_stats: Vec<NodeStats> = active.iter().map(|candidate| candidate.stats).collect();
        let scan = BlockScan {
            sample_slots: &self.sample_slots,
            slot_totals: &slot_totals,
            node_stats: &node_stats,
            gradients,
        };

        match &self.pool {
            Some(pool) => self.builder.find_best_splits_parallel(pool, dataset, &scan),
            None => self
                .builder
                .find_best_splits(dataset, &scan, &mut self.histograms),
        }
    }

    /// Applies the split decisions of one round.
    #[allow(clippy::too_many_arguments)]
    fn split_nodes(
        &mut self,
        dataset: &BinnedDataset,
        gradients: &[Score],
        hessians: &[Score],
        active: &[SplitCandidate],
        best: &[Option<SplitInfo>],
        growth: &mut Growth,
        logger: &TrainingLogger,
    ) {
        let min_gain = self.config.min_gain_to_split;
        let decisions: Vec<Option<&SplitInfo>> = best
            .iter()
            .map(|split| split.as_ref().filter(|split| split.gain > min_gain))
            .collect();

        let mut children = vec![[ChildStats::default(); 2]; active.len()];
        for (sample, &slot) in self.sample_slots.iter().enumerate() {
            if slot == NO_SLOT {
                continue;
            }
            if let Some(split) = decisions[slot] {
                let bin = dataset.feature(split.feature).column().bin(sample);
                let side = usize::from(bin > split.threshold_bin);
                let child = self.sample_to_node[sample] * 2 + side as NodeId;
                self.sample_to_node[sample] = child;
                children[slot][side].add(gradients[sample], hessians[sample]);
                logger.trace_fmt(format_args!("sample {} -> node {}", sample, child));
            }
        }

        for ((candidate, decision), [left, right]) in active.iter().zip(&decisions).zip(children) {
            let split = match decision {
                Some(split) => split,
                None => {
                    logger.trace_fmt(format_args!("node {} stays a leaf", candidate.id));
                    continue;
                }
            };

            let child_depth = candidate.depth + 1;
            let max_output = self.config.max_leaf_output;
            let left_id = candidate.id * 2;
            let right_id = left_id + 1;
            let (left_index, right_index) = growth.tree.split_leaf(
                candidate.node,
                NodeSplit {
                    feature: split.feature,
                    threshold_bin: split.threshold_bin,
                    threshold: split.threshold_value,
                    gain: split.gain,
                },
                TreeNode::new_leaf(
                    left_id,
                    child_depth,
                    left.output(max_output),
                    left.impurity(),
                    left.count,
                ),
                TreeNode::new_leaf(
                    right_id,
                    child_depth,
                    right.output(max_output),
                    right.impurity(),
                    right.count,
                ),
            );
            logger.trace_fmt(format_args!(
                "node {} split on feature {} at {} (gain {})",
                candidate.id, split.feature, split.threshold_value, split.gain
            ));

            for (index, id, stats) in [(left_index, left_id, left), (right_index, right_id, right)] {
                let impurity = stats.impurity();
                if child_depth >= self.config.max_depth
                    || impurity < self.config.min_impurity_to_split
                {
                    continue;
                }
                growth.queue.push(SplitCandidate {
                    node: index,
                    id,
                    depth: child_depth,
                    stats: stats.node_stats(),
                    impurity,
                });
            }
        }
    }
}
