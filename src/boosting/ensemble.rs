//! Trained model: an append-only sequence of weighted trees.

use crate::core::types::{IterationIndex, Score};
use crate::tree::Tree;
use ndarray::{Array1, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One tree of the model and its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeInfo {
    /// The tree
    pub tree: Tree,
    /// Multiplier applied to its outputs
    pub weight: f64,
    /// Boosting iteration that produced it, starting at 1
    pub iteration: IterationIndex,
}

/// Ordered `(tree, weight)` list; prediction sums weighted leaf outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    trees: Vec<TreeInfo>,
}

impl Model {
    /// Creates an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tree.
    pub fn add_tree(&mut self, tree: Tree, weight: f64) {
        let iteration = self.trees.len() + 1;
        self.trees.push(TreeInfo {
            tree,
            weight,
            iteration,
        });
    }

    /// Number of trees
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Returns true if no tree was added
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Trees in insertion order
    pub fn trees(&self) -> &[TreeInfo] {
        &self.trees
    }

    /// Score of one raw feature row.
    pub fn predict(&self, row: &[f64]) -> Score {
        self.predict_at_iteration(row, self.trees.len())
    }

    /// Score using only the first `num_iterations` trees.
    pub fn predict_at_iteration(&self, row: &[f64], num_iterations: IterationIndex) -> Score {
        self.trees
            .iter()
            .take(num_iterations)
            .map(|info| info.weight * info.tree.predict(row))
            .sum()
    }

    /// Scores every row of a `samples x features` matrix in parallel.
    pub fn predict_rows(&self, rows: ArrayView2<'_, f64>) -> Array1<Score> {
        let scores: Vec<Score> = rows
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| match row.as_slice() {
                Some(slice) => self.predict(slice),
                None => self.predict(&row.to_vec()),
            })
            .collect();
        Array1::from(scores)
    }

    /// Number of splits per feature over all trees, indexed by feature.
    pub fn feature_split_counts(&self, num_features: usize) -> Vec<usize> {
        let mut counts = vec![0; num_features];
        for info in &self.trees {
            for node in info.tree.nodes() {
                if let Some(split) = node.split() {
                    if split.feature < num_features {
                        counts[split.feature] += 1;
                    }
                }
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeSplit, TreeNode};
    use ndarray::array;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
        let mut tree = Tree::new(0.0, 0.0, 2);
        tree.split_leaf(
            0,
            NodeSplit {
                feature,
                threshold_bin: 0,
                threshold,
                gain: 1.0,
            },
            TreeNode::new_leaf(2, 2, left, 0.0, 1),
            TreeNode::new_leaf(3, 2, right, 0.0, 1),
        );
        tree
    }

    #[test]
    fn test_predict_sums_weighted_trees() {
        let mut model = Model::new();
        model.add_tree(stump(0, 0.5, -1.0, 1.0), 0.1);
        model.add_tree(stump(1, 2.0, 3.0, -3.0), 0.5);

        assert_eq!(model.num_trees(), 2);
        assert_eq!(model.trees()[1].iteration, 2);
        assert!((model.predict(&[1.0, 1.0]) - (0.1 + 1.5)).abs() < 1e-12);
        assert!((model.predict_at_iteration(&[1.0, 1.0], 1) - 0.1).abs() < 1e-12);
        assert_eq!(model.feature_split_counts(3), vec![1, 1, 0]);
    }

    #[test]
    fn test_predict_rows_matches_predict() {
        let mut model = Model::new();
        model.add_tree(stump(0, 0.5, -1.0, 1.0), 0.1);
        model.add_tree(stump(1, 2.0, 3.0, -3.0), 0.5);

        let rows = array![[0.0, 0.0], [1.0, 5.0], [0.4, 2.0]];
        let scores = model.predict_rows(rows.view());
        for (i, row) in rows.outer_iter().enumerate() {
            assert_eq!(scores[i], model.predict(row.as_slice().unwrap()));
        }
        // Column-major views take the copying path.
        let transposed = rows.t().to_owned();
        let scores = model.predict_rows(transposed.t());
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn test_empty_model_predicts_zero() {
        assert_eq!(Model::new().predict(&[1.0]), 0.0);
    }
}
