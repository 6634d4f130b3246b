//! Regression tree stored as an arena of nodes.
//!
//! Nodes reference their children by arena index; index 0 is always the root.
//! A side table maps binary node ids to arena indices so the booster can read
//! leaf outputs through the learner's sample-to-node assignment.

use crate::core::types::{DataSize, NodeId, NodeIndex, Score};
use crate::dataset::BinnedDataset;
use crate::tree::node::{NodeSplit, TreeNode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of the root node.
pub const ROOT_NODE_ID: NodeId = 1;

/// Decision tree structure representing a single tree in the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Tree nodes, index 0 is the root
    nodes: Vec<TreeNode>,
    /// Binary node id to arena index
    index_by_id: HashMap<NodeId, NodeIndex>,
    /// Current number of leaf nodes
    num_leaves: usize,
}

impl Tree {
    /// Creates a tree holding a single root leaf.
    pub fn new(root_output: Score, root_impurity: f64, data_count: usize) -> Self {
        let root = TreeNode::new_leaf(ROOT_NODE_ID, 1, root_output, root_impurity, data_count);
        let mut index_by_id = HashMap::new();
        index_by_id.insert(ROOT_NODE_ID, 0);
        Tree {
            nodes: vec![root],
            index_by_id,
            num_leaves: 1,
        }
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Largest node depth, root = 1
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(TreeNode::depth).max().unwrap_or(1)
    }

    /// The root node
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Node at an arena index
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Arena index of a binary node id
    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.index_by_id.get(&id).copied()
    }

    /// Turns the leaf at `parent` into an internal node with two new leaf
    /// children. Returns the children's arena indices.
    pub fn split_leaf(
        &mut self,
        parent: NodeIndex,
        split: NodeSplit,
        left: TreeNode,
        right: TreeNode,
    ) -> (NodeIndex, NodeIndex) {
        let left_index = self.push(left);
        let right_index = self.push(right);
        self.nodes[parent].set_split(split, left_index, right_index);
        self.num_leaves += 1;
        (left_index, right_index)
    }

    fn push(&mut self, node: TreeNode) -> NodeIndex {
        let index = self.nodes.len();
        self.index_by_id.insert(node.id(), index);
        self.nodes.push(node);
        index
    }

    /// Output stored at the node with binary id `id`.
    pub fn output_by_node_id(&self, id: NodeId) -> Option<Score> {
        self.index_of(id).map(|index| self.nodes[index].output())
    }

    /// Arena index of the leaf reached by `row`. Features past the end of
    /// `row` read as 0.0.
    pub fn leaf_index(&self, row: &[f64]) -> NodeIndex {
        self.descend(|split| row.get(split.feature).copied().unwrap_or(0.0) <= split.threshold)
    }

    /// Output of the leaf reached by a raw feature row.
    pub fn predict(&self, row: &[f64]) -> Score {
        self.nodes[self.leaf_index(row)].output()
    }

    /// Output of the leaf reached by a sample of a binned dataset, routing on
    /// bin ids.
    pub fn predict_binned(&self, dataset: &BinnedDataset, sample: DataSize) -> Score {
        let leaf = self.descend(|split| {
            split.feature < dataset.num_features()
                && dataset.feature(split.feature).column().bin(sample) <= split.threshold_bin
        });
        self.nodes[leaf].output()
    }

    fn descend<F: Fn(&NodeSplit) -> bool>(&self, goes_left: F) -> NodeIndex {
        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            match (node.split(), node.left_child(), node.right_child()) {
                (Some(split), Some(left), Some(right)) => {
                    index = if goes_left(split) { left } else { right };
                }
                _ => return index,
            }
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(tree: &Tree, f: &mut fmt::Formatter<'_>, index: NodeIndex) -> fmt::Result {
            let node = &tree.nodes[index];
            writeln!(f, "{:indent$}{}", "", node, indent = 2 * (node.depth() - 1))?;
            if let (Some(left), Some(right)) = (node.left_child(), node.right_child()) {
                write_node(tree, f, left)?;
                write_node(tree, f, right)?;
            }
            Ok(())
        }
        write_node(self, f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        let mut tree = Tree::new(0.0, 1.0, 4);
        let split = NodeSplit {
            feature: 1,
            threshold_bin: 0,
            threshold: 0.5,
            gain: 2.0,
        };
        tree.split_leaf(
            0,
            split,
            TreeNode::new_leaf(2, 2, -1.0, 0.0, 2),
            TreeNode::new_leaf(3, 2, 1.0, 0.0, 2),
        );
        tree
    }

    #[test]
    fn test_predict_routes_on_threshold() {
        let tree = stump();
        assert_eq!(tree.num_nodes(), 3);
        assert_eq!(tree.num_leaves(), 2);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.predict(&[9.0, 0.5]), -1.0);
        assert_eq!(tree.predict(&[9.0, 0.6]), 1.0);
        // Missing feature reads as 0.0.
        assert_eq!(tree.predict(&[9.0]), -1.0);
    }

    #[test]
    fn test_output_by_node_id() {
        let tree = stump();
        assert_eq!(tree.output_by_node_id(ROOT_NODE_ID), Some(0.0));
        assert_eq!(tree.output_by_node_id(3), Some(1.0));
        assert_eq!(tree.output_by_node_id(4), None);
        assert_eq!(tree.index_of(2), Some(1));
    }

    #[test]
    fn test_display_lists_every_node() {
        let text = stump().to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with("  leaf 2"));
    }
}
