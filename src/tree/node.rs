//! Tree node stored in a tree arena.
//!
//! A node is a leaf until [`TreeNode::set_split`] attaches a split and the arena
//! indices of its two children.

use crate::core::types::{BinIndex, FeatureIndex, NodeId, NodeIndex, Score};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Split attached to an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSplit {
    /// Feature tested by the split
    pub feature: FeatureIndex,
    /// Samples with `bin <= threshold_bin` go left
    pub threshold_bin: BinIndex,
    /// Rows with `value <= threshold` go left
    pub threshold: f64,
    /// Gain of the split
    pub gain: f64,
}

/// Tree node representation supporting both internal and leaf nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Binary identifier, root = 1
    id: NodeId,
    /// Depth, root = 1
    depth: usize,
    /// Output used when the node is a leaf
    output: Score,
    /// Gradient variance of the node's samples
    impurity: f64,
    /// Number of training samples that reached the node
    data_count: usize,
    /// Split, for internal nodes only
    split: Option<NodeSplit>,
    /// Arena indices of the children, for internal nodes only
    children: Option<(NodeIndex, NodeIndex)>,
}

impl TreeNode {
    /// Creates a new leaf node.
    pub fn new_leaf(
        id: NodeId,
        depth: usize,
        output: Score,
        impurity: f64,
        data_count: usize,
    ) -> Self {
        TreeNode {
            id,
            depth,
            output,
            impurity,
            data_count,
            split: None,
            children: None,
        }
    }

    /// Returns true if this node is a leaf node.
    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }

    /// Binary identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Depth, root = 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Stored output.
    pub fn output(&self) -> Score {
        self.output
    }

    /// Impurity at creation time.
    pub fn impurity(&self) -> f64 {
        self.impurity
    }

    /// Number of training samples in the node.
    pub fn data_count(&self) -> usize {
        self.data_count
    }

    /// Split, if internal.
    pub fn split(&self) -> Option<&NodeSplit> {
        self.split.as_ref()
    }

    /// Left child arena index, if internal.
    pub fn left_child(&self) -> Option<NodeIndex> {
        self.children.map(|(left, _)| left)
    }

    /// Right child arena index, if internal.
    pub fn right_child(&self) -> Option<NodeIndex> {
        self.children.map(|(_, right)| right)
    }

    /// Converts this node from leaf to internal node with the given split.
    pub fn set_split(&mut self, split: NodeSplit, left: NodeIndex, right: NodeIndex) {
        self.split = Some(split);
        self.children = Some((left, right));
    }

    /// Identifier of the left child.
    pub fn left_child_id(&self) -> NodeId {
        self.id * 2
    }

    /// Identifier of the right child.
    pub fn right_child_id(&self) -> NodeId {
        self.id * 2 + 1
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.split {
            Some(split) => write!(
                f,
                "node {} [f{} <= {:.6}, gain {:.6}, n {}]",
                self.id, split.feature, split.threshold, split.gain, self.data_count
            ),
            None => write!(
                f,
                "leaf {} [output {:.6}, n {}]",
                self.id, self.output, self.data_count
            ),
        }
    }
}
