//! Pending nodes awaiting a split decision.

use crate::core::types::{NodeId, NodeIndex};
use crate::tree::histogram::NodeStats;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A leaf of the tree under construction that may still be split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    /// Arena index of the node in the tree
    pub node: NodeIndex,
    /// Binary id of the node
    pub id: NodeId,
    /// Depth of the node, root = 1
    pub depth: usize,
    /// Gain baseline
    pub stats: NodeStats,
    /// Admission priority
    pub impurity: f64,
}

impl Eq for SplitCandidate {}

impl Ord for SplitCandidate {
    /// Higher impurity first; on equal impurity the smaller id first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.impurity
            .total_cmp(&other.impurity)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for SplitCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-heap of candidates keyed by impurity.
#[derive(Debug, Clone, Default)]
pub struct CandidateQueue {
    heap: BinaryHeap<SplitCandidate>,
}

impl CandidateQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a candidate
    pub fn push(&mut self, candidate: SplitCandidate) {
        self.heap.push(candidate);
    }

    /// Pops up to `max` candidates, highest priority first.
    pub fn pop_batch(&mut self, max: usize) -> Vec<SplitCandidate> {
        let mut batch = Vec::with_capacity(max.min(self.heap.len()));
        while batch.len() < max {
            match self.heap.pop() {
                Some(candidate) => batch.push(candidate),
                None => break,
            }
        }
        batch
    }

    /// Number of queued candidates
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: NodeId, impurity: f64) -> SplitCandidate {
        SplitCandidate {
            node: id as usize,
            id,
            depth: 2,
            stats: NodeStats::default(),
            impurity,
        }
    }

    #[test]
    fn test_pop_batch_orders_by_impurity_then_id() {
        let mut queue = CandidateQueue::new();
        queue.push(candidate(4, 0.5));
        queue.push(candidate(3, 2.0));
        queue.push(candidate(5, 0.5));
        queue.push(candidate(2, 0.1));

        let batch = queue.pop_batch(3);
        let ids: Vec<NodeId> = batch.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_batch(10).len(), 1);
        assert!(queue.is_empty());
    }
}
