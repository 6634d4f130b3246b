//! Split search and child statistics.

pub mod finder;

pub use finder::{SplitFinder, SplitInfo};

use crate::core::constants::LEAF_OUTPUT_EPSILON;
use crate::core::types::Score;
use crate::tree::histogram::NodeStats;

/// Replaces `current` with `candidate` if it has strictly greater gain.
/// Candidates must be offered in increasing feature order so ties go to the
/// lowest feature.
pub fn keep_better(current: &mut Option<SplitInfo>, candidate: Option<SplitInfo>) {
    if let Some(candidate) = candidate {
        match current {
            Some(best) if candidate.gain <= best.gain => {}
            _ => *current = Some(candidate),
        }
    }
}

/// Statistics gathered for a child while its parent's samples are
/// reassigned.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChildStats {
    /// Number of samples
    pub count: usize,
    /// Sum of gradients
    pub sum_gradient: f64,
    /// Sum of squared gradients
    pub sum_squared_gradient: f64,
    /// Sum of hessians
    pub sum_hessian: f64,
}

impl ChildStats {
    /// Adds one sample.
    #[inline]
    pub fn add(&mut self, gradient: f64, hessian: f64) {
        self.count += 1;
        self.sum_gradient += gradient;
        self.sum_squared_gradient += gradient * gradient;
        self.sum_hessian += hessian;
    }

    /// Gradient variance within the child; 0 for an empty child.
    pub fn impurity(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        (self.sum_squared_gradient - self.sum_gradient * self.sum_gradient / n) / n
    }

    /// Newton step `-g / (2h + eps)` clamped to `[-max_output, max_output]`.
    ///
    /// Gradients are signed so that raising a score lowers the loss where the
    /// gradient is negative, hence the leading minus.
    pub fn output(&self, max_output: f64) -> Score {
        let raw = -self.sum_gradient / (2.0 * self.sum_hessian + LEAF_OUTPUT_EPSILON);
        raw.clamp(-max_output, max_output)
    }

    /// Count and gradient sum for histogram gain baselines.
    pub fn node_stats(&self) -> NodeStats {
        NodeStats::new(self.count as f64, self.sum_gradient)
    }
}
