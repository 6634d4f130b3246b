//! Histogram-based regression trees.
//!
//! - [`histogram`]: `(count, gradient)` accumulators, cumulate and the
//!   feature-blocked scan
//! - [`split`]: threshold search and child statistics
//! - [`node`] and [`tree`]: the arena tree handed to the model
//! - [`learner`]: the level-batched best-first growth loop

pub mod histogram;
pub mod learner;
pub mod node;
pub mod split;
pub mod tree;

pub use histogram::{BinStats, HistogramBuilder, HistogramMatrix, NodeStats};
pub use learner::{TreeLearner, TreeLearnerConfig};
pub use node::{NodeSplit, TreeNode};
pub use split::{ChildStats, SplitFinder, SplitInfo};
pub use tree::{Tree, ROOT_NODE_ID};
