//! Training objectives.

pub mod lambdarank;

pub use lambdarank::{LambdaRank, LambdaRankConfig};
