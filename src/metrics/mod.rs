//! Ranking evaluation metrics.
//!
//! # Examples
//!
//! ```rust
//! use lambdamart::metrics::NdcgEvaluator;
//!
//! let labels = [2, 0, 1];
//! let gains = vec![0.0, 1.0, 3.0];
//! let evaluator = NdcgEvaluator::new(vec![1, 3], gains, &labels, &[0, 3]);
//!
//! let ndcg = evaluator.eval(&[0.9, 0.1, 0.5]);
//! assert!((ndcg[0] - 1.0).abs() < 1e-12);
//! ```

pub mod ranking;

pub use ranking::{sort_by_score_desc, DcgCalculator, NdcgEvaluator, DISCOUNT_TABLE_SIZE};
