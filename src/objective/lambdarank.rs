//! LambdaRank pairwise gradients.
//!
//! For every pair of samples in a query group with different labels, the
//! pair's lambda is the sigmoid of the score difference weighted by the NDCG
//! change of swapping the two. The higher-labelled sample receives the
//! negative lambda, so descending along the gradient lifts its score.

use crate::config::Config;
use crate::core::constants::{
    DEFAULT_EVAL_AT, DEFAULT_MAX_LABEL, DEFAULT_MAX_POSITION, DEFAULT_NUM_THREADS,
    DEFAULT_SIGMOID, SCORE_DISTANCE_OFFSET, SIGMOID_INPUT_RANGE, SIGMOID_TABLE_BINS,
};
use crate::core::error::{LambdaMartError, Result};
use crate::core::types::{DataSize, Label, Score};
use crate::metrics::{sort_by_score_desc, DcgCalculator, NdcgEvaluator};
use rayon::prelude::*;

/// Parameters of the LambdaRank objective.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaRankConfig {
    /// Steepness of the pairwise sigmoid
    pub sigmoid: f64,
    /// Depth of the ideal DCG used for normalization
    pub max_position: usize,
    /// Gain per label
    pub label_gain: Vec<f64>,
    /// NDCG evaluation depths
    pub eval_at: Vec<usize>,
    /// Worker threads for the per-group pass
    pub num_threads: usize,
}

impl Default for LambdaRankConfig {
    fn default() -> Self {
        LambdaRankConfig {
            sigmoid: DEFAULT_SIGMOID,
            max_position: DEFAULT_MAX_POSITION,
            label_gain: (0..=DEFAULT_MAX_LABEL)
                .map(|i| ((1u64 << i) - 1) as f64)
                .collect(),
            eval_at: DEFAULT_EVAL_AT.to_vec(),
            num_threads: DEFAULT_NUM_THREADS,
        }
    }
}

impl From<&Config> for LambdaRankConfig {
    fn from(config: &Config) -> Self {
        LambdaRankConfig {
            sigmoid: config.sigmoid,
            max_position: config.max_position,
            label_gain: config.label_gain_table(),
            eval_at: config.eval_at.clone(),
            num_threads: config.effective_num_threads(),
        }
    }
}

/// Precomputed `1 / (1 + exp(sigmoid * x))` over a bounded input range.
#[derive(Debug, Clone)]
struct SigmoidTable {
    values: Vec<f64>,
    min_input: f64,
    max_input: f64,
    index_factor: f64,
}

impl SigmoidTable {
    fn new(sigmoid: f64) -> Self {
        let min_input = -SIGMOID_INPUT_RANGE / sigmoid / 2.0;
        let max_input = -min_input;
        let index_factor = SIGMOID_TABLE_BINS as f64 / (max_input - min_input);
        let values = (0..SIGMOID_TABLE_BINS)
            .map(|i| {
                let x = i as f64 / index_factor + min_input;
                1.0 / (1.0 + (x * sigmoid).exp())
            })
            .collect();
        SigmoidTable {
            values,
            min_input,
            max_input,
            index_factor,
        }
    }

    #[inline]
    fn get(&self, x: f64) -> f64 {
        let last = self.values.len() - 1;
        if x <= self.min_input {
            self.values[0]
        } else if x >= self.max_input {
            self.values[last]
        } else {
            let index = ((x - self.min_input) * self.index_factor) as usize;
            self.values[index.min(last)]
        }
    }
}

/// LambdaRank objective over the query groups of one dataset.
#[derive(Debug)]
pub struct LambdaRank {
    labels: Vec<Label>,
    query_boundaries: Vec<DataSize>,
    calculator: DcgCalculator,
    /// `1 / ideal DCG@max_position` per query, 0 when the ideal DCG is 0
    inverse_max_dcgs: Vec<f64>,
    sigmoid_table: SigmoidTable,
    evaluator: NdcgEvaluator,
    pool: Option<rayon::ThreadPool>,
}

impl LambdaRank {
    /// Builds gain, discount and sigmoid tables and the per-query
    /// normalizers.
    pub fn new(
        labels: &[Label],
        query_boundaries: &[DataSize],
        config: &LambdaRankConfig,
    ) -> Result<Self> {
        let calculator = DcgCalculator::new(config.label_gain.clone());
        let inverse_max_dcgs = query_boundaries
            .windows(2)
            .map(|bounds| {
                let max_dcg =
                    calculator.max_dcg_at_k(config.max_position, &labels[bounds[0]..bounds[1]]);
                if max_dcg > 0.0 {
                    1.0 / max_dcg
                } else {
                    0.0
                }
            })
            .collect();

        let evaluator = NdcgEvaluator::new(
            config.eval_at.clone(),
            config.label_gain.clone(),
            labels,
            query_boundaries,
        );

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

        Ok(LambdaRank {
            labels: labels.to_vec(),
            query_boundaries: query_boundaries.to_vec(),
            calculator,
            inverse_max_dcgs,
            sigmoid_table: SigmoidTable::new(config.sigmoid),
            evaluator,
            pool,
        })
    }

    /// Number of samples
    pub fn num_samples(&self) -> usize {
        self.labels.len()
    }

    /// Number of query groups
    pub fn num_queries(&self) -> usize {
        self.query_boundaries.len().saturating_sub(1)
    }

    /// `1 / (1 + exp(sigmoid * x))` from the lookup table
    pub fn sigmoid(&self, x: f64) -> f64 {
        self.sigmoid_table.get(x)
    }

    /// Names of the values returned by [`eval`](Self::eval)
    pub fn eval_names(&self) -> Vec<String> {
        self.evaluator.names()
    }

    /// Mean NDCG at every configured depth.
    pub fn eval(&self, scores: &[Score]) -> Vec<f64> {
        self.evaluator.eval(scores)
    }

    /// Overwrites `gradients` and `hessians` with the LambdaRank derivatives
    /// at `scores`.
    pub fn get_derivatives(
        &self,
        scores: &[Score],
        gradients: &mut [Score],
        hessians: &mut [Score],
    ) -> Result<()> {
        let n = self.num_samples();
        for len in [scores.len(), gradients.len(), hessians.len()] {
            if len != n {
                return Err(LambdaMartError::dimension_mismatch(
                    format!("{} scores", n),
                    format!("{} scores", len),
                ));
            }
        }

        let groups: Vec<(usize, &mut [Score], &mut [Score])> = split_groups(
            &self.query_boundaries,
            gradients,
        )
        .into_iter()
        .zip(split_groups(&self.query_boundaries, hessians))
        .enumerate()
        .map(|(query, (g, h))| (query, g, h))
        .collect();

        match &self.pool {
            Some(pool) => pool.install(|| {
                groups
                    .into_par_iter()
                    .for_each(|(query, g, h)| self.group_derivatives(query, scores, g, h));
            }),
            None => groups
                .into_iter()
                .for_each(|(query, g, h)| self.group_derivatives(query, scores, g, h)),
        }
        Ok(())
    }

    fn group_derivatives(
        &self,
        query: usize,
        all_scores: &[Score],
        gradients: &mut [Score],
        hessians: &mut [Score],
    ) {
        gradients.fill(0.0);
        hessians.fill(0.0);

        let inverse_max_dcg = self.inverse_max_dcgs[query];
        if inverse_max_dcg == 0.0 {
            return;
        }

        let start = self.query_boundaries[query];
        let end = self.query_boundaries[query + 1];
        let labels = &self.labels[start..end];
        let scores = &all_scores[start..end];
        let order = sort_by_score_desc(scores);

        let best_score = scores[order[0]];
        let worst_score = order
            .iter()
            .rev()
            .map(|&i| scores[i])
            .find(|&score| score != f64::NEG_INFINITY)
            .unwrap_or(best_score);
        let regularize = best_score != worst_score;

        for (rank_i, &i) in order.iter().enumerate() {
            if scores[i] == f64::NEG_INFINITY {
                continue;
            }
            for (rank_j, &j) in order.iter().enumerate().skip(rank_i + 1) {
                if labels[i] == labels[j] || scores[j] == f64::NEG_INFINITY {
                    continue;
                }
                let (high, high_rank, low, low_rank) = if labels[i] > labels[j] {
                    (i, rank_i, j, rank_j)
                } else {
                    (j, rank_j, i, rank_i)
                };

                let delta_score = scores[high] - scores[low];
                let gain_diff = self.calculator.label_gain(labels[high])
                    - self.calculator.label_gain(labels[low]);
                let discount_diff = (self.calculator.discount(high_rank)
                    - self.calculator.discount(low_rank))
                .abs();
                let mut delta_ndcg = gain_diff * discount_diff * inverse_max_dcg;
                if regularize {
                    delta_ndcg /= SCORE_DISTANCE_OFFSET + delta_score.abs();
                }

                let p = self.sigmoid(delta_score);
                let lambda = -p * delta_ndcg;
                let hessian = p * (2.0 - p) * 2.0 * delta_ndcg;

                gradients[high] += lambda;
                hessians[high] += hessian;
                gradients[low] -= lambda;
                hessians[low] += hessian;
            }
        }
    }
}

/// Cuts `values` into one mutable slice per query group.
fn split_groups<'a>(boundaries: &[DataSize], values: &'a mut [Score]) -> Vec<&'a mut [Score]> {
    let mut groups = Vec::with_capacity(boundaries.len().saturating_sub(1));
    let mut rest = values;
    for bounds in boundaries.windows(2) {
        let (group, tail) = std::mem::take(&mut rest).split_at_mut(bounds[1] - bounds[0]);
        groups.push(group);
        rest = tail;
    }
    groups
}
