//! DCG tables and the NDCG@k evaluator.
//!
//! Gains follow the configured label gain table (`2^label - 1` by default)
//! and positions are discounted by `1 / log2(2 + position)`, positions
//! counted from 0.

use crate::core::types::{DataSize, Label, Score};

/// Number of precomputed position discounts. Later positions are computed
/// on demand.
pub const DISCOUNT_TABLE_SIZE: usize = 10_000;

/// Sample indices of a group ordered by descending score. Equal scores keep
/// their input order.
pub fn sort_by_score_desc(scores: &[Score]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Label gain and position discount tables.
#[derive(Debug, Clone, PartialEq)]
pub struct DcgCalculator {
    label_gain: Vec<f64>,
    discount: Vec<f64>,
}

impl DcgCalculator {
    /// Builds the tables. `label_gain[i]` is the gain of label `i`.
    pub fn new(label_gain: Vec<f64>) -> Self {
        let discount = (0..DISCOUNT_TABLE_SIZE)
            .map(|position| 1.0 / (2.0 + position as f64).log2())
            .collect();
        DcgCalculator {
            label_gain,
            discount,
        }
    }

    /// Gain of a label. Labels past the table have no gain; the booster
    /// rejects them before training.
    #[inline]
    pub fn label_gain(&self, label: Label) -> f64 {
        self.label_gain.get(label as usize).copied().unwrap_or(0.0)
    }

    /// The label gain table
    pub fn label_gains(&self) -> &[f64] {
        &self.label_gain
    }

    /// Discount of a 0-based position.
    #[inline]
    pub fn discount(&self, position: usize) -> f64 {
        match self.discount.get(position) {
            Some(&discount) => discount,
            None => 1.0 / (2.0 + position as f64).log2(),
        }
    }

    /// DCG of the top `k` samples ranked by `scores`.
    pub fn dcg_at_k(&self, k: usize, labels: &[Label], scores: &[Score]) -> f64 {
        let order = sort_by_score_desc(scores);
        order
            .iter()
            .take(k)
            .enumerate()
            .map(|(position, &i)| self.label_gain(labels[i]) * self.discount(position))
            .sum()
    }

    /// DCG at each of `ks` for one ranking.
    pub fn dcg_at_ks(&self, ks: &[usize], labels: &[Label], scores: &[Score]) -> Vec<f64> {
        let order = sort_by_score_desc(scores);
        let gains: Vec<f64> = order.iter().map(|&i| self.label_gain(labels[i])).collect();
        self.prefix_dcgs(ks, &gains)
    }

    /// DCG of the ideal ranking of `labels` at depth `k`.
    pub fn max_dcg_at_k(&self, k: usize, labels: &[Label]) -> f64 {
        self.max_dcg_at_ks(&[k], labels)[0]
    }

    /// Ideal DCG at each of `ks`.
    pub fn max_dcg_at_ks(&self, ks: &[usize], labels: &[Label]) -> Vec<f64> {
        let mut gains: Vec<f64> = labels.iter().map(|&label| self.label_gain(label)).collect();
        gains.sort_by(|a, b| b.total_cmp(a));
        self.prefix_dcgs(ks, &gains)
    }

    fn prefix_dcgs(&self, ks: &[usize], ranked_gains: &[f64]) -> Vec<f64> {
        let max_k = ks.iter().copied().max().unwrap_or(0).min(ranked_gains.len());
        let mut prefix = Vec::with_capacity(max_k + 1);
        prefix.push(0.0);
        let mut dcg = 0.0;
        for (position, gain) in ranked_gains.iter().take(max_k).enumerate() {
            dcg += gain * self.discount(position);
            prefix.push(dcg);
        }
        ks.iter().map(|&k| prefix[k.min(max_k)]).collect()
    }
}

/// Mean NDCG@k over the query groups of one dataset.
#[derive(Debug, Clone)]
pub struct NdcgEvaluator {
    eval_at: Vec<usize>,
    calculator: DcgCalculator,
    labels: Vec<Label>,
    query_boundaries: Vec<DataSize>,
    /// `1 / ideal DCG@k` per query and k, 0 when the ideal DCG is 0
    inverse_max_dcgs: Vec<Vec<f64>>,
}

impl NdcgEvaluator {
    /// Precomputes the ideal DCGs of every query.
    pub fn new(
        eval_at: Vec<usize>,
        label_gain: Vec<f64>,
        labels: &[Label],
        query_boundaries: &[DataSize],
    ) -> Self {
        let calculator = DcgCalculator::new(label_gain);
        let inverse_max_dcgs = query_boundaries
            .windows(2)
            .map(|bounds| {
                calculator
                    .max_dcg_at_ks(&eval_at, &labels[bounds[0]..bounds[1]])
                    .into_iter()
                    .map(|max_dcg| if max_dcg > 0.0 { 1.0 / max_dcg } else { 0.0 })
                    .collect()
            })
            .collect();

        NdcgEvaluator {
            eval_at,
            calculator,
            labels: labels.to_vec(),
            query_boundaries: query_boundaries.to_vec(),
            inverse_max_dcgs,
        }
    }

    /// Evaluation depths
    pub fn eval_at(&self) -> &[usize] {
        &self.eval_at
    }

    /// Metric names, such as `ndcg@3`
    pub fn names(&self) -> Vec<String> {
        self.eval_at.iter().map(|k| format!("ndcg@{}", k)).collect()
    }

    /// NDCG@k for every configured k, averaged over query groups. A group
    /// whose ideal DCG is 0 counts as 1.0.
    pub fn eval(&self, scores: &[Score]) -> Vec<f64> {
        let num_queries = self.query_boundaries.len().saturating_sub(1);
        if num_queries == 0 {
            return vec![1.0; self.eval_at.len()];
        }

        let mut sums = vec![0.0; self.eval_at.len()];
        for (query, bounds) in self.query_boundaries.windows(2).enumerate() {
            let (start, end) = (bounds[0], bounds[1]);
            let inverse = &self.inverse_max_dcgs[query];
            if inverse.iter().all(|&value| value == 0.0) {
                sums.iter_mut().for_each(|sum| *sum += 1.0);
                continue;
            }

            let dcgs = self.calculator.dcg_at_ks(
                &self.eval_at,
                &self.labels[start..end],
                &scores[start..end],
            );
            for ((sum, dcg), inverse) in sums.iter_mut().zip(dcgs).zip(inverse) {
                *sum += if *inverse > 0.0 { dcg * inverse } else { 1.0 };
            }
        }

        sums.iter().map(|sum| sum / num_queries as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_gains(max_label: usize) -> Vec<f64> {
        (0..=max_label).map(|i| ((1u64 << i) - 1) as f64).collect()
    }

    #[test]
    fn test_discount_table() {
        let calculator = DcgCalculator::new(default_gains(3));
        assert_relative_eq!(calculator.discount(0), 1.0);
        assert_relative_eq!(calculator.discount(2), 0.5);
        assert_relative_eq!(
            calculator.discount(DISCOUNT_TABLE_SIZE + 5),
            1.0 / ((DISCOUNT_TABLE_SIZE + 7) as f64).log2()
        );
    }

    #[test]
    fn test_dcg_at_k() {
        let calculator = DcgCalculator::new(default_gains(3));
        let labels = [0, 3, 1];
        let scores = [0.5, 0.1, 0.9];
        // Ranking: sample 2 (gain 1), sample 0 (gain 0), sample 1 (gain 7).
        let expected = 1.0 + 0.0 + 7.0 * 0.5;
        assert_relative_eq!(calculator.dcg_at_k(3, &labels, &scores), expected);
        assert_relative_eq!(calculator.dcg_at_k(1, &labels, &scores), 1.0);
        assert_eq!(
            calculator.dcg_at_ks(&[1, 3, 10], &labels, &scores),
            vec![1.0, expected, expected]
        );
        // Ideal: 7, 1, 0
        assert_relative_eq!(
            calculator.max_dcg_at_k(2, &labels),
            7.0 + 1.0 / 3f64.log2()
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        assert_eq!(sort_by_score_desc(&[1.0, 2.0, 1.0, 2.0]), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_perfect_ranking_scores_one() {
        let labels = [3, 2, 3, 0, 1, 2, 2, 2, 1, 0, 3];
        let boundaries = [0, 6, 9, 11];
        let scores: Vec<f64> = labels.iter().map(|&l| l as f64).collect();
        let evaluator = NdcgEvaluator::new(vec![1, 3, 5, 10], default_gains(3), &labels, &boundaries);
        for value in evaluator.eval(&scores) {
            assert_relative_eq!(value, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reversed_ranking_scores_below_one() {
        let labels = [0, 1, 2, 3];
        let scores = [4.0, 3.0, 2.0, 1.0];
        let evaluator = NdcgEvaluator::new(vec![1, 4], default_gains(3), &labels, &[0, 4]);
        let result = evaluator.eval(&scores);
        assert_eq!(result[0], 0.0);
        assert!(result[1] > 0.0 && result[1] < 1.0);
        assert_eq!(evaluator.names(), vec!["ndcg@1", "ndcg@4"]);
    }

    #[test]
    fn test_zero_gain_group_counts_as_perfect() {
        let labels = [0, 0, 2, 1];
        let boundaries = [0, 2, 4];
        let evaluator = NdcgEvaluator::new(vec![1], default_gains(2), &labels, &boundaries);
        // Second group is ranked worst-first.
        let result = evaluator.eval(&[0.3, 0.9, 0.0, 1.0]);
        let second = 1.0 / 3.0;
        assert_relative_eq!(result[0], (1.0 + second) / 2.0);
    }
}
