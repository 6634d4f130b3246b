//! NDCG evaluation properties.

use approx::assert_relative_eq;
use lambdamart::metrics::{DcgCalculator, NdcgEvaluator};

fn gains() -> Vec<f64> {
    vec![0.0, 1.0, 3.0, 7.0]
}

#[test]
fn test_perfect_ranking_scores_one() {
    let labels = [3, 2, 3, 0, 1, 2, 2, 2, 1, 0, 3];
    let boundaries = [0, 6, 9, 11];
    let scores: Vec<f64> = labels.iter().map(|&l| l as f64).collect();

    let evaluator = NdcgEvaluator::new(vec![1, 3, 5, 10], gains(), &labels, &boundaries);
    for value in evaluator.eval(&scores) {
        assert_relative_eq!(value, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_reversed_ranking_scores_below_one() {
    let labels = [3, 2, 1, 0];
    let scores = [0.0, 1.0, 2.0, 3.0];
    let evaluator = NdcgEvaluator::new(vec![1, 4], gains(), &labels, &[0, 4]);
    let values = evaluator.eval(&scores);
    assert_relative_eq!(values[0], 0.0);
    assert!(values[1] > 0.0 && values[1] < 1.0);
}

#[test]
fn test_hand_computed_dcg() {
    let calculator = DcgCalculator::new(gains());
    // Order by score: labels 1, 3, 0.
    let dcg = calculator.dcg_at_k(3, &[3, 1, 0], &[0.5, 0.9, 0.1]);
    let expected = 1.0 + 7.0 / 3f64.log2();
    assert_relative_eq!(dcg, expected, epsilon = 1e-12);
    assert_relative_eq!(
        calculator.max_dcg_at_k(3, &[3, 1, 0]),
        7.0 + 1.0 / 3f64.log2(),
        epsilon = 1e-12
    );
}

#[test]
fn test_query_without_relevant_documents_counts_as_one() {
    let labels = [0, 0, 2, 1];
    let evaluator = NdcgEvaluator::new(vec![2], gains(), &labels, &[0, 2, 4]);
    // Second query is misordered, first has nothing to rank.
    let values = evaluator.eval(&[0.0, 1.0, 0.0, 1.0]);
    let second = (1.0 + 3.0 / 3f64.log2()) / (3.0 + 1.0 / 3f64.log2());
    assert_relative_eq!(values[0], (1.0 + second) / 2.0, epsilon = 1e-12);
}
