//! LambdaRank gradient and hessian behaviour on small hand-built queries.

use lambdamart::objective::{LambdaRank, LambdaRankConfig};
use lambdamart::Label;

fn config() -> LambdaRankConfig {
    LambdaRankConfig {
        max_position: 1000,
        ..LambdaRankConfig::default()
    }
}

fn derivatives(labels: &[Label], boundaries: &[usize], scores: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let ranker = LambdaRank::new(labels, boundaries, &config()).unwrap();
    let mut gradients = vec![0.0; labels.len()];
    let mut hessians = vec![0.0; labels.len()];
    ranker
        .get_derivatives(scores, &mut gradients, &mut hessians)
        .unwrap();
    (gradients, hessians)
}

#[test]
fn test_three_queries_with_equal_scores() {
    let labels = [3, 2, 3, 0, 1, 2, 2, 2, 1, 0, 3];
    let boundaries = [0, 6, 9, 11];
    let (gradients, hessians) = derivatives(&labels, &boundaries, &[0.0; 11]);

    for i in 0..labels.len() {
        assert!(gradients[i] != 0.0, "gradient {} is zero", i);
        assert!(hessians[i] > 0.0, "hessian {} is not positive", i);
    }

    // Less relevant documents are pushed down.
    assert!(gradients[9] > gradients[10]);
    assert!(gradients[3] > gradients[4]);
    assert!(gradients[8] > gradients[7]);
    // Among equal labels, the one ranked higher by the stable sort has more
    // to lose against the same lower-label document.
    assert!(gradients[7] > gradients[6]);
}

#[test]
fn test_gradients_cancel_within_each_query() {
    let labels = [3, 2, 3, 0, 1, 2, 2, 2, 1, 0, 3];
    let boundaries = [0, 6, 9, 11];
    let scores = [0.3, -1.0, 2.0, 0.0, 0.5, 0.1, 1.0, 1.0, -0.5, 4.0, -4.0];
    let (gradients, _) = derivatives(&labels, &boundaries, &scores);

    for bounds in boundaries.windows(2) {
        let sum: f64 = gradients[bounds[0]..bounds[1]].iter().sum();
        assert!(sum.abs() < 1e-12);
    }
}

#[test]
fn test_two_documents_with_equal_scores() {
    let (gradients, hessians) = derivatives(&[0, 3], &[0, 2], &[0.0, 0.0]);
    assert!(gradients.iter().all(|&g| g != 0.0));
    assert!(hessians.iter().all(|&h| h > 0.0));
    assert!(gradients[0] > gradients[1]);
}

#[test]
fn test_two_documents_with_separated_scores() {
    let labels = [0, 3];
    let (gradients, hessians) = derivatives(&labels, &[0, 2], &[0.0, 3.0]);

    assert!(gradients[0] > 0.0);
    assert!(gradients[1] < 0.0);
    assert!((gradients[0] + gradients[1]).abs() < 1e-15);
    assert!(hessians.iter().all(|&h| h > 0.0));
}

#[test]
fn test_correct_order_pulls_less_than_wrong_order() {
    let labels = [0, 3];
    let (right, _) = derivatives(&labels, &[0, 2], &[0.0, 3.0]);
    let (wrong, _) = derivatives(&labels, &[0, 2], &[3.0, 0.0]);
    assert!(right[1].abs() < wrong[1].abs());
}

#[test]
fn test_all_equal_labels_produce_no_gradient() {
    let labels = [2, 2, 2, 2];
    let (gradients, hessians) = derivatives(&labels, &[0, 4], &[0.4, 0.1, -0.3, 0.0]);
    assert!(gradients.iter().all(|&g| g == 0.0));
    assert!(hessians.iter().all(|&h| h == 0.0));
}

#[test]
fn test_eval_names_follow_eval_at() {
    let ranker = LambdaRank::new(&[1, 0], &[0, 2], &config()).unwrap();
    assert_eq!(
        ranker.eval_names(),
        vec!["ndcg@1", "ndcg@3", "ndcg@5", "ndcg@10"]
    );
}
