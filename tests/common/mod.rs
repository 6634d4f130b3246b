//! Common test utilities for LambdaMART integration tests.

#![allow(dead_code)]

use lambdamart::{Label, RawDataset};
use ndarray::Array2;
use rand::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Dense ranking data: `num_queries` groups of `group_size` documents whose
/// relevance is driven by the first two features plus noise.
pub fn create_ranking_dataset(
    num_queries: usize,
    group_size: usize,
    num_features: usize,
    seed: u64,
) -> RawDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let num_samples = num_queries * group_size;

    let mut features = Array2::zeros((num_samples, num_features));
    for i in 0..num_samples {
        for j in 0..num_features {
            features[[i, j]] = rng.gen_range(0.0..1.0);
        }
    }

    let labels = (0..num_samples)
        .map(|i| {
            let signal = 2.0 * features[[i, 0]] + features[[i, 1.min(num_features - 1)]];
            let noisy: f64 = signal + rng.gen_range(-0.2..0.2);
            noisy.clamp(0.0, 2.99) as Label
        })
        .collect();

    RawDataset::from_dense(features.view(), labels, &vec![group_size; num_queries])
        .expect("synthetic dataset is well formed")
}

/// Ranking data where most feature values are exactly zero, so the binned
/// columns qualify for the sparse layout.
pub fn create_sparse_ranking_dataset(
    num_queries: usize,
    group_size: usize,
    num_features: usize,
    seed: u64,
) -> RawDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let num_samples = num_queries * group_size;

    let mut features = Array2::zeros((num_samples, num_features));
    for i in 0..num_samples {
        for j in 0..num_features {
            if rng.gen_bool(0.1) {
                features[[i, j]] = rng.gen_range(1.0..10.0);
            }
        }
    }

    let labels = (0..num_samples)
        .map(|i| {
            let hits = (0..num_features).filter(|&j| features[[i, j]] > 0.0).count();
            hits.min(3) as Label
        })
        .collect();

    RawDataset::from_dense(features.view(), labels, &vec![group_size; num_queries])
        .expect("synthetic dataset is well formed")
}

/// Writes a dataset in the `<label> <idx>:<val> ...` text format together
/// with its query file. Returns `(data_path, query_path)`.
pub fn write_text_dataset(dir: &Path, name: &str, raw: &RawDataset) -> (PathBuf, PathBuf) {
    let dense = raw.to_dense(raw.num_features());
    let mut data = String::new();
    for (row, label) in dense.outer_iter().zip(raw.labels()) {
        data.push_str(&label.to_string());
        for (j, value) in row.iter().enumerate() {
            if *value != 0.0 {
                data.push_str(&format!(" {}:{}", j + 1, value));
            }
        }
        data.push('\n');
    }

    let mut query = String::new();
    for bounds in raw.query_boundaries().windows(2) {
        query.push_str(&format!("{}\n", bounds[1] - bounds[0]));
    }

    let data_path = dir.join(format!("{}.data", name));
    let query_path = dir.join(format!("{}.query", name));
    fs::write(&data_path, data).expect("write data file");
    fs::write(&query_path, query).expect("write query file");
    (data_path, query_path)
}
