//! Dataset management module.
//!
//! [`RawDataset`] is the structured, in-memory form produced by the text
//! loaders (or built directly from an `ndarray` matrix). [`BinnedDataset`]
//! is its discretized, frozen form consumed by the tree learner.

pub mod binning;
pub mod dataset;
pub mod loader;

pub use binning::{BinMapper, BinningConfig, FeatureBinner};
pub use dataset::{BinnedDataset, BinnedFeature, FeatureColumn, SparseColumn};
pub use loader::TextLoader;

use crate::core::error::{LambdaMartError, Result};
use crate::core::types::{DataSize, FeatureIndex, Label};
use ndarray::{Array2, ArrayView2};

/// Raw feature values, labels and query groups.
///
/// Features are stored column-wise and sparsely: each column lists the
/// `(sample, value)` pairs in increasing sample order, and samples without an
/// entry have value `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataset {
    num_samples: usize,
    labels: Vec<Label>,
    columns: Vec<Vec<(DataSize, f64)>>,
    query_boundaries: Vec<DataSize>,
}

impl RawDataset {
    /// Assembles a dataset from column-wise entries and validates it.
    pub fn new(
        num_samples: usize,
        labels: Vec<Label>,
        columns: Vec<Vec<(DataSize, f64)>>,
        query_boundaries: Vec<DataSize>,
    ) -> Result<Self> {
        let dataset = RawDataset {
            num_samples,
            labels,
            columns,
            query_boundaries,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Builds a dataset from sparse rows of zero-based `(feature, value)`
    /// pairs and per-query group sizes.
    pub fn from_rows(
        rows: &[Vec<(FeatureIndex, f64)>],
        labels: Vec<Label>,
        group_sizes: &[usize],
    ) -> Result<Self> {
        let num_features = rows
            .iter()
            .flat_map(|row| row.iter().map(|&(feature, _)| feature + 1))
            .max()
            .unwrap_or(0);

        let mut columns: Vec<Vec<(DataSize, f64)>> = vec![Vec::new(); num_features];
        for (sample, row) in rows.iter().enumerate() {
            for &(feature, value) in row {
                columns[feature].push((sample, value));
            }
        }
        for column in &mut columns {
            column.dedup_by_key(|(sample, _)| *sample);
        }

        Self::new(
            rows.len(),
            labels,
            columns,
            boundaries_from_group_sizes(group_sizes)?,
        )
    }

    /// Builds a dataset from a dense `samples x features` matrix. Exact zeros
    /// are left implicit.
    pub fn from_dense(
        features: ArrayView2<'_, f64>,
        labels: Vec<Label>,
        group_sizes: &[usize],
    ) -> Result<Self> {
        let columns: Vec<Vec<(DataSize, f64)>> = features
            .columns()
            .into_iter()
            .map(|column| {
                column
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|&(_, value)| value != 0.0)
                    .collect::<Vec<(DataSize, f64)>>()
            })
            .collect();

        Self::new(
            features.nrows(),
            labels,
            columns,
            boundaries_from_group_sizes(group_sizes)?,
        )
    }

    /// Checks label count, entry ordering and query boundaries.
    pub fn validate(&self) -> Result<()> {
        if self.labels.len() != self.num_samples {
            return Err(LambdaMartError::dimension_mismatch(
                format!("{} labels", self.num_samples),
                format!("{} labels", self.labels.len()),
            ));
        }

        for (feature, column) in self.columns.iter().enumerate() {
            let ordered = column.windows(2).all(|w| w[0].0 < w[1].0);
            let in_range = column.last().map_or(true, |&(s, _)| s < self.num_samples);
            if !ordered || !in_range {
                return Err(LambdaMartError::dataset(format!(
                    "Feature {} entries must have increasing sample indices below {}",
                    feature, self.num_samples
                )));
            }
            if let Some(&(sample, value)) = column.iter().find(|(_, v)| !v.is_finite()) {
                return Err(LambdaMartError::dataset(format!(
                    "Feature {} of sample {} is not finite: {}",
                    feature, sample, value
                )));
            }
        }

        validate_query_boundaries(&self.query_boundaries, self.num_samples)
    }

    /// Number of samples
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of feature columns
    pub fn num_features(&self) -> usize {
        self.columns.len()
    }

    /// Relevance labels
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Replaces the labels, e.g. with those read from a separate label file.
    pub fn set_labels(&mut self, labels: Vec<Label>) -> Result<()> {
        if labels.len() != self.num_samples {
            return Err(LambdaMartError::dimension_mismatch(
                format!("{} labels", self.num_samples),
                format!("{} labels", labels.len()),
            ));
        }
        self.labels = labels;
        Ok(())
    }

    /// Column-wise sparse entries
    pub fn columns(&self) -> &[Vec<(DataSize, f64)>] {
        &self.columns
    }

    /// Query boundaries
    pub fn query_boundaries(&self) -> &[DataSize] {
        &self.query_boundaries
    }

    /// Expands to a dense `samples x num_features` matrix. Columns beyond
    /// this dataset's feature count are zero.
    pub fn to_dense(&self, num_features: usize) -> Array2<f64> {
        let mut dense = Array2::zeros((self.num_samples, num_features));
        for (feature, column) in self.columns.iter().enumerate().take(num_features) {
            for &(sample, value) in column {
                dense[[sample, feature]] = value;
            }
        }
        dense
    }
}

/// Converts per-query group sizes into cumulative boundaries with a leading 0.
pub fn boundaries_from_group_sizes(group_sizes: &[usize]) -> Result<Vec<DataSize>> {
    let mut boundaries = Vec::with_capacity(group_sizes.len() + 1);
    boundaries.push(0);
    let mut total = 0;
    for (query, &size) in group_sizes.iter().enumerate() {
        if size == 0 {
            return Err(LambdaMartError::dataset(format!(
                "Query {} has an empty group",
                query
            )));
        }
        total += size;
        boundaries.push(total);
    }
    Ok(boundaries)
}

/// Checks that boundaries start at 0, increase strictly and end at `num_samples`.
pub fn validate_query_boundaries(boundaries: &[DataSize], num_samples: usize) -> Result<()> {
    if boundaries.first() != Some(&0) {
        return Err(LambdaMartError::dataset(
            "Query boundaries must start at 0",
        ));
    }
    if !boundaries.windows(2).all(|w| w[0] < w[1]) {
        return Err(LambdaMartError::dataset(
            "Query boundaries must be strictly increasing",
        ));
    }
    let last = boundaries.last().copied().unwrap_or(0);
    if last != num_samples {
        return Err(LambdaMartError::dimension_mismatch(
            format!("query groups covering {} samples", num_samples),
            format!("{} samples", last),
        ));
    }
    Ok(())
}
