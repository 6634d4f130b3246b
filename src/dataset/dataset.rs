//! Binned, read-only training data.
//!
//! A [`BinnedDataset`] stores one bin-id column per feature (feature-major),
//! each feature's frozen threshold table, the per-sample relevance labels and
//! the query group boundaries. It is built once and never mutated.

use crate::core::error::{LambdaMartError, Result};
use crate::core::types::{BinIndex, DataSize, FeatureIndex, Label};
use crate::dataset::binning::{BinMapper, BinningConfig, FeatureBinner};
use crate::dataset::RawDataset;

/// Bin ids of one feature for every sample.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureColumn {
    /// One bin id per sample
    Dense(Vec<BinIndex>),
    /// Only samples outside the most frequent bin are stored
    Sparse(SparseColumn),
}

/// Column storing only the samples whose bin differs from `default_bin`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseColumn {
    num_samples: usize,
    default_bin: BinIndex,
    /// Sample indices in increasing order
    indices: Vec<DataSize>,
    /// Bin of `indices[i]`, never equal to `default_bin`
    bins: Vec<BinIndex>,
}

impl SparseColumn {
    /// The implied bin of every sample not listed explicitly
    pub fn default_bin(&self) -> BinIndex {
        self.default_bin
    }

    /// Explicit `(sample, bin)` pairs in sample order
    pub fn iter(&self) -> impl Iterator<Item = (DataSize, BinIndex)> + '_ {
        self.indices.iter().copied().zip(self.bins.iter().copied())
    }

    /// Number of explicitly stored samples
    pub fn num_non_default(&self) -> usize {
        self.indices.len()
    }

    fn bin(&self, sample: DataSize) -> BinIndex {
        match self.indices.binary_search(&sample) {
            Ok(pos) => self.bins[pos],
            Err(_) => self.default_bin,
        }
    }
}

impl FeatureColumn {
    /// Chooses a layout for `bins`. The sparse layout is used when enabled and
    /// the most frequent bin holds at least `sparse_threshold` of the samples.
    pub fn from_bins(
        bins: Vec<BinIndex>,
        num_bins: usize,
        use_default_bin: bool,
        sparse_threshold: f64,
    ) -> Self {
        if !use_default_bin || bins.is_empty() {
            return FeatureColumn::Dense(bins);
        }

        let mut counts = vec![0usize; num_bins.max(1)];
        for &bin in &bins {
            counts[bin as usize] += 1;
        }
        // Lowest bin wins ties so the choice is deterministic.
        let (default_bin, &default_count) = counts
            .iter()
            .enumerate()
            .fold((0, &counts[0]), |best, (bin, count)| {
                if *count > *best.1 {
                    (bin, count)
                } else {
                    best
                }
            });

        if (default_count as f64) < sparse_threshold * bins.len() as f64 {
            return FeatureColumn::Dense(bins);
        }

        let default_bin = default_bin as BinIndex;
        let (indices, sparse_bins): (Vec<DataSize>, Vec<BinIndex>) = bins
            .iter()
            .enumerate()
            .filter(|&(_, &bin)| bin != default_bin)
            .map(|(sample, &bin)| (sample, bin))
            .unzip();

        FeatureColumn::Sparse(SparseColumn {
            num_samples: bins.len(),
            default_bin,
            indices,
            bins: sparse_bins,
        })
    }

    /// Number of samples covered by the column
    pub fn num_samples(&self) -> usize {
        match self {
            FeatureColumn::Dense(bins) => bins.len(),
            FeatureColumn::Sparse(sparse) => sparse.num_samples,
        }
    }

    /// Bin of `sample`
    pub fn bin(&self, sample: DataSize) -> BinIndex {
        match self {
            FeatureColumn::Dense(bins) => bins[sample],
            FeatureColumn::Sparse(sparse) => sparse.bin(sample),
        }
    }

    /// The implied bin of a sparse column
    pub fn default_bin(&self) -> Option<BinIndex> {
        match self {
            FeatureColumn::Dense(_) => None,
            FeatureColumn::Sparse(sparse) => Some(sparse.default_bin),
        }
    }

    /// Returns true for the sparse layout
    pub fn is_sparse(&self) -> bool {
        matches!(self, FeatureColumn::Sparse(_))
    }

    /// Expands the column to one bin per sample
    pub fn to_dense(&self) -> Vec<BinIndex> {
        match self {
            FeatureColumn::Dense(bins) => bins.clone(),
            FeatureColumn::Sparse(sparse) => {
                let mut bins = vec![sparse.default_bin; sparse.num_samples];
                for (sample, bin) in sparse.iter() {
                    bins[sample] = bin;
                }
                bins
            }
        }
    }
}

/// A binned feature: its threshold table and its column.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedFeature {
    mapper: BinMapper,
    column: FeatureColumn,
}

impl BinnedFeature {
    /// Pairs a threshold table with the column binned against it
    pub fn new(mapper: BinMapper, column: FeatureColumn) -> Self {
        BinnedFeature { mapper, column }
    }

    /// Threshold table
    pub fn mapper(&self) -> &BinMapper {
        &self.mapper
    }

    /// Bin ids
    pub fn column(&self) -> &FeatureColumn {
        &self.column
    }

    /// Number of bins
    pub fn num_bins(&self) -> usize {
        self.mapper.num_bins()
    }
}

/// Frozen binned dataset with labels and query groups.
#[derive(Debug, Clone)]
pub struct BinnedDataset {
    num_samples: usize,
    features: Vec<BinnedFeature>,
    labels: Vec<Label>,
    query_boundaries: Vec<DataSize>,
}

impl BinnedDataset {
    /// Bins every feature of `raw` with its own quantile thresholds.
    pub fn from_raw(raw: &RawDataset, config: &BinningConfig) -> Result<Self> {
        raw.validate()?;
        let binner = FeatureBinner::new(config.clone());
        let features = raw
            .columns()
            .iter()
            .map(|entries| binner.bin_feature(entries, raw.num_samples(), 0.0))
            .collect();

        Ok(BinnedDataset {
            num_samples: raw.num_samples(),
            features,
            labels: raw.labels().to_vec(),
            query_boundaries: raw.query_boundaries().to_vec(),
        })
    }

    /// Bins `raw` against the thresholds of `reference`.
    ///
    /// Features beyond the reference's feature count are dropped; features
    /// missing from `raw` are treated as all-default.
    pub fn with_reference(
        raw: &RawDataset,
        reference: &BinnedDataset,
        config: &BinningConfig,
    ) -> Result<Self> {
        raw.validate()?;
        let binner = FeatureBinner::new(config.clone());
        let empty: Vec<(DataSize, f64)> = Vec::new();
        let features = reference
            .features
            .iter()
            .enumerate()
            .map(|(feature, reference_feature)| {
                let entries = raw.columns().get(feature).unwrap_or(&empty);
                binner.bin_with_mapper(
                    reference_feature.mapper.clone(),
                    entries,
                    raw.num_samples(),
                    0.0,
                )
            })
            .collect();

        Ok(BinnedDataset {
            num_samples: raw.num_samples(),
            features,
            labels: raw.labels().to_vec(),
            query_boundaries: raw.query_boundaries().to_vec(),
        })
    }

    /// Number of samples
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of features
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// All binned features
    pub fn features(&self) -> &[BinnedFeature] {
        &self.features
    }

    /// One binned feature
    pub fn feature(&self, feature: FeatureIndex) -> &BinnedFeature {
        &self.features[feature]
    }

    /// Largest bin count over all features
    pub fn max_num_bins(&self) -> usize {
        self.features
            .iter()
            .map(BinnedFeature::num_bins)
            .max()
            .unwrap_or(1)
    }

    /// Relevance labels in sample order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Query group boundaries, `num_queries + 1` entries starting at 0
    pub fn query_boundaries(&self) -> &[DataSize] {
        &self.query_boundaries
    }

    /// Number of query groups
    pub fn num_queries(&self) -> usize {
        self.query_boundaries.len().saturating_sub(1)
    }

    /// Largest relevance label present
    pub fn max_label(&self) -> Option<Label> {
        self.labels.iter().copied().max()
    }

    /// Rejects labels outside `0..=max_label`.
    pub fn check_labels(&self, max_label: usize) -> Result<()> {
        match self
            .labels
            .iter()
            .position(|&label| label as usize > max_label)
        {
            Some(sample) => Err(LambdaMartError::config(format!(
                "Label {} of sample {} exceeds max_label {}",
                self.labels[sample], sample, max_label
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn raw() -> RawDataset {
        let features = array![
            [0.0, 1.0],
            [0.0, 2.0],
            [0.0, 3.0],
            [0.0, 4.0],
            [5.0, 5.0],
        ];
        RawDataset::from_dense(features.view(), vec![1, 0, 2, 1, 0], &[3, 2]).unwrap()
    }

    #[test]
    fn test_from_raw() {
        let dataset = BinnedDataset::from_raw(&raw(), &BinningConfig::default()).unwrap();
        assert_eq!(dataset.num_samples(), 5);
        assert_eq!(dataset.num_features(), 2);
        assert_eq!(dataset.num_queries(), 2);
        assert_eq!(dataset.query_boundaries(), &[0, 3, 5]);
        assert_eq!(dataset.feature(0).num_bins(), 2);
        assert_eq!(dataset.feature(1).num_bins(), 5);
        assert_eq!(dataset.max_num_bins(), 5);
        assert_eq!(dataset.max_label(), Some(2));
        // Four of five samples share bin 0 of feature 0.
        assert!(dataset.feature(0).column().is_sparse());
        assert!(!dataset.feature(1).column().is_sparse());
    }

    #[test]
    fn test_sparse_and_dense_layouts_agree() {
        let raw = raw();
        let sparse = BinnedDataset::from_raw(&raw, &BinningConfig::default()).unwrap();
        let dense = BinnedDataset::from_raw(
            &raw,
            &BinningConfig {
                use_default_bin: false,
                ..BinningConfig::default()
            },
        )
        .unwrap();

        for f in 0..2 {
            assert_eq!(
                sparse.feature(f).column().to_dense(),
                dense.feature(f).column().to_dense()
            );
            for s in 0..5 {
                assert_eq!(sparse.feature(f).column().bin(s), dense.feature(f).column().bin(s));
            }
        }
    }

    #[test]
    fn test_with_reference_shares_thresholds() {
        let train = BinnedDataset::from_raw(&raw(), &BinningConfig::default()).unwrap();
        let valid_features = array![[10.0, 2.2], [0.0, 0.5]];
        let valid_raw = RawDataset::from_dense(valid_features.view(), vec![0, 1], &[2]).unwrap();
        let valid =
            BinnedDataset::with_reference(&valid_raw, &train, &BinningConfig::default()).unwrap();

        assert_eq!(valid.feature(1).mapper(), train.feature(1).mapper());
        assert_eq!(valid.feature(0).column().bin(0), 1);
        assert_eq!(valid.feature(1).column().bin(0), 1);
        assert_eq!(valid.feature(1).column().bin(1), 0);
    }

    #[test]
    fn test_with_reference_follows_layout_config() {
        let dense_config = BinningConfig {
            use_default_bin: false,
            ..BinningConfig::default()
        };
        let train = BinnedDataset::from_raw(&raw(), &dense_config).unwrap();

        let dense = BinnedDataset::with_reference(&raw(), &train, &dense_config).unwrap();
        assert!(!dense.feature(0).column().is_sparse());

        let sparse =
            BinnedDataset::with_reference(&raw(), &train, &BinningConfig::default()).unwrap();
        assert!(sparse.feature(0).column().is_sparse());
        assert_eq!(
            sparse.feature(0).column().to_dense(),
            dense.feature(0).column().to_dense()
        );
    }

    #[test]
    fn test_check_labels() {
        let dataset = BinnedDataset::from_raw(&raw(), &BinningConfig::default()).unwrap();
        assert!(dataset.check_labels(2).is_ok());
        assert!(dataset.check_labels(1).is_err());
    }
}
