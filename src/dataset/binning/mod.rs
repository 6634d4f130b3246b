//! Quantile feature binning.
//!
//! A feature's raw values are discretized into at most `max_bin` bins of
//! roughly equal population. Tied values never straddle a bin boundary and
//! each boundary sits midway between the last value of one bin and the first
//! value of the next. Features may be given sparsely: samples without an
//! explicit entry take the feature's default value.

pub mod mapper;

pub use mapper::BinMapper;

use crate::config::Config;
use crate::core::constants::{DEFAULT_BIN_SPARSE_THRESHOLD, DEFAULT_MAX_BIN};
use crate::core::types::{BinIndex, DataSize};
use crate::dataset::dataset::{BinnedFeature, FeatureColumn};
use serde::{Deserialize, Serialize};

/// Configuration for the binning process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Maximum number of bins per feature
    pub max_bin: usize,
    /// Store columns dominated by their most frequent bin sparsely
    pub use_default_bin: bool,
    /// Share of samples the most frequent bin must hold for the sparse layout
    pub sparse_threshold: f64,
}

impl Default for BinningConfig {
    fn default() -> Self {
        BinningConfig {
            max_bin: DEFAULT_MAX_BIN,
            use_default_bin: true,
            sparse_threshold: DEFAULT_BIN_SPARSE_THRESHOLD,
        }
    }
}

impl From<&Config> for BinningConfig {
    fn from(config: &Config) -> Self {
        BinningConfig {
            max_bin: config.max_bin,
            use_default_bin: config.use_default_bin,
            ..BinningConfig::default()
        }
    }
}

/// Quantile binner for a single feature.
#[derive(Debug, Clone)]
pub struct FeatureBinner {
    config: BinningConfig,
}

impl FeatureBinner {
    /// Create a new binner
    pub fn new(config: BinningConfig) -> Self {
        FeatureBinner { config }
    }

    /// Binning configuration
    pub fn config(&self) -> &BinningConfig {
        &self.config
    }

    /// Computes the threshold table for a feature.
    ///
    /// `entries` holds `(sample, value)` pairs for samples with an explicit
    /// value; the remaining `num_samples - entries.len()` samples take
    /// `default_value`.
    pub fn fit(&self, entries: &[(DataSize, f64)], num_samples: usize, default_value: f64) -> BinMapper {
        let groups = distinct_value_counts(entries, num_samples, default_value);
        if groups.len() <= 1 {
            return BinMapper::single_bin();
        }

        let max_bin = self.config.max_bin.max(1);
        let mut thresholds = Vec::with_capacity(max_bin.min(groups.len()) - 1);
        let mut remaining_samples = num_samples;
        let mut remaining_bins = max_bin;
        let mut current_count = 0usize;
        let mut last_value = groups[0].0;

        for &(value, count) in &groups {
            if current_count > 0 && remaining_bins > 1 {
                let target = remaining_samples as f64 / remaining_bins as f64;
                if (current_count + count) as f64 > target {
                    thresholds.push(midpoint(last_value, value));
                    remaining_samples -= current_count;
                    remaining_bins -= 1;
                    current_count = 0;
                }
            }
            current_count += count;
            last_value = value;
        }

        BinMapper::new(thresholds)
    }

    /// Fits thresholds and bins every sample of the feature.
    pub fn bin_feature(
        &self,
        entries: &[(DataSize, f64)],
        num_samples: usize,
        default_value: f64,
    ) -> BinnedFeature {
        let mapper = self.fit(entries, num_samples, default_value);
        self.bin_with_mapper(mapper, entries, num_samples, default_value)
    }

    /// Bins a feature against an existing threshold table, as done for a
    /// validation set that must share the training set's bins.
    pub fn bin_with_mapper(
        &self,
        mapper: BinMapper,
        entries: &[(DataSize, f64)],
        num_samples: usize,
        default_value: f64,
    ) -> BinnedFeature {
        let default_bin = mapper.value_to_bin(default_value);
        let mut bins: Vec<BinIndex> = vec![default_bin; num_samples];
        for &(sample, value) in entries {
            bins[sample] = mapper.value_to_bin(value);
        }

        let column = FeatureColumn::from_bins(
            bins,
            mapper.num_bins(),
            self.config.use_default_bin,
            self.config.sparse_threshold,
        );
        BinnedFeature::new(mapper, column)
    }
}

impl Default for FeatureBinner {
    fn default() -> Self {
        Self::new(BinningConfig::default())
    }
}

/// Sorted distinct values with their multiplicities, the implicit default
/// value included.
fn distinct_value_counts(
    entries: &[(DataSize, f64)],
    num_samples: usize,
    default_value: f64,
) -> Vec<(f64, usize)> {
    let mut values: Vec<f64> = entries.iter().map(|&(_, v)| v).collect();
    values.sort_by(f64::total_cmp);

    let mut groups: Vec<(f64, usize)> = Vec::new();
    for value in values {
        match groups.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => groups.push((value, 1)),
        }
    }

    let implicit = num_samples.saturating_sub(entries.len());
    if implicit > 0 {
        let pos = groups.partition_point(|&(v, _)| v < default_value);
        match groups.get_mut(pos) {
            Some((v, count)) if *v == default_value => *count += implicit,
            _ => groups.insert(pos, (default_value, implicit)),
        }
    }
    groups
}

/// Boundary between two adjacent distinct values; falls back to the lower
/// value when the midpoint rounds up to the upper one.
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid < upper {
        mid
    } else {
        lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(values: &[f64]) -> Vec<(DataSize, f64)> {
        values.iter().copied().enumerate().collect()
    }

    #[test]
    fn test_each_distinct_value_gets_a_bin_when_room() {
        let binner = FeatureBinner::default();
        let entries = dense(&[3.0, 1.0, 2.0, 1.0, 3.0, 2.0]);
        let mapper = binner.fit(&entries, 6, 0.0);
        assert_eq!(mapper.thresholds(), &[1.5, 2.5]);
    }

    #[test]
    fn test_degenerate_feature_has_single_bin() {
        let binner = FeatureBinner::default();
        let entries = dense(&[7.0; 5]);
        let feature = binner.bin_feature(&entries, 5, 0.0);
        assert_eq!(feature.num_bins(), 1);
        assert!(feature.mapper().thresholds().is_empty());
        assert!((0..5).all(|s| feature.column().bin(s) == 0));
    }

    #[test]
    fn test_bin_count_respects_max_bin() {
        let binner = FeatureBinner::new(BinningConfig {
            max_bin: 4,
            ..BinningConfig::default()
        });
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let mapper = binner.fit(&dense(&values), 100, 0.0);
        assert_eq!(mapper.num_bins(), 4);

        // Quantile bins are balanced on uniform data.
        let feature = binner.bin_with_mapper(mapper, &dense(&values), 100, 0.0);
        let mut counts = [0usize; 4];
        for s in 0..100 {
            counts[feature.column().bin(s) as usize] += 1;
        }
        assert!(counts.iter().all(|&c| c == 25), "{:?}", counts);
    }

    #[test]
    fn test_ties_never_split() {
        let binner = FeatureBinner::new(BinningConfig {
            max_bin: 3,
            ..BinningConfig::default()
        });
        let entries = dense(&[1.0, 1.0, 1.0, 1.0, 2.0, 3.0]);
        let feature = binner.bin_feature(&entries, 6, 0.0);
        let first = feature.column().bin(0);
        assert!((0..4).all(|s| feature.column().bin(s) == first));
    }

    #[test]
    fn test_implicit_default_values_are_counted() {
        let binner = FeatureBinner::default();
        // Ten samples, only two explicit; the other eight are 0.0.
        let entries = vec![(2, 5.0), (7, -1.0)];
        let feature = binner.bin_feature(&entries, 10, 0.0);
        assert_eq!(feature.mapper().thresholds(), &[-0.5, 2.5]);
        assert_eq!(feature.column().bin(7), 0);
        assert_eq!(feature.column().bin(0), 1);
        assert_eq!(feature.column().bin(2), 2);
        assert_eq!(feature.column().default_bin(), Some(1));
    }

    #[test]
    fn test_midpoint_fallback() {
        let a = 1.0f64;
        let b = f64::from_bits(a.to_bits() + 1);
        assert_eq!(midpoint(a, b), a);
        assert_eq!(midpoint(1.0, 2.0), 1.5);
    }
}
