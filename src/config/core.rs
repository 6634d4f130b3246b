//! Core configuration structure and builder.
//!
//! `Config` holds every training, objective and I/O parameter. Values are
//! validated once here, at the boundary, so the learner and the objective can
//! assume well-formed inputs.

use crate::config::file::parse_config_str;
use crate::core::constants::*;
use crate::core::error::{LambdaMartError, Result};
use crate::core::types::VerbosityLevel;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for training and prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Input data
    /// Training data file (`<label> <idx>:<val> ...` per line)
    pub train_data: Option<String>,
    /// Training query file (one group size per line)
    pub train_query: Option<String>,
    /// Optional training label file overriding labels from `train_data`
    pub train_label: Option<String>,
    /// Validation data file
    pub valid_data: Option<String>,
    /// Validation query file
    pub valid_query: Option<String>,
    /// Optional validation label file
    pub valid_label: Option<String>,

    // Core training parameters
    /// Number of boosting iterations
    pub num_iterations: usize,
    /// Learning rate, also the weight of each tree
    pub learning_rate: f64,

    // Learning control parameters
    /// Maximum tree depth, the root counting as depth 1
    pub max_depth: usize,
    /// Maximum number of candidate nodes evaluated per growth round
    pub max_splits: usize,
    /// Minimum number of samples on each side of a split
    pub min_data_in_leaf: usize,
    /// Minimum gain required to split a node
    pub min_gain_to_split: f64,
    /// Children with impurity below this become leaves immediately
    pub min_impurity_to_split: f64,
    /// Absolute bound on a leaf output
    pub max_leaf_output: f64,

    // IO parameters
    /// `< 0`: Fatal, `0`: Warning, `1`: Info, `2`: Debug, `> 2`: Trace
    pub verbosity: i32,
    /// Maximum number of bins per feature (at most 255)
    pub max_bin: usize,
    /// Minimum samples per bin (accepted, unused by the quantile binner)
    pub min_data_in_bin: usize,
    /// Store columns dominated by one bin in the sparse default-bin layout
    pub use_default_bin: bool,
    /// Model output path; serialization is not supported
    pub output_model: String,
    /// Prediction output path
    pub output_result: String,
    /// Worker threads for histogram and gradient passes (0 = all cores)
    pub num_threads: usize,
    /// Features scanned per pass over the samples
    pub num_feature_blocking: usize,

    // Objective parameters
    /// Sigmoid scale of the pairwise loss
    pub sigmoid: f64,
    /// Truncation position of the ideal DCG normalizer
    pub max_position: usize,
    /// Largest relevance label
    pub max_label: usize,
    /// Custom label gains; empty means `2^i - 1`
    pub label_gain: Vec<f64>,

    // Metric parameters
    /// NDCG cutoffs to report
    pub eval_at: Vec<usize>,
    /// Evaluate every `eval_interval` iterations
    pub eval_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            train_data: None,
            train_query: None,
            train_label: None,
            valid_data: None,
            valid_query: None,
            valid_label: None,
            num_iterations: DEFAULT_NUM_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            max_depth: DEFAULT_MAX_DEPTH,
            max_splits: DEFAULT_MAX_SPLITS,
            min_data_in_leaf: DEFAULT_MIN_DATA_IN_LEAF,
            min_gain_to_split: DEFAULT_MIN_GAIN_TO_SPLIT,
            min_impurity_to_split: DEFAULT_MIN_IMPURITY_TO_SPLIT,
            max_leaf_output: DEFAULT_MAX_LEAF_OUTPUT,
            verbosity: DEFAULT_VERBOSITY,
            max_bin: DEFAULT_MAX_BIN,
            min_data_in_bin: DEFAULT_MIN_DATA_IN_BIN,
            use_default_bin: true,
            output_model: DEFAULT_OUTPUT_MODEL.to_string(),
            output_result: DEFAULT_OUTPUT_RESULT.to_string(),
            num_threads: DEFAULT_NUM_THREADS,
            num_feature_blocking: DEFAULT_NUM_FEATURE_BLOCKING,
            sigmoid: DEFAULT_SIGMOID,
            max_position: DEFAULT_MAX_POSITION,
            max_label: DEFAULT_MAX_LABEL,
            label_gain: Vec::new(),
            eval_at: DEFAULT_EVAL_AT.to_vec(),
            eval_interval: DEFAULT_EVAL_INTERVAL,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_depth < MIN_MAX_DEPTH {
            return Err(LambdaMartError::invalid_parameter(
                "max_depth",
                self.max_depth.to_string(),
                "should not be less than 2",
            ));
        }

        if self.max_depth > MAX_TREE_DEPTH {
            return Err(LambdaMartError::invalid_parameter(
                "max_depth",
                self.max_depth.to_string(),
                format!("must be at most {}", MAX_TREE_DEPTH),
            ));
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(LambdaMartError::invalid_parameter(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be a positive finite number",
            ));
        }

        if self.max_splits == 0 {
            return Err(LambdaMartError::invalid_parameter(
                "max_splits",
                self.max_splits.to_string(),
                "must be at least 1",
            ));
        }

        if self.min_data_in_leaf == 0 {
            return Err(LambdaMartError::invalid_parameter(
                "min_data_in_leaf",
                self.min_data_in_leaf.to_string(),
                "must be at least 1",
            ));
        }

        if self.max_bin < 2 || self.max_bin > MAX_BIN_LIMIT {
            return Err(LambdaMartError::invalid_parameter(
                "max_bin",
                self.max_bin.to_string(),
                format!("must be in range [2, {}]", MAX_BIN_LIMIT),
            ));
        }

        if !(self.max_leaf_output > 0.0) {
            return Err(LambdaMartError::invalid_parameter(
                "max_leaf_output",
                self.max_leaf_output.to_string(),
                "must be positive",
            ));
        }

        if self.num_feature_blocking == 0 {
            return Err(LambdaMartError::invalid_parameter(
                "num_feature_blocking",
                "0",
                "must be at least 1",
            ));
        }

        if self.eval_interval == 0 {
            return Err(LambdaMartError::invalid_parameter(
                "eval_interval",
                "0",
                "must be at least 1",
            ));
        }

        if !self.sigmoid.is_finite() || self.sigmoid <= 0.0 {
            return Err(LambdaMartError::invalid_parameter(
                "sigmoid",
                self.sigmoid.to_string(),
                "must be a positive finite number",
            ));
        }

        if self.max_position == 0 {
            return Err(LambdaMartError::invalid_parameter(
                "max_position",
                "0",
                "must be at least 1",
            ));
        }

        if self.max_label > MAX_SUPPORTED_LABEL {
            return Err(LambdaMartError::invalid_parameter(
                "max_label",
                self.max_label.to_string(),
                format!("must be at most {}", MAX_SUPPORTED_LABEL),
            ));
        }

        if !self.label_gain.is_empty() && self.label_gain.len() <= self.max_label {
            return Err(LambdaMartError::invalid_parameter(
                "label_gain",
                format!("{} entries", self.label_gain.len()),
                format!("must provide a gain for every label up to {}", self.max_label),
            ));
        }

        if let Some(k) = self.eval_at.iter().find(|&&k| k == 0) {
            return Err(LambdaMartError::invalid_parameter(
                "eval_at",
                k.to_string(),
                "cutoffs must be positive",
            ));
        }

        if self.valid_data.is_some() != self.valid_query.is_some() {
            return Err(LambdaMartError::config(
                "valid_data and valid_query must be given together",
            ));
        }

        Ok(())
    }

    /// Load configuration from file.
    ///
    /// `.json` files are deserialized with serde; anything else is read as
    /// one `key: value` pair per line.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LambdaMartError::config(format!(
                "Unable to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)?
        } else {
            parse_config_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Verbosity as a level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        VerbosityLevel::from_verbosity(self.verbosity)
    }

    /// Number of worker threads, resolving 0 to the number of cores
    pub fn effective_num_threads(&self) -> usize {
        if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads
        }
    }

    /// Gain per relevance label, `label_gain[i]` for labels `0..=max_label`
    pub fn label_gain_table(&self) -> Vec<f64> {
        if self.label_gain.is_empty() {
            (0..=self.max_label)
                .map(|i| ((1u64 << i) - 1) as f64)
                .collect()
        } else {
            self.label_gain[..=self.max_label].to_vec()
        }
    }

    /// Returns true if a validation set is configured
    pub fn has_validation(&self) -> bool {
        self.valid_data.is_some() && self.valid_query.is_some()
    }
}

/// Configuration builder for fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    config: Config,
    validation_errors: Vec<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the training data paths
    pub fn train_files<S: Into<String>>(mut self, data: S, query: S) -> Self {
        self.config.train_data = Some(data.into());
        self.config.train_query = Some(query.into());
        self
    }

    /// Set the validation data paths
    pub fn valid_files<S: Into<String>>(mut self, data: S, query: S) -> Self {
        self.config.valid_data = Some(data.into());
        self.config.valid_query = Some(query.into());
        self
    }

    /// Set the number of boosting iterations
    pub fn num_iterations(mut self, iterations: usize) -> Self {
        self.config.num_iterations = iterations;
        self
    }

    /// Set the learning rate
    pub fn learning_rate(mut self, rate: f64) -> Self {
        if !(rate > 0.0) {
            self.validation_errors
                .push("learning_rate must be positive".to_string());
        }
        self.config.learning_rate = rate;
        self
    }

    /// Set the maximum tree depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        if depth < MIN_MAX_DEPTH {
            self.validation_errors
                .push("max_depth should not be less than 2".to_string());
        }
        self.config.max_depth = depth;
        self
    }

    /// Set the number of candidates per growth round
    pub fn max_splits(mut self, max_splits: usize) -> Self {
        if max_splits == 0 {
            self.validation_errors
                .push("max_splits must be at least 1".to_string());
        }
        self.config.max_splits = max_splits;
        self
    }

    /// Set minimum data in leaf
    pub fn min_data_in_leaf(mut self, min_data: usize) -> Self {
        if min_data == 0 {
            self.validation_errors
                .push("min_data_in_leaf must be at least 1".to_string());
        }
        self.config.min_data_in_leaf = min_data;
        self
    }

    /// Set the minimum split gain
    pub fn min_gain_to_split(mut self, gain: f64) -> Self {
        self.config.min_gain_to_split = gain;
        self
    }

    /// Set the minimum child impurity for further splitting
    pub fn min_impurity_to_split(mut self, impurity: f64) -> Self {
        self.config.min_impurity_to_split = impurity;
        self
    }

    /// Set maximum number of bins
    pub fn max_bin(mut self, max_bin: usize) -> Self {
        if max_bin < 2 {
            self.validation_errors
                .push("max_bin must be at least 2".to_string());
        }
        self.config.max_bin = max_bin.min(MAX_BIN_LIMIT);
        self
    }

    /// Toggle the sparse default-bin column layout
    pub fn use_default_bin(mut self, enabled: bool) -> Self {
        self.config.use_default_bin = enabled;
        self
    }

    /// Set the number of threads
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Set the feature blocking factor
    pub fn num_feature_blocking(mut self, blocking: usize) -> Self {
        if blocking == 0 {
            self.validation_errors
                .push("num_feature_blocking must be at least 1".to_string());
        }
        self.config.num_feature_blocking = blocking;
        self
    }

    /// Set the sigmoid scale
    pub fn sigmoid(mut self, sigmoid: f64) -> Self {
        if !(sigmoid > 0.0) {
            self.validation_errors
                .push("sigmoid must be positive".to_string());
        }
        self.config.sigmoid = sigmoid;
        self
    }

    /// Set the NDCG truncation position
    pub fn max_position(mut self, position: usize) -> Self {
        self.config.max_position = position;
        self
    }

    /// Set the largest relevance label
    pub fn max_label(mut self, max_label: usize) -> Self {
        self.config.max_label = max_label;
        self
    }

    /// Set the NDCG cutoffs
    pub fn eval_at(mut self, eval_at: Vec<usize>) -> Self {
        self.config.eval_at = eval_at;
        self
    }

    /// Set the evaluation interval
    pub fn eval_interval(mut self, interval: usize) -> Self {
        self.config.eval_interval = interval;
        self
    }

    /// Set verbosity
    pub fn verbosity(mut self, verbosity: i32) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    /// Set the prediction output path
    pub fn output_result<S: Into<String>>(mut self, path: S) -> Self {
        self.config.output_result = path.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        if !self.validation_errors.is_empty() {
            return Err(LambdaMartError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.num_iterations, 100);
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.max_depth, 9);
        assert_eq!(config.max_splits, 256);
        assert_eq!(config.min_data_in_leaf, 1);
        assert_eq!(config.max_bin, 255);
        assert_eq!(config.max_position, 20);
        assert_eq!(config.max_label, 5);
        assert_eq!(config.eval_at, vec![1, 3, 5, 10]);
        assert_eq!(config.output_result, "predict_result.txt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.max_depth = 1;
        assert!(config.validate().is_err());

        config.max_depth = 9;
        config.learning_rate = 0.0;
        assert!(config.validate().is_err());

        config.learning_rate = 0.1;
        config.eval_at = vec![1, 0];
        assert!(config.validate().is_err());

        config.eval_at = vec![1, 5];
        config.valid_data = Some("valid.txt".to_string());
        assert!(config.validate().is_err());

        config.valid_query = Some("valid.query".to_string());
        assert!(config.validate().is_ok());
        assert!(config.has_validation());
    }

    #[test]
    fn test_label_gain_table() {
        let mut config = Config::default();
        config.max_label = 3;
        assert_eq!(config.label_gain_table(), vec![0.0, 1.0, 3.0, 7.0]);

        config.label_gain = vec![0.0, 2.0, 4.0, 8.0, 16.0];
        assert_eq!(config.label_gain_table(), vec![0.0, 2.0, 4.0, 8.0]);

        config.label_gain = vec![0.0, 1.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .num_iterations(20)
            .learning_rate(0.05)
            .max_depth(4)
            .max_splits(8)
            .max_bin(300)
            .build()
            .unwrap();

        assert_eq!(config.num_iterations, 20);
        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_splits, 8);
        assert_eq!(config.max_bin, 255);
    }

    #[test]
    fn test_config_builder_validation() {
        let result = ConfigBuilder::new()
            .learning_rate(-0.1)
            .max_depth(1)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_effective_num_threads() {
        let mut config = Config::default();
        assert_eq!(config.effective_num_threads(), 1);
        config.num_threads = 0;
        assert!(config.effective_num_threads() >= 1);
    }

    #[test]
    fn test_json_roundtrip_keeps_defaults() {
        let json = r#"{ "num_iterations": 7, "eval_at": [2, 4] }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.num_iterations, 7);
        assert_eq!(config.eval_at, vec![2, 4]);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }
}
