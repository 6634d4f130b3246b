//! End-to-end training driver used by the `lambdamart` binary.
//!
//! Loads the training set (and the validation set, if configured) from text
//! files, bins them, trains a model and writes the resulting scores to
//! `output_result`.

use crate::boosting::{Booster, Model};
use crate::config::Config;
use crate::core::error::{LambdaMartError, Result};
use crate::core::utils::log::TrainingLogger;
use crate::dataset::{BinnedDataset, BinningConfig, RawDataset, TextLoader};
use crate::prediction::write_predictions;

/// Outcome of [`Application::run`].
#[derive(Debug)]
pub struct TrainingOutput {
    /// The trained model
    pub model: Model,
    /// Scores written to `output_result`
    pub scores: Vec<f64>,
}

/// Runs training as described by a [`Config`].
#[derive(Debug, Clone)]
pub struct Application {
    config: Config,
    loader: TextLoader,
}

impl Application {
    /// Create an application from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Application {
            config,
            loader: TextLoader::new(),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads, trains and writes the prediction file.
    pub fn run(&self, logger: &TrainingLogger) -> Result<TrainingOutput> {
        let (train, valid) = self.load_datasets(logger)?;

        let mut booster = Booster::new(self.config.clone(), train, valid)?;
        let model = booster.train(logger)?;

        let scores = match booster.valid_scores() {
            Some(scores) => scores.to_vec(),
            None => booster.scores().to_vec(),
        };
        write_predictions(&self.config.output_result, &scores)?;
        logger.info_fmt(format_args!(
            "Finished training {} trees, scores written to {}",
            model.num_trees(),
            self.config.output_result
        ));

        if !self.config.output_model.is_empty() {
            logger.warning_fmt(format_args!(
                "Model serialization is not supported, {} was not written",
                self.config.output_model
            ));
        }

        Ok(TrainingOutput { model, scores })
    }

    /// Loads the training set and, if configured, the validation set binned
    /// with the training thresholds.
    pub fn load_datasets(
        &self,
        logger: &TrainingLogger,
    ) -> Result<(BinnedDataset, Option<BinnedDataset>)> {
        let config = &self.config;
        let (train_data, train_query) = match (&config.train_data, &config.train_query) {
            (Some(data), Some(query)) => (data, query),
            _ => {
                return Err(LambdaMartError::config(
                    "train_data and train_query must both be set",
                ))
            }
        };

        logger.info_fmt(format_args!("Loading training dataset {}", train_data));
        let raw = self.load_raw(train_data, train_query, config.train_label.as_deref())?;
        let binning = BinningConfig::from(config);
        let train = BinnedDataset::from_raw(&raw, &binning)?;
        logger.info_fmt(format_args!(
            "Training dataset: {} samples, {} features, {} queries",
            train.num_samples(),
            train.num_features(),
            train.num_queries()
        ));

        let valid = match (&config.valid_data, &config.valid_query) {
            (Some(data), Some(query)) => {
                logger.info_fmt(format_args!("Loading validation dataset {}", data));
                let raw = self.load_raw(data, query, config.valid_label.as_deref())?;
                Some(BinnedDataset::with_reference(&raw, &train, &binning)?)
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(LambdaMartError::config(
                    "valid_data and valid_query must be set together",
                ))
            }
            (None, None) => None,
        };

        Ok((train, valid))
    }

    fn load_raw(&self, data: &str, query: &str, label: Option<&str>) -> Result<RawDataset> {
        self.loader.load(data, query, label)
    }
}
