//! Gradient boosting loop.
//!
//! Each iteration computes LambdaRank derivatives at the current scores,
//! grows one tree on them, appends it to the [`Model`] with weight
//! `learning_rate` and moves every training score by the weighted output of
//! the leaf its sample landed in. A validation set, when present, is scored
//! incrementally through the binned tree and evaluated with its own
//! objective instance.

pub mod ensemble;

pub use ensemble::{Model, TreeInfo};

use crate::config::Config;
use crate::core::error::Result;
use crate::core::types::{IterationIndex, Score};
use crate::core::utils::log::TrainingLogger;
use crate::dataset::BinnedDataset;
use crate::objective::{LambdaRank, LambdaRankConfig};
use crate::tree::{Tree, TreeLearner, TreeLearnerConfig};

/// NDCG values logged at one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalRecord {
    /// Iteration, starting at 1
    pub iteration: IterationIndex,
    /// Training NDCG per evaluation depth
    pub train: Vec<f64>,
    /// Validation NDCG per evaluation depth, if a validation set is present
    pub valid: Option<Vec<f64>>,
}

/// Validation data with its objective and running scores.
#[derive(Debug)]
struct ValidationSet {
    dataset: BinnedDataset,
    objective: LambdaRank,
    scores: Vec<Score>,
}

/// LambdaMART trainer.
#[derive(Debug)]
pub struct Booster {
    config: Config,
    train: BinnedDataset,
    objective: LambdaRank,
    learner: TreeLearner,
    valid: Option<ValidationSet>,
    scores: Vec<Score>,
    gradients: Vec<Score>,
    hessians: Vec<Score>,
    eval_history: Vec<EvalRecord>,
}

impl Booster {
    /// Prepares training. Fails if a label exceeds `max_label`.
    pub fn new(config: Config, train: BinnedDataset, valid: Option<BinnedDataset>) -> Result<Self> {
        config.validate()?;
        train.check_labels(config.max_label)?;

        let objective_config = LambdaRankConfig::from(&config);
        let objective = LambdaRank::new(train.labels(), train.query_boundaries(), &objective_config)?;
        let learner = TreeLearner::new(&train, TreeLearnerConfig::from(&config))?;

        let valid = match valid {
            Some(dataset) => {
                dataset.check_labels(config.max_label)?;
                let objective = LambdaRank::new(
                    dataset.labels(),
                    dataset.query_boundaries(),
                    &objective_config,
                )?;
                let scores = vec![0.0; dataset.num_samples()];
                Some(ValidationSet {
                    dataset,
                    objective,
                    scores,
                })
            }
            None => None,
        };

        let n = train.num_samples();
        Ok(Booster {
            config,
            train,
            objective,
            learner,
            valid,
            scores: vec![0.0; n],
            gradients: vec![0.0; n],
            hessians: vec![0.0; n],
            eval_history: Vec::new(),
        })
    }

    /// Runs `num_iterations` boosting iterations and returns the model.
    pub fn train(&mut self, logger: &TrainingLogger) -> Result<Model> {
        let mut model = Model::new();
        for iteration in 1..=self.config.num_iterations {
            let tree = self.train_one_iter(logger)?;
            model.add_tree(tree, self.config.learning_rate);

            if iteration % self.config.eval_interval == 0 {
                self.evaluate(iteration, logger);
            }
            if self.check_early_stopping() {
                logger.info_fmt(format_args!("Early stopping at iteration {}", iteration));
                break;
            }
        }
        Ok(model)
    }

    /// Grows one tree and applies it to the training and validation scores.
    pub fn train_one_iter(&mut self, logger: &TrainingLogger) -> Result<Tree> {
        self.objective
            .get_derivatives(&self.scores, &mut self.gradients, &mut self.hessians)?;
        let tree =
            self.learner
                .build_new_tree(&self.train, &self.gradients, &self.hessians, logger)?;

        let learning_rate = self.config.learning_rate;
        for (score, &node) in self.scores.iter_mut().zip(self.learner.sample_to_node()) {
            *score += learning_rate * tree.output_by_node_id(node).unwrap_or(0.0);
        }

        if let Some(valid) = &mut self.valid {
            for (sample, score) in valid.scores.iter_mut().enumerate() {
                *score += learning_rate * tree.predict_binned(&valid.dataset, sample);
            }
        }
        Ok(tree)
    }

    fn evaluate(&mut self, iteration: IterationIndex, logger: &TrainingLogger) {
        let names = self.objective.eval_names();
        let train = self.objective.eval(&self.scores);
        logger.info_fmt(format_args!(
            "Iteration: {} {}",
            iteration,
            format_metrics(&names, &train)
        ));

        let valid = self.valid.as_ref().map(|valid| {
            let values = valid.objective.eval(&valid.scores);
            logger.info_fmt(format_args!(
                "Iteration: {} valid {}",
                iteration,
                format_metrics(&names, &values)
            ));
            values
        });

        self.eval_history.push(EvalRecord {
            iteration,
            train,
            valid,
        });
    }

    /// Early stopping hook consulted after each iteration.
    ///
    /// No stopping policy is implemented; this always returns `false` and
    /// training runs for `num_iterations`.
    pub fn check_early_stopping(&self) -> bool {
        false
    }

    /// Training configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current training scores
    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    /// Current validation scores, if a validation set is present
    pub fn valid_scores(&self) -> Option<&[Score]> {
        self.valid.as_ref().map(|valid| valid.scores.as_slice())
    }

    /// Every evaluation logged so far
    pub fn eval_history(&self) -> &[EvalRecord] {
        &self.eval_history
    }
}

fn format_metrics(names: &[String], values: &[f64]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(name, value)| format!("{}:{:.6}", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::core::types::VerbosityLevel;
    use crate::dataset::{BinningConfig, RawDataset};
    use ndarray::Array2;

    fn toy(num_queries: usize) -> RawDataset {
        let group = 6;
        let n = num_queries * group;
        let features = Array2::from_shape_fn((n, 2), |(i, f)| {
            let rank = (i % group) as f64;
            if f == 0 {
                rank
            } else {
                ((i * 31) % 7) as f64
            }
        });
        let labels = (0..n).map(|i| (i % group) as u32 / 2).collect();
        RawDataset::from_dense(features.view(), labels, &vec![group; num_queries]).unwrap()
    }

    fn config(iterations: usize) -> Config {
        ConfigBuilder::new()
            .num_iterations(iterations)
            .max_label(3)
            .eval_at(vec![1, 3])
            .build()
            .unwrap()
    }

    #[test]
    fn test_training_improves_ndcg_and_logs() {
        let train = BinnedDataset::from_raw(&toy(4), &BinningConfig::default()).unwrap();
        let mut booster = Booster::new(config(5), train, None).unwrap();
        let before = booster.objective.eval(booster.scores());

        let (logger, lines) = TrainingLogger::capturing(VerbosityLevel::Info);
        let model = booster.train(&logger).unwrap();
        assert_eq!(model.num_trees(), 5);
        assert_eq!(booster.eval_history().len(), 5);

        let after = &booster.eval_history()[4].train;
        assert!(after[0] >= before[0]);
        assert!((after[0] - 1.0).abs() < 1e-9);

        let lines = lines.lock().unwrap();
        assert!(lines[0].starts_with("Iteration: 1 ndcg@1:"));
        assert!(lines[0].contains("ndcg@3:"));
    }

    #[test]
    fn test_validation_scores_match_model() {
        let raw_train = toy(4);
        let raw_valid = toy(2);
        let binning = BinningConfig::default();
        let train = BinnedDataset::from_raw(&raw_train, &binning).unwrap();
        let valid = BinnedDataset::with_reference(&raw_valid, &train, &binning).unwrap();
        let mut booster = Booster::new(config(3), train, Some(valid)).unwrap();

        let (logger, lines) = TrainingLogger::capturing(VerbosityLevel::Info);
        let model = booster.train(&logger).unwrap();
        let predicted = model.predict_rows(raw_valid.to_dense(2).view());
        let incremental = booster.valid_scores().unwrap();
        for (a, b) in predicted.iter().zip(incremental) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(lines.lock().unwrap()[1].starts_with("Iteration: 1 valid ndcg@1:"));
        assert!(booster.eval_history()[0].valid.is_some());
    }

    #[test]
    fn test_training_scores_match_model() {
        let raw = toy(3);
        let train = BinnedDataset::from_raw(&raw, &BinningConfig::default()).unwrap();
        let mut booster = Booster::new(config(4), train, None).unwrap();
        let model = booster.train(&TrainingLogger::silent()).unwrap();
        let predicted = model.predict_rows(raw.to_dense(2).view());
        for (a, b) in predicted.iter().zip(booster.scores()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_label_above_max_label_is_rejected() {
        let train = BinnedDataset::from_raw(&toy(1), &BinningConfig::default()).unwrap();
        let config = ConfigBuilder::new().max_label(1).build().unwrap();
        assert!(Booster::new(config, train, None).is_err());
    }

    #[test]
    fn test_early_stopping_never_triggers() {
        let train = BinnedDataset::from_raw(&toy(1), &BinningConfig::default()).unwrap();
        let booster = Booster::new(config(1), train, None).unwrap();
        assert!(!booster.check_early_stopping());
    }
}
