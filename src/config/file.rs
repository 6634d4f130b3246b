//! Reader for the flat `key: value` configuration file format.
//!
//! Each line holds one parameter, split at the first `:`. Keys starting with
//! `#` are comments. Unknown keys and alias collisions produce warnings;
//! malformed numbers are fatal.

use crate::config::core::Config;
use crate::core::constants::MAX_BIN_LIMIT;
use crate::core::error::{LambdaMartError, Result};
use std::collections::HashMap;
use std::str::FromStr;

/// Alternative spellings accepted for a parameter.
const PARAMETER_ALIASES: &[(&str, &str)] = &[
    ("num_iteration", "num_iterations"),
    ("num_trees", "num_iterations"),
    ("num_round", "num_iterations"),
    ("shrinkage_rate", "learning_rate"),
    ("eta", "learning_rate"),
    ("min_data", "min_data_in_leaf"),
    ("max_leaves_per_round", "max_splits"),
    ("ndcg_eval_at", "eval_at"),
];

/// Resolves an alias to its canonical parameter name.
pub fn canonical_key(key: &str) -> &str {
    PARAMETER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

/// Parses configuration text, recording the warnings it raised.
#[derive(Debug, Default)]
pub struct ConfigFileParser {
    warnings: Vec<String>,
}

impl ConfigFileParser {
    /// Creates a parser with no recorded warnings
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings raised by the last call to [`ConfigFileParser::parse`]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    /// Parses `content` into a configuration. The result is not validated.
    pub fn parse(&mut self, content: &str) -> Result<Config> {
        self.warnings.clear();

        // canonical key -> (key as written, value)
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut sources: HashMap<String, (String, usize)> = HashMap::new();

        for (line_number, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (key, value) = match trimmed.split_once(':') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => {
                    if !trimmed.starts_with('#') {
                        self.warn(format!(
                            "Ignoring line {} without ':' separator: \"{}\"",
                            line_number + 1,
                            trimmed
                        ));
                    }
                    continue;
                }
            };

            if key.starts_with('#') {
                continue;
            }

            let canonical = canonical_key(key).to_string();
            match sources.get(&canonical).cloned() {
                None => {
                    sources.insert(canonical.clone(), (key.to_string(), entries.len()));
                    entries.push((canonical, value.to_string()));
                }
                Some((previous_key, slot)) if previous_key == key => {
                    entries[slot].1 = value.to_string();
                }
                Some((previous_key, slot)) => {
                    if key == canonical {
                        self.warn(format!(
                            "{} is set with {}={}, will be overridden by {}={}",
                            canonical, previous_key, entries[slot].1, key, value
                        ));
                        sources.insert(canonical.clone(), (key.to_string(), slot));
                        entries[slot].1 = value.to_string();
                    } else {
                        self.warn(format!(
                            "{} is set={}, {}={} will be ignored",
                            previous_key, entries[slot].1, key, value
                        ));
                    }
                }
            }
        }

        let mut config = Config::default();
        for (key, value) in &entries {
            self.apply(&mut config, key, value)?;
        }
        Ok(config)
    }

    fn apply(&mut self, config: &mut Config, key: &str, value: &str) -> Result<()> {
        match key {
            "train_data" => config.train_data = optional_path(value),
            "train_query" => config.train_query = optional_path(value),
            "train_label" => config.train_label = optional_path(value),
            "valid_data" => config.valid_data = optional_path(value),
            "valid_query" => config.valid_query = optional_path(value),
            "valid_label" => config.valid_label = optional_path(value),
            "num_iterations" => config.num_iterations = parse_int(key, value)?,
            "learning_rate" => config.learning_rate = parse_float(key, value)?,
            "max_depth" => config.max_depth = parse_int(key, value)?,
            "max_splits" => config.max_splits = parse_int(key, value)?,
            "min_data_in_leaf" => config.min_data_in_leaf = parse_int(key, value)?,
            "min_gain_to_split" => config.min_gain_to_split = parse_float(key, value)?,
            "min_impurity_to_split" => config.min_impurity_to_split = parse_float(key, value)?,
            "max_leaf_output" => config.max_leaf_output = parse_float(key, value)?,
            "verbosity" => config.verbosity = parse_int(key, value)?,
            "max_bin" => {
                let max_bin: usize = parse_int(key, value)?;
                if max_bin > MAX_BIN_LIMIT {
                    self.warn(format!(
                        "max_bin={} exceeds {}, using {}",
                        max_bin, MAX_BIN_LIMIT, MAX_BIN_LIMIT
                    ));
                }
                config.max_bin = max_bin.min(MAX_BIN_LIMIT);
            }
            "min_data_in_bin" => config.min_data_in_bin = parse_int(key, value)?,
            "use_default_bin" => config.use_default_bin = parse_bool(key, value)?,
            "output_model" => config.output_model = value.to_string(),
            "output_result" => config.output_result = value.to_string(),
            "num_threads" => config.num_threads = parse_int(key, value)?,
            "num_feature_blocking" => config.num_feature_blocking = parse_int(key, value)?,
            "sigmoid" => config.sigmoid = parse_float(key, value)?,
            "max_position" => config.max_position = parse_int(key, value)?,
            "max_label" => config.max_label = parse_int(key, value)?,
            "label_gain" => config.label_gain = parse_list(key, value, parse_float)?,
            "eval_at" => config.eval_at = parse_list(key, value, parse_int)?,
            "eval_interval" => config.eval_interval = parse_int(key, value)?,
            _ => self.warn(format!("Unknown parameter: {}", key)),
        }
        Ok(())
    }
}

/// Parses configuration text with a fresh [`ConfigFileParser`].
pub fn parse_config_str(content: &str) -> Result<Config> {
    ConfigFileParser::new().parse(content)
}

fn optional_path(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_int<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        LambdaMartError::config(format!(
            "Parameter {} should be of type int, got \"{}\"",
            key, value
        ))
    })
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    value.parse::<f64>().map_err(|_| {
        LambdaMartError::config(format!(
            "Parameter {} should be of type float, got \"{}\"",
            key, value
        ))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "+" => Ok(true),
        "false" | "0" | "no" | "-" => Ok(false),
        _ => Err(LambdaMartError::config(format!(
            "Parameter {} should be of type bool, got \"{}\"",
            key, value
        ))),
    }
}

fn parse_list<T>(key: &str, value: &str, parse: fn(&str, &str) -> Result<T>) -> Result<Vec<T>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse(key, item))
        .collect()
}
