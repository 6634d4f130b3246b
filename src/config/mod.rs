//! Configuration management for the LambdaMART trainer.
//!
//! [`Config`] carries every parameter, [`ConfigBuilder`] offers a fluent
//! programmatic API, and [`file`] reads the flat `key: value` file format
//! used by the command line tool.

pub mod core;
pub mod file;

pub use self::core::{Config, ConfigBuilder};
pub use self::file::{parse_config_str, ConfigFileParser};
