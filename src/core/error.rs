//! Error handling and error types for the LambdaMART trainer.
//!
//! Fatal conditions only originate from the configuration, file loading and
//! dataset construction layers, plus histogram buffer allocation. The tree
//! learner and the ranking objective never fail once handed validated inputs.

use std::io;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum LambdaMartError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Data loading and parsing errors
    #[error("Data loading error: {message}")]
    DataLoading { message: String },

    /// Dataset consistency errors
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Memory allocation failures
    #[error("Memory error: {message}")]
    Memory { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON configuration errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Internal errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Type alias for Results using LambdaMartError
pub type Result<T> = std::result::Result<T, LambdaMartError>;

impl LambdaMartError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        LambdaMartError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        LambdaMartError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a data loading error
    pub fn data_loading<S: Into<String>>(message: S) -> Self {
        LambdaMartError::DataLoading {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        LambdaMartError::Dataset {
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        LambdaMartError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a memory error
    pub fn memory<S: Into<String>>(message: S) -> Self {
        LambdaMartError::Memory {
            message: message.into(),
        }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        LambdaMartError::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LambdaMartError::Memory { .. } => true,
            LambdaMartError::Config { .. }
            | LambdaMartError::InvalidParameter { .. }
            | LambdaMartError::DataLoading { .. }
            | LambdaMartError::Dataset { .. }
            | LambdaMartError::DimensionMismatch { .. }
            | LambdaMartError::Io { .. }
            | LambdaMartError::Json { .. }
            | LambdaMartError::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            LambdaMartError::Config { .. } => "config",
            LambdaMartError::InvalidParameter { .. } => "invalid_parameter",
            LambdaMartError::DataLoading { .. } => "data_loading",
            LambdaMartError::Dataset { .. } => "dataset",
            LambdaMartError::DimensionMismatch { .. } => "dimension_mismatch",
            LambdaMartError::Memory { .. } => "memory",
            LambdaMartError::Io { .. } => "io",
            LambdaMartError::Json { .. } => "json",
            LambdaMartError::Internal { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LambdaMartError::config("bad value");
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = LambdaMartError::invalid_parameter("max_depth", "1", "must be at least 2");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: max_depth = 1, must be at least 2"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: LambdaMartError = io_err.into();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_memory_error_is_recoverable() {
        let err = LambdaMartError::memory("histogram buffer");
        assert!(err.is_recoverable());
    }
}
