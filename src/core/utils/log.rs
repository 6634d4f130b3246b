//! Explicit logging context for training entry points.
//!
//! A `TrainingLogger` is created by the caller and passed by reference into
//! `Application::run`, `Booster::train` and `TreeLearner::build_new_tree`.
//! It filters by its own verbosity and forwards to the `log` facade, so the
//! library holds no global logger state. The binary installs `env_logger` as
//! the backend through [`init_env_logger`].

use crate::core::types::VerbosityLevel;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Default `log` target for messages emitted during training.
pub const DEFAULT_LOG_TARGET: &str = "lambdamart";

/// Receives every message that passes the logger's level filter, in addition
/// to the `log` facade.
pub type LogCallback = Arc<dyn Fn(VerbosityLevel, &str) + Send + Sync>;

/// Logging context threaded through training.
#[derive(Clone)]
pub struct TrainingLogger {
    level: VerbosityLevel,
    target: String,
    callback: Option<LogCallback>,
}

impl TrainingLogger {
    /// Creates a logger that admits `level` and everything less verbose.
    pub fn new(level: VerbosityLevel) -> Self {
        TrainingLogger {
            level,
            target: DEFAULT_LOG_TARGET.to_string(),
            callback: None,
        }
    }

    /// Creates a logger from the integer `verbosity` configuration value.
    pub fn from_verbosity(verbosity: i32) -> Self {
        Self::new(VerbosityLevel::from_verbosity(verbosity))
    }

    /// A logger that only lets fatal messages through.
    pub fn silent() -> Self {
        Self::new(VerbosityLevel::Fatal)
    }

    /// Overrides the `log` target.
    pub fn with_target<S: Into<String>>(mut self, target: S) -> Self {
        self.target = target.into();
        self
    }

    /// Installs a callback that receives each admitted message.
    pub fn with_callback(mut self, callback: LogCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Returns a logger that records admitted messages into the returned
    /// buffer. Useful for inspecting evaluation output.
    pub fn capturing(level: VerbosityLevel) -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let logger = Self::new(level).with_callback(Arc::new(move |_, message: &str| {
            if let Ok(mut lines) = sink.lock() {
                lines.push(message.to_string());
            }
        }));
        (logger, buffer)
    }

    /// Current verbosity.
    pub fn level(&self) -> VerbosityLevel {
        self.level
    }

    /// Returns true if messages at `level` would be emitted.
    pub fn enabled(&self, level: VerbosityLevel) -> bool {
        level <= self.level
    }

    /// Logs a warning message.
    pub fn warning(&self, message: &str) {
        self.write(VerbosityLevel::Warning, format_args!("{}", message));
    }

    /// Logs a formatted warning message.
    pub fn warning_fmt(&self, args: fmt::Arguments<'_>) {
        self.write(VerbosityLevel::Warning, args);
    }

    /// Logs an info message.
    pub fn info(&self, message: &str) {
        self.write(VerbosityLevel::Info, format_args!("{}", message));
    }

    /// Logs a formatted info message.
    pub fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.write(VerbosityLevel::Info, args);
    }

    /// Logs a debug message.
    pub fn debug(&self, message: &str) {
        self.write(VerbosityLevel::Debug, format_args!("{}", message));
    }

    /// Logs a formatted debug message.
    pub fn debug_fmt(&self, args: fmt::Arguments<'_>) {
        self.write(VerbosityLevel::Debug, args);
    }

    /// Logs a formatted trace message.
    pub fn trace_fmt(&self, args: fmt::Arguments<'_>) {
        self.write(VerbosityLevel::Trace, args);
    }

    fn write(&self, level: VerbosityLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }

        let log_level = match level {
            VerbosityLevel::Fatal => log::Level::Error,
            VerbosityLevel::Warning => log::Level::Warn,
            VerbosityLevel::Info => log::Level::Info,
            VerbosityLevel::Debug => log::Level::Debug,
            VerbosityLevel::Trace => log::Level::Trace,
        };

        match &self.callback {
            Some(callback) => {
                let message = args.to_string();
                log::log!(target: self.target.as_str(), log_level, "{}", message);
                callback(level, &message);
            }
            None => log::log!(target: self.target.as_str(), log_level, "{}", args),
        }
    }
}

impl Default for TrainingLogger {
    fn default() -> Self {
        Self::new(VerbosityLevel::default())
    }
}

impl fmt::Debug for TrainingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainingLogger")
            .field("level", &self.level)
            .field("target", &self.target)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Installs `env_logger` as the `log` backend with the given verbosity.
/// `RUST_LOG` still takes precedence. Calling this twice is harmless.
pub fn init_env_logger(level: VerbosityLevel) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.to_level_filter())
        .format_target(false)
        .parse_default_env();
    let _ = builder.try_init();
}
