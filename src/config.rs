//! Run configuration
//!
//! Everything is read once at startup and validated before any network
//! activity; a [`ConfigError`] aborts the run.

use crate::proxy::coordinator::DEFAULT_MAX_WORKERS;
use crate::proxy::validator::ValidatorConfig;
use crate::sources::{default_source_names, CrawlerConfig};
use reqwest::Url;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Upper bound on concurrent validations
pub const MAX_WORKERS_LIMIT: usize = 1000;

/// Default file the working proxies are written to
pub const DEFAULT_OUTPUT_FILE: &str = "valid_proxies.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive number of seconds, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },
    #[error("invalid worker count {0} (expected 1..={})", MAX_WORKERS_LIMIT)]
    InvalidWorkers(usize),
    #[error("invalid test URL {url:?}: {reason}")]
    InvalidTestUrl { url: String, reason: String },
    #[error("test URL {url:?} is not routed through the proxy with scope {scope}")]
    ScopeMismatch { url: String, scope: String },
    #[error("unknown source {0:?}")]
    UnknownSource(String),
    #[error("output file {path:?} is not writable: {reason}")]
    OutputNotWritable { path: PathBuf, reason: String },
}

/// Convert a user supplied number of seconds into a duration
///
/// `allow_zero` is for pauses; timeouts must be strictly positive.
pub fn seconds(name: &'static str, value: f64, allow_zero: bool) -> Result<Duration, ConfigError> {
    let valid = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if !valid {
        return Err(ConfigError::InvalidDuration { name, value });
    }
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDuration { name, value })
}

/// Immutable settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub validator: ValidatorConfig,
    pub crawler: CrawlerConfig,
    pub max_workers: usize,
    pub output: PathBuf,
    /// Append the measured latency to each output line
    pub with_latency: bool,
    /// Order the result set by ascending latency
    pub sort_by_latency: bool,
    /// Built-in sources to leave out
    pub skip_sources: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            validator: ValidatorConfig::default(),
            crawler: CrawlerConfig::default(),
            max_workers: DEFAULT_MAX_WORKERS,
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            with_latency: false,
            sort_by_latency: false,
            skip_sources: Vec::new(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_validator(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_crawler(mut self, crawler: CrawlerConfig) -> Self {
        self.crawler = crawler;
        self
    }

    /// Check every option; the output file is created if missing but not truncated
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validator.timeout.is_zero() {
            return Err(ConfigError::InvalidDuration {
                name: "timeout",
                value: 0.0,
            });
        }

        if self.crawler.timeout.is_zero() {
            return Err(ConfigError::InvalidDuration {
                name: "source timeout",
                value: 0.0,
            });
        }

        if self.max_workers == 0 || self.max_workers > MAX_WORKERS_LIMIT {
            return Err(ConfigError::InvalidWorkers(self.max_workers));
        }

        let url = Url::parse(&self.validator.test_url).map_err(|e| ConfigError::InvalidTestUrl {
            url: self.validator.test_url.clone(),
            reason: e.to_string(),
        })?;
        if !self.validator.scope.covers(&url) {
            return Err(ConfigError::ScopeMismatch {
                url: self.validator.test_url.clone(),
                scope: self.validator.scope.to_string(),
            });
        }

        let known = default_source_names();
        if let Some(unknown) = self.skip_sources.iter().find(|name| !known.contains(name)) {
            return Err(ConfigError::UnknownSource(unknown.clone()));
        }

        check_writable(&self.output)
    }
}

fn check_writable(path: &Path) -> Result<(), ConfigError> {
    let not_writable = |reason: String| ConfigError::OutputNotWritable {
        path: path.to_path_buf(),
        reason,
    };

    if path.is_dir() {
        return Err(not_writable("is a directory".to_string()));
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| not_writable(e.to_string()))
}
