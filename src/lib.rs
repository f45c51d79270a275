//! Proxy Harvest - scrape public proxy lists and keep the working ones
//!
//! A run crawls several free proxy listings, merges their entries into a
//! deduplicated candidate pool, validates every candidate through a bounded
//! worker pool and writes the working proxies to a file.

pub mod config;
pub mod console;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod proxy;
pub mod sources;

pub use config::{ConfigError, Settings};
pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
