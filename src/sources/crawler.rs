//! Sequential crawl over every configured source

use super::{ProxySource, SourceError};
use crate::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// Default timeout for source requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default pause between two source fetches in seconds
pub const DEFAULT_DELAY_SECS: u64 = 1;

/// Default user agent for source requests
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Result of crawling a single source
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// The source that was crawled
    pub source: String,
    /// Raw entries extracted from the source
    pub entries: Vec<String>,
    /// Error message if crawling failed
    pub error: Option<String>,
}

impl CrawlResult {
    /// Create a successful crawl result
    pub fn success(source: String, entries: Vec<String>) -> Self {
        Self {
            source,
            entries,
            error: None,
        }
    }

    /// Create a failed crawl result
    pub fn failure(source: String, error: String) -> Self {
        Self {
            source,
            entries: Vec::new(),
            error: Some(error),
        }
    }

    /// Check if the crawl was successful
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Configuration for the source crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Timeout for each source request
    pub timeout: Duration,
    /// User agent for source requests
    pub user_agent: String,
    /// Pause between successive sources
    pub delay: Duration,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
        }
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Fetches raw entries from a list of sources, one at a time
pub struct ProxyCrawler {
    config: CrawlerConfig,
    client: Client,
    sources: Vec<Box<dyn ProxySource>>,
}

impl ProxyCrawler {
    /// Create a crawler over the given sources
    pub fn with_config(config: CrawlerConfig, sources: Vec<Box<dyn ProxySource>>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            config,
            client,
            sources,
        })
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Crawl one source, turning any error into a failed result
    pub async fn crawl_source(&self, source: &dyn ProxySource) -> CrawlResult {
        match source.fetch_candidates(&self.client).await {
            Ok(entries) => {
                info!(source = source.name(), entries = entries.len(), "source crawled");
                CrawlResult::success(source.name().to_string(), entries)
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "source failed");
                CrawlResult::failure(source.name().to_string(), describe(&e))
            }
        }
    }

    /// Crawl every source in order, pausing between them
    pub async fn crawl_all(&self) -> Vec<CrawlResult> {
        self.crawl_all_with_progress(|_| {}).await
    }

    /// Crawl every source in order, calling `on_result` after each one
    pub async fn crawl_all_with_progress<F>(&self, mut on_result: F) -> Vec<CrawlResult>
    where
        F: FnMut(&CrawlResult),
    {
        let mut results = Vec::with_capacity(self.sources.len());

        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            let result = self.crawl_source(source.as_ref()).await;
            on_result(&result);
            results.push(result);
        }

        results
    }
}

/// One-line description of a source error for the console
fn describe(error: &SourceError) -> String {
    let message = error.to_string();
    message.lines().next().unwrap_or_default().to_string()
}
