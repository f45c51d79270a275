//! Proxy list sources
//!
//! Every upstream listing is a [`ProxySource`]: it fetches one page or API
//! and extracts raw `host:port` strings. Parsing is kept separate from the
//! fetch so each format can be tested offline:
//! - plain text dumps scanned with a regex
//! - HTML tables and `<textarea>` dumps read with CSS selectors
//! - the GeoNode JSON API

pub mod crawler;
pub mod geonode;
pub mod html;
pub mod text;

pub use crawler::{CrawlResult, CrawlerConfig, ProxyCrawler};
pub use geonode::GeonodeSource;
pub use html::{HtmlTableSource, TextareaSource};
pub use text::{PlainTextSource, TextFormat};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Why a source produced no entries
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected page layout: {0}")]
    Layout(String),
}

/// A single upstream proxy listing
#[async_trait]
pub trait ProxySource: Send + Sync {
    /// Human readable name, also used by `--skip-source`
    fn name(&self) -> &str;

    /// Fetch the listing and return raw `host:port` entries
    async fn fetch_candidates(&self, client: &Client) -> Result<Vec<String>, SourceError>;
}

/// GET a page and return its body, treating non-2xx as an error
pub(crate) async fn fetch_text(client: &Client, url: &str) -> Result<String, SourceError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(SourceError::Status(response.status().as_u16()));
    }
    Ok(response.text().await?)
}

/// The built-in set of free proxy listings
pub fn default_sources() -> Vec<Box<dyn ProxySource>> {
    vec![
        Box::new(PlainTextSource::new(
            "spys.me",
            "https://spys.me/proxy.txt",
            TextFormat::Scan,
        )),
        Box::new(HtmlTableSource::new(
            "free-proxy-list.net",
            "https://free-proxy-list.net/",
            ".fpl-list .table tbody tr",
        )),
        Box::new(TextareaSource::new("sslproxies", "https://www.sslproxies.org/")),
        Box::new(GeonodeSource::new(
            "geonode",
            "https://proxylist.geonode.com/api/proxy-list?protocols=http%2Chttps&limit=500&page=1&sort_by=lastChecked&sort_type=desc",
        )),
        Box::new(PlainTextSource::new(
            "proxyscrape",
            "https://api.proxyscrape.com/v3/free-proxy-list/get?request=displayproxies",
            TextFormat::Lines,
        )),
        Box::new(HtmlTableSource::new(
            "hidemy",
            "https://hidemy.name/en/proxy-list/",
            ".table_block table tr",
        )),
        Box::new(TextareaSource::new("us-proxy", "https://www.us-proxy.org/")),
    ]
}

/// Names of the built-in sources
pub fn default_source_names() -> Vec<String> {
    default_sources()
        .iter()
        .map(|source| source.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_sources() {
        let sources = default_sources();
        assert_eq!(sources.len(), 7);

        let names: HashSet<_> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), sources.len(), "source names must be unique");
    }

    #[test]
    fn test_default_source_names() {
        let names = default_source_names();
        assert!(names.contains(&"spys.me".to_string()));
        assert!(names.contains(&"geonode".to_string()));
    }
}
