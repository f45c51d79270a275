//! GeoNode JSON API

use super::{fetch_text, ProxySource, SourceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct GeonodeResponse {
    #[serde(default)]
    data: Vec<GeonodeEntry>,
}

#[derive(Debug, Deserialize)]
struct GeonodeEntry {
    ip: String,
    /// Served as a string by the API, accepted as a number too
    port: Value,
    #[serde(default)]
    protocols: Vec<String>,
}

impl GeonodeEntry {
    fn speaks_http(&self) -> bool {
        self.protocols
            .iter()
            .any(|p| p.eq_ignore_ascii_case("http") || p.eq_ignore_ascii_case("https"))
    }

    fn port(&self) -> Option<String> {
        match &self.port {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Source backed by the GeoNode proxy-list API
#[derive(Debug, Clone)]
pub struct GeonodeSource {
    name: String,
    url: String,
}

impl GeonodeSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Extract HTTP(S)-capable entries from an API response body
    pub fn parse(&self, body: &str) -> Result<Vec<String>, SourceError> {
        let response: GeonodeResponse = serde_json::from_str(body)?;

        let entries = response
            .data
            .iter()
            .filter(|entry| entry.speaks_http())
            .filter_map(|entry| Some(format!("{}:{}", entry.ip, entry.port()?)))
            .collect();

        Ok(entries)
    }
}

#[async_trait]
impl ProxySource for GeonodeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_candidates(&self, client: &Client) -> Result<Vec<String>, SourceError> {
        let body = fetch_text(client, &self.url).await?;
        self.parse(&body)
    }
}
