//! Plain-text listings

use super::{fetch_text, ProxySource, SourceError};
use crate::proxy::parser::ProxyParser;
use async_trait::async_trait;
use reqwest::Client;

/// How entries are laid out in a text listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// `ip:port` tokens anywhere in the body, surrounded by other columns
    Scan,
    /// One bare `ip:port` per line; other lines are ignored
    Lines,
}

/// Source serving a plain-text proxy list
#[derive(Debug, Clone)]
pub struct PlainTextSource {
    name: String,
    url: String,
    format: TextFormat,
}

impl PlainTextSource {
    pub fn new(name: &str, url: &str, format: TextFormat) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            format,
        }
    }

    /// Extract entries from a fetched body
    pub fn parse(&self, body: &str) -> Vec<String> {
        match self.format {
            TextFormat::Scan => ProxyParser::extract_ip_ports(body),
            TextFormat::Lines => body
                .lines()
                .map(str::trim)
                .filter(|line| ProxyParser::is_ip_port_line(line))
                .map(str::to_string)
                .collect(),
        }
    }
}

#[async_trait]
impl ProxySource for PlainTextSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_candidates(&self, client: &Client) -> Result<Vec<String>, SourceError> {
        let body = fetch_text(client, &self.url).await?;
        Ok(self.parse(&body))
    }
}
