//! HTML listings: tables and `<textarea>` dumps

use super::{fetch_text, ProxySource, SourceError};
use crate::proxy::parser::ProxyParser;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Layout(format!("bad selector {:?}: {:?}", css, e)))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Source rendering proxies as table rows with IP and port in the first two cells
#[derive(Debug, Clone)]
pub struct HtmlTableSource {
    name: String,
    url: String,
    row_selector: String,
}

impl HtmlTableSource {
    pub fn new(name: &str, url: &str, row_selector: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            row_selector: row_selector.to_string(),
        }
    }

    /// Extract `ip:port` entries from a fetched page
    ///
    /// Header rows and rows with fewer than two cells are skipped.
    pub fn parse(&self, body: &str) -> Result<Vec<String>, SourceError> {
        let doc = Html::parse_document(body);
        let row_selector = selector(&self.row_selector)?;
        let td_selector = selector("td")?;

        let entries = doc
            .select(&row_selector)
            .filter_map(|row| {
                let mut cells = row.select(&td_selector);
                let ip = cell_text(cells.next()?);
                let port = cell_text(cells.next()?);
                Some(format!("{}:{}", ip, port))
            })
            .collect();

        Ok(entries)
    }
}

#[async_trait]
impl ProxySource for HtmlTableSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_candidates(&self, client: &Client) -> Result<Vec<String>, SourceError> {
        let body = fetch_text(client, &self.url).await?;
        self.parse(&body)
    }
}

/// Source publishing a raw list inside a read-only `<textarea>`
#[derive(Debug, Clone)]
pub struct TextareaSource {
    name: String,
    url: String,
}

impl TextareaSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Extract `ip:port` lines from the first read-only textarea
    ///
    /// A page without that textarea yields no entries rather than an error.
    pub fn parse(&self, body: &str) -> Result<Vec<String>, SourceError> {
        let doc = Html::parse_document(body);
        let textarea_selector = selector("textarea[readonly]")?;

        let Some(textarea) = doc.select(&textarea_selector).next() else {
            return Ok(Vec::new());
        };

        let entries = textarea
            .text()
            .collect::<String>()
            .lines()
            .map(str::trim)
            .filter(|line| ProxyParser::is_ip_port_line(line))
            .map(str::to_string)
            .collect();

        Ok(entries)
    }
}

#[async_trait]
impl ProxySource for TextareaSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_candidates(&self, client: &Client) -> Result<Vec<String>, SourceError> {
        let body = fetch_text(client, &self.url).await?;
        self.parse(&body)
    }
}
