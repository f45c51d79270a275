//! Parsing raw source entries into candidates

use crate::proxy::models::Candidate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Regex pattern to match IP:PORT patterns in text
static IP_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}):(\d{1,5})\b")
        .expect("Invalid IP:PORT regex")
});

/// Why a raw entry could not be turned into a candidate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty entry")]
    Empty,
    #[error("missing port in {0:?}")]
    MissingPort(String),
    #[error("invalid port in {0:?}")]
    InvalidPort(String),
    #[error("invalid host in {0:?}")]
    InvalidHost(String),
    #[error("authenticated proxies are not supported: {0:?}")]
    Credentials(String),
}

/// Parser for the `host:port` entries produced by sources
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single raw entry
    ///
    /// Accepts `HOST:PORT` and `http://HOST:PORT` (optionally with a trailing slash).
    /// Entries carrying credentials are rejected.
    pub fn parse_line(line: &str) -> Result<Candidate, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let addr = line
            .strip_prefix("http://")
            .or_else(|| line.strip_prefix("https://"))
            .unwrap_or(line)
            .trim_end_matches('/');

        if addr.contains('@') {
            return Err(ParseError::Credentials(line.to_string()));
        }

        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| ParseError::MissingPort(line.to_string()))?;

        // ip:port:user:pass leaves a colon in the host part
        if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
            if host.split(':').count() == 3 {
                return Err(ParseError::Credentials(line.to_string()));
            }
            return Err(ParseError::InvalidHost(line.to_string()));
        }

        if host.is_empty() || host.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(ParseError::InvalidHost(line.to_string()));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| ParseError::InvalidPort(line.to_string()))?;
        if port == 0 {
            return Err(ParseError::InvalidPort(line.to_string()));
        }

        Ok(Candidate::new(host, port))
    }

    /// Extract every IPv4 `ip:port` occurrence from free-form text
    ///
    /// Octets above 255 and port 0 are dropped.
    pub fn extract_ip_ports(content: &str) -> Vec<String> {
        IP_PORT_REGEX
            .captures_iter(content)
            .filter_map(|cap| {
                let host = cap.get(1)?.as_str();
                let port: u16 = cap.get(2)?.as_str().parse().ok()?;

                for part in host.split('.') {
                    let num: u32 = part.parse().ok()?;
                    if num > 255 {
                        return None;
                    }
                }

                if port == 0 {
                    return None;
                }

                Some(format!("{}:{}", host, port))
            })
            .collect()
    }

    /// Whether a trimmed line is exactly one IPv4 `ip:port` entry
    pub fn is_ip_port_line(line: &str) -> bool {
        IP_PORT_REGEX
            .find(line.trim())
            .is_some_and(|m| m.start() == 0 && m.end() == line.trim().len())
    }
}
