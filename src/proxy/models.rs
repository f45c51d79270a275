//! Proxy data models

use std::fmt;
use std::time::Duration;

/// A proxy address pulled from a source, not yet validated.
///
/// Two candidates are the same proxy when their `host:port` pairs match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub host: String,
    pub port: u16,
}

impl Candidate {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the proxy URL used to route requests through this candidate
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Get the candidate in HOST:PORT format
    pub fn to_simple_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Coarse classification of why a candidate did not work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    ConnectionError,
    BadStatus(u16),
    Other(String),
}

impl FailureReason {
    /// Short label used for grouping failures in the summary
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "timeout",
            FailureReason::ConnectionError => "connection-error",
            FailureReason::BadStatus(_) => "bad-status",
            FailureReason::Other(_) => "other",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout => write!(f, "timed out"),
            FailureReason::ConnectionError => write!(f, "connection error"),
            FailureReason::BadStatus(code) => write!(f, "HTTP {}", code),
            FailureReason::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Terminal state of a single validation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Working { latency: Duration },
    Failed { reason: FailureReason },
}

impl ValidationOutcome {
    pub fn working(latency: Duration) -> Self {
        ValidationOutcome::Working { latency }
    }

    pub fn failed(reason: FailureReason) -> Self {
        ValidationOutcome::Failed { reason }
    }

    pub fn is_working(&self) -> bool {
        matches!(self, ValidationOutcome::Working { .. })
    }

    pub fn latency(&self) -> Option<Duration> {
        match self {
            ValidationOutcome::Working { latency } => Some(*latency),
            ValidationOutcome::Failed { .. } => None,
        }
    }
}

/// A candidate that passed validation, annotated with its measured latency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingProxy {
    pub candidate: Candidate,
    pub latency: Duration,
}

impl WorkingProxy {
    pub fn new(candidate: Candidate, latency: Duration) -> Self {
        Self { candidate, latency }
    }

    /// Latency in seconds, the unit written to the output file
    pub fn latency_secs(&self) -> f64 {
        self.latency.as_secs_f64()
    }
}
