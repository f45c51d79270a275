//! Single-candidate validation

use crate::proxy::models::{Candidate, FailureReason, ValidationOutcome};
use crate::Result;
use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{redirect, Client, Proxy as ReqwestProxy, Url};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::trace;

/// Default timeout for proxy checks in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default URL to test proxies against
pub const DEFAULT_TEST_URL: &str = "http://httpbin.org/ip";

/// Which target schemes are routed through the candidate
///
/// A request whose scheme falls outside the scope goes out directly, so the
/// test URL must be covered by the scope for a check to mean anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ProxyScope {
    /// Plain HTTP targets only
    #[default]
    Http,
    /// HTTPS targets only, tunnelled with CONNECT
    Https,
    /// Both plain and encrypted targets
    All,
}

impl ProxyScope {
    /// Whether a request to `url` would be sent through the proxy
    pub fn covers(&self, url: &Url) -> bool {
        match self {
            ProxyScope::Http => url.scheme() == "http",
            ProxyScope::Https => url.scheme() == "https",
            ProxyScope::All => matches!(url.scheme(), "http" | "https"),
        }
    }
}

impl fmt::Display for ProxyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyScope::Http => write!(f, "http"),
            ProxyScope::Https => write!(f, "https"),
            ProxyScope::All => write!(f, "all"),
        }
    }
}

/// Configuration for proxy validation
///
/// The test URL's scheme must be covered by `scope`. A validator never sends
/// a request that would bypass the candidate; such checks fail as `Other`.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// URL to test proxies against
    pub test_url: String,
    /// Schemes routed through the candidate
    pub scope: ProxyScope,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            test_url: DEFAULT_TEST_URL.to_string(),
            scope: ProxyScope::default(),
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_test_url(mut self, url: impl Into<String>) -> Self {
        self.test_url = url.into();
        self
    }

    pub fn with_scope(mut self, scope: ProxyScope) -> Self {
        self.scope = scope;
        self
    }
}

/// Something that can decide whether a candidate works
///
/// Implementations must be safe to call concurrently for many candidates.
#[async_trait]
pub trait Validate: Send + Sync {
    async fn validate(&self, candidate: &Candidate) -> ValidationOutcome;
}

/// Validates a candidate by sending one GET through it
#[derive(Debug, Clone, Default)]
pub struct ProxyValidator {
    config: ValidatorConfig,
}

impl ProxyValidator {
    /// Create a new validator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new validator with custom configuration
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Check a single candidate
    ///
    /// Latency covers the request alone, not building the client.
    pub async fn check_proxy(&self, candidate: &Candidate) -> ValidationOutcome {
        let test_url = match self.routed_test_url() {
            Ok(url) => url,
            Err(e) => return ValidationOutcome::failed(FailureReason::Other(e.to_string())),
        };

        let client = match self.build_client(candidate).await {
            Ok(client) => client,
            Err(e) => return ValidationOutcome::failed(FailureReason::Other(e.to_string())),
        };

        let start = Instant::now();
        let outcome = match tokio::time::timeout(
            self.config.timeout,
            client.get(test_url).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.status().is_success() {
                    ValidationOutcome::working(start.elapsed())
                } else {
                    ValidationOutcome::failed(FailureReason::BadStatus(response.status().as_u16()))
                }
            }
            Ok(Err(e)) => ValidationOutcome::failed(classify_error(&e)),
            Err(_) => ValidationOutcome::failed(FailureReason::Timeout),
        };

        trace!(proxy = %candidate, ?outcome, "check finished");
        outcome
    }

    /// The test URL, provided the scope sends it through the candidate
    fn routed_test_url(&self) -> Result<Url> {
        let url = Url::parse(&self.config.test_url)
            .with_context(|| format!("invalid test URL {:?}", self.config.test_url))?;
        if !self.config.scope.covers(&url) {
            bail!(
                "test URL {} is not routed through the proxy with scope {}",
                url,
                self.config.scope
            );
        }
        Ok(url)
    }

    /// Build the client on the blocking pool; loading TLS roots stalls the runtime otherwise
    async fn build_client(&self, candidate: &Candidate) -> Result<Client> {
        let validator = self.clone();
        let candidate = candidate.clone();
        tokio::task::spawn_blocking(move || validator.create_client(&candidate)).await?
    }

    /// Create a reqwest client that routes the configured scope through the candidate
    ///
    /// Redirects are not followed, so a check is exactly one request and a
    /// redirecting proxy fails as `BadStatus`.
    fn create_client(&self, candidate: &Candidate) -> Result<Client> {
        let proxy_url = candidate.url();

        let reqwest_proxy = match self.config.scope {
            ProxyScope::Http => ReqwestProxy::http(&proxy_url)?,
            ProxyScope::Https => ReqwestProxy::https(&proxy_url)?,
            ProxyScope::All => ReqwestProxy::all(&proxy_url)?,
        };

        let client = Client::builder()
            .proxy(reqwest_proxy)
            .redirect(redirect::Policy::none())
            .timeout(self.config.timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(client)
    }
}

#[async_trait]
impl Validate for ProxyValidator {
    async fn validate(&self, candidate: &Candidate) -> ValidationOutcome {
        self.check_proxy(candidate).await
    }
}

/// Map a transport error onto the coarse failure classes
fn classify_error(error: &reqwest::Error) -> FailureReason {
    if error.is_timeout() {
        FailureReason::Timeout
    } else if error.is_connect() {
        FailureReason::ConnectionError
    } else if let Some(status) = error.status() {
        FailureReason::BadStatus(status.as_u16())
    } else {
        let message = error.to_string();
        FailureReason::Other(message.lines().next().unwrap_or_default().to_string())
    }
}
