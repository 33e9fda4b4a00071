//! Deploy API client: transport setup and shared state

use log::{debug, warn};
use reqwest::{Client, Proxy};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::auth::{Clock, CredentialStrategy, SessionToken, SystemClock};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Token bookkeeping guarded by the client's mutex
#[derive(Debug, Default)]
pub(crate) struct TokenCell {
    /// Token sent with requests
    pub(crate) held: Option<SessionToken>,
    /// Explicit or CLI-session token not yet adopted; consumed at most once
    pub(crate) seed: Option<SessionToken>,
}

/// Authenticated client for the deploy API
///
/// Every request goes through `ensure_token_valid`, which refreshes the
/// bearer token when it is absent or within the refresh margin of expiry.
/// The check-and-refresh runs under one lock, so concurrent callers on the
/// same client trigger at most one exchange.
pub struct ApiClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) auth_url: String,
    pub(crate) audience: String,
    pub(crate) credentials: CredentialStrategy,
    pub(crate) token: Mutex<TokenCell>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) refresh_margin_secs: i64,
    pub(crate) poll_interval: Duration,
}

impl ApiClient {
    /// Create a client from an assembled configuration and a resolved strategy.
    ///
    /// No network I/O happens here; the first token is obtained lazily.
    pub fn new(config: &ClientConfig, credentials: CredentialStrategy) -> Result<Self> {
        let http = build_http_client(config)?;
        let base_url = config.resolve_base_url(credentials.session());
        let auth_url = config.resolve_auth_url(credentials.session());

        debug!(
            "Creating API client: base_url={}, auth_url={}, credentials=[{}]",
            base_url,
            auth_url,
            credentials.describe()
        );

        let seed = credentials.seed_token();

        Ok(Self {
            http,
            base_url,
            auth_url,
            audience: config.audience.clone(),
            credentials,
            token: Mutex::new(TokenCell { held: None, seed }),
            clock: Arc::new(SystemClock),
            refresh_margin_secs: config.refresh_margin_secs,
            poll_interval: config.poll_interval,
        })
    }

    /// Replace the time source used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// API base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// OAuth authority (no trailing slash)
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    pub fn credentials(&self) -> &CredentialStrategy {
        &self.credentials
    }
}

/// Build the HTTP transport.
///
/// A configured proxy receives all traffic and TLS certificate verification
/// is turned off for it.
fn build_http_client(config: &ClientConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .connect_timeout(config.connect_timeout)
        .timeout(config.timeout);

    if let Some(proxy_url) = &config.proxy_url {
        let proxy = Proxy::all(proxy_url.as_str()).map_err(|e| {
            ClientError::Configuration(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        warn!(
            "Using insecure proxy for {} (TLS certificate verification disabled)",
            proxy_url
        );
        builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

#[cfg(test)]
impl ApiClient {
    /// Client pointed at a mock server for both the API and the token endpoint
    pub(crate) fn test_client(base_url: &str, credentials: CredentialStrategy) -> Self {
        let config = ClientConfig::new()
            .with_base_url(base_url)
            .with_auth_url(base_url)
            .with_poll_interval(Duration::from_millis(10));
        Self::new(&config, credentials).unwrap()
    }
}
