use std::time::Duration;

use crate::auth::SessionFile;

/// Configuration constants for the deploy API
pub mod api {
    /// Default deploy API host
    pub const DEFAULT_BASE_URL: &str = "https://xmclouddeploy-api.sitecorecloud.io";

    /// Environments v2 endpoint
    pub const ENVIRONMENTS_V2: &str = "/api/environments/v2";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Default connect timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Interval between readiness polls in seconds
    pub const POLL_INTERVAL_SECS: u64 = 1;
}

/// Configuration constants for authentication
pub mod auth {
    /// Default OAuth authority
    pub const DEFAULT_AUTH_URL: &str = "https://auth.sitecorecloud.io";

    /// Token endpoint path (relative to the authority)
    pub const TOKEN_PATH: &str = "/oauth/token";

    /// Audience requested in the client-credentials exchange
    pub const AUDIENCE: &str = "https://api.sitecorecloud.io";

    /// Refresh a token this many seconds before it expires
    pub const REFRESH_MARGIN_SECS: i64 = 300;
}

/// Configuration constants for the CLI session file
pub mod session {
    /// Hidden directory written by the companion CLI
    pub const DIR_NAME: &str = ".sitecore";

    /// Session file name inside `DIR_NAME`
    pub const FILE_NAME: &str = "user.json";
}

/// Environment variable names, read only by the binary
pub mod env {
    pub const CLIENT_ID: &str = "SITECOREAI_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "SITECOREAI_CLIENT_SECRET";
    pub const TOKEN: &str = "SITECOREAI_TOKEN";
    pub const PROXY: &str = "SITECOREAI_PROXY";
}

/// Default values for CLI
pub mod defaults {
    /// Default log level
    pub const LOG_LEVEL: &str = "warn";

    /// Default readiness timeout for `wait-env`
    pub const WAIT_TIMEOUT_MINUTES: u64 = 30;
}

/// Settings for an `ApiClient`, assembled once and never mutated afterwards
///
/// URLs left unset fall back to the CLI session endpoints (when a session was
/// resolved) and then to the public defaults.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub auth_url: Option<String>,
    pub audience: String,
    /// Route all traffic through this proxy. TLS verification is disabled
    /// on the proxied transport.
    pub proxy_url: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub refresh_margin_secs: i64,
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_url: None,
            audience: auth::AUDIENCE.to_string(),
            proxy_url: None,
            timeout: Duration::from_secs(api::REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(api::CONNECT_TIMEOUT_SECS),
            refresh_margin_secs: auth::REFRESH_MARGIN_SECS,
            poll_interval: Duration::from_secs(api::POLL_INTERVAL_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = non_empty(url.into());
        self
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = non_empty(url.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy_url = non_empty(proxy.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Effective API base URL: explicit, then session host, then default
    pub fn resolve_base_url(&self, session: Option<&SessionFile>) -> String {
        let url = self
            .base_url
            .clone()
            .or_else(|| session.and_then(|s| s.host().map(str::to_string)))
            .unwrap_or_else(|| api::DEFAULT_BASE_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    /// Effective OAuth authority: explicit, then session authority, then default
    pub fn resolve_auth_url(&self, session: Option<&SessionFile>) -> String {
        let url = self
            .auth_url
            .clone()
            .or_else(|| session.and_then(|s| s.authority().map(str::to_string)))
            .unwrap_or_else(|| auth::DEFAULT_AUTH_URL.to_string());
        url.trim_end_matches('/').to_string()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_endpoints() -> SessionFile {
        serde_json::from_str(
            r#"{"endpoints":{"xmCloud":{
                "host":"https://test-api.sitecorecloud.io/",
                "authority":"https://test-auth.sitecorecloud.io/"
            }}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.resolve_base_url(None), api::DEFAULT_BASE_URL);
        assert_eq!(config.resolve_auth_url(None), auth::DEFAULT_AUTH_URL);
        assert_eq!(config.audience, auth::AUDIENCE);
        assert_eq!(config.refresh_margin_secs, 300);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(config.proxy_url.is_none());
    }

    #[test]
    fn test_session_endpoints_used_and_trimmed() {
        let session = session_with_endpoints();
        let config = ClientConfig::new();
        assert_eq!(
            config.resolve_base_url(Some(&session)),
            "https://test-api.sitecorecloud.io"
        );
        assert_eq!(
            config.resolve_auth_url(Some(&session)),
            "https://test-auth.sitecorecloud.io"
        );
    }

    #[test]
    fn test_explicit_urls_override_session() {
        let session = session_with_endpoints();
        let config = ClientConfig::new()
            .with_base_url("http://localhost:8080/")
            .with_auth_url("http://localhost:9090");
        assert_eq!(
            config.resolve_base_url(Some(&session)),
            "http://localhost:8080"
        );
        assert_eq!(
            config.resolve_auth_url(Some(&session)),
            "http://localhost:9090"
        );
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = ClientConfig::new().with_base_url("").with_proxy("  ");
        assert!(config.base_url.is_none());
        assert!(config.proxy_url.is_none());
    }

    #[test]
    fn test_session_dir_layout() {
        assert!(session::DIR_NAME.starts_with('.'));
        assert!(session::FILE_NAME.ends_with(".json"));
        assert!(auth::TOKEN_PATH.starts_with('/'));
    }
}
