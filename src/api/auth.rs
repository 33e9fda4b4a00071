//! Token acquisition and refresh

use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::api::ApiClient;
use crate::auth::{SessionToken, TokenSource, TokenState};
use crate::config::auth;
use crate::error::{ClientError, Result};

/// Response from the OAuth token endpoint
#[derive(Deserialize, Debug)]
struct AuthResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Snapshot of the held token, without its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStatus {
    pub state: TokenState,
    pub source: Option<TokenSource>,
    pub expires_at: Option<i64>,
    /// Clock reading the state was computed against
    pub checked_at: i64,
}

impl TokenStatus {
    /// Seconds until the `exp` claim, negative once expired
    pub fn expires_in_secs(&self) -> Option<i64> {
        self.expires_at.map(|exp| exp - self.checked_at)
    }
}

impl ApiClient {
    /// Obtain a token if none is held.
    ///
    /// A held token is kept as is, even if it looks expired. Without one, a
    /// remaining explicit or CLI-session token is adopted before falling back
    /// to the client-credentials exchange.
    pub async fn authenticate(&self) -> Result<()> {
        let mut cell = self.token.lock().await;

        if cell.held.is_some() {
            debug!("Token already held, skipping authentication");
            return Ok(());
        }

        if let Some(seed) = cell.seed.take() {
            debug!("Adopting {} token without exchange", seed.source());
            cell.held = Some(seed);
            return Ok(());
        }

        cell.held = Some(self.exchange_client_credentials().await?);
        Ok(())
    }

    /// Make sure the held token is usable for at least the refresh margin.
    ///
    /// Idempotent; a fresh token is left alone.
    pub async fn ensure_token_valid(&self) -> Result<()> {
        self.bearer_token().await.map(|_| ())
    }

    /// Return a bearer token that passed the expiry check, refreshing first if needed
    pub async fn bearer_token(&self) -> Result<String> {
        let mut cell = self.token.lock().await;

        loop {
            let now = self.clock.now();
            let stale_source = match &cell.held {
                Some(token) if !token.needs_refresh(now, self.refresh_margin_secs) => {
                    return Ok(token.as_str().to_string());
                }
                Some(token) => Some(token.source()),
                None => None,
            };

            if let Some(source) = stale_source {
                debug!(
                    "Held {} token is expired, expiring soon or unreadable; re-authenticating",
                    source
                );
                cell.held = None;
            }

            // Seed tokens are checked like any other before first use
            if let Some(seed) = cell.seed.take() {
                debug!("Adopting {} token", seed.source());
                cell.held = Some(seed);
                continue;
            }

            let token = self.exchange_client_credentials().await?;
            let raw = token.as_str().to_string();
            cell.held = Some(token);
            return Ok(raw);
        }
    }

    /// Describe the held token at the current clock reading. Never refreshes.
    pub async fn token_status(&self) -> TokenStatus {
        let cell = self.token.lock().await;
        let now = self.clock.now();
        let held = cell.held.as_ref();

        TokenStatus {
            state: TokenState::of(held, now, self.refresh_margin_secs),
            source: held.map(SessionToken::source),
            expires_at: held.and_then(SessionToken::expires_at),
            checked_at: now,
        }
    }

    /// Run the OAuth client-credentials grant against the token endpoint
    async fn exchange_client_credentials(&self) -> Result<SessionToken> {
        let creds = self
            .credentials
            .client()
            .ok_or_else(|| ClientError::Authentication {
                status: None,
                message: "no valid token held and no client credentials available to obtain one"
                    .to_string(),
            })?;

        let url = format!("{}{}", self.auth_url, auth::TOKEN_PATH);
        debug!(
            "Requesting token from {} for client id {}",
            url, creds.client_id
        );

        let form = [
            ("audience", self.audience.as_str()),
            ("grant_type", "client_credentials"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
        ];

        let response = self.http.post(&url).form(&form).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Authentication {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Authentication {
                status: Some(status.as_u16()),
                message: format!("failed to decode token response: {}", e),
            })?;

        if auth.access_token.is_empty() {
            return Err(ClientError::Authentication {
                status: Some(status.as_u16()),
                message: "token endpoint returned an empty access_token".to_string(),
            });
        }

        debug!(
            "Obtained {} token (expires_in={:?})",
            auth.token_type.as_deref().unwrap_or("bearer"),
            auth.expires_in
        );

        Ok(SessionToken::new(
            auth.access_token,
            TokenSource::ClientCredentials,
        ))
    }
}
