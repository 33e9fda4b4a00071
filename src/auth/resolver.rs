//! Credential resolution from explicit inputs and the CLI session file

use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

use super::session_file::{discover_cli_session_path, read_cli_session, session_relative_path};
use super::token::{SessionToken, TokenSource};
use super::SessionFile;
use crate::config::env;
use crate::error::{ClientError, Result};

/// Client id / secret pair for the client-credentials grant
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// How the client obtains bearer tokens
///
/// At least one of the three sources is always present.
#[derive(Debug, Clone, Default)]
pub struct CredentialStrategy {
    client_credentials: Option<ClientCredentials>,
    explicit_token: Option<String>,
    session: Option<SessionFile>,
    session_path: Option<PathBuf>,
}

impl CredentialStrategy {
    /// Strategy using only the client-credentials exchange
    pub fn client_credentials(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_credentials: Some(ClientCredentials {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            }),
            ..Self::default()
        }
    }

    /// Strategy using a token the caller already holds
    pub fn token(token: &str) -> Self {
        Self {
            explicit_token: Some(token.to_string()),
            ..Self::default()
        }
    }

    /// Add a token to adopt before the first exchange
    pub fn with_explicit_token(mut self, token: &str) -> Self {
        self.explicit_token = Some(token.to_string());
        self
    }

    pub fn client(&self) -> Option<&ClientCredentials> {
        self.client_credentials.as_ref()
    }

    pub fn session(&self) -> Option<&SessionFile> {
        self.session.as_ref()
    }

    /// Path the CLI session was read from, if one was used
    pub fn session_path(&self) -> Option<&Path> {
        self.session_path.as_deref()
    }

    /// Token to adopt before falling back to an exchange.
    ///
    /// An explicit token wins over the CLI session token.
    pub fn seed_token(&self) -> Option<SessionToken> {
        if let Some(token) = &self.explicit_token {
            return Some(SessionToken::new(token.clone(), TokenSource::Explicit));
        }
        self.session
            .as_ref()
            .and_then(SessionFile::access_token)
            .map(|token| SessionToken::new(token, TokenSource::CliSession))
    }

    /// Short human-readable description, without secrets
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.explicit_token.is_some() {
            parts.push("explicit token".to_string());
        }
        if let Some(path) = &self.session_path {
            parts.push(format!("CLI session {}", path.display()));
        }
        if let Some(creds) = &self.client_credentials {
            parts.push(format!("client credentials ({})", creds.client_id));
        }
        parts.join(", ")
    }
}

/// Decides the credential strategy without touching the network
#[derive(Debug, Default)]
pub struct CredentialResolver {
    search_from: Option<PathBuf>,
}

impl CredentialResolver {
    /// Resolver that never searches for a CLI session on its own
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable CLI session discovery starting at `dir`
    pub fn search_from(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_from = Some(dir.into());
        self
    }

    /// Resolve a credential strategy:
    /// 1. A CLI config path, if given, is read immediately (errors are fatal)
    /// 2. Without a complete client id/secret pair or explicit token, search
    ///    for a CLI session upwards from the configured directory
    /// 3. Fail when no source is left
    ///
    /// Empty strings are treated as absent.
    pub fn resolve(
        &self,
        client_id: Option<&str>,
        client_secret: Option<&str>,
        explicit_token: Option<&str>,
        cli_config_path: Option<&Path>,
    ) -> Result<CredentialStrategy> {
        let client_id = non_empty(client_id);
        let client_secret = non_empty(client_secret);
        let explicit_token = non_empty(explicit_token);

        let client_credentials = match (client_id, client_secret) {
            (Some(id), Some(secret)) => {
                debug!("Using client credentials for client id {}", id);
                Some(ClientCredentials {
                    client_id: id.to_string(),
                    client_secret: secret.to_string(),
                })
            }
            (Some(_), None) | (None, Some(_)) => {
                debug!("Ignoring incomplete client id/secret pair");
                None
            }
            (None, None) => None,
        };

        let session_path = match cli_config_path {
            Some(path) => Some(path.to_path_buf()),
            None if client_credentials.is_none() && explicit_token.is_none() => {
                self.discover_session()
            }
            None => None,
        };

        let session = match &session_path {
            Some(path) => {
                debug!("Reading CLI session from {}", path.display());
                Some(read_cli_session(path)?)
            }
            None => None,
        };

        if client_credentials.is_none() && explicit_token.is_none() && session.is_none() {
            return Err(ClientError::Configuration(
                self.credentials_not_found_message(),
            ));
        }

        if explicit_token.is_some() {
            debug!("Using explicitly supplied token");
        }

        Ok(CredentialStrategy {
            client_credentials,
            explicit_token: explicit_token.map(str::to_string),
            session,
            session_path,
        })
    }

    fn discover_session(&self) -> Option<PathBuf> {
        match &self.search_from {
            Some(dir) => discover_cli_session_path(dir),
            None => {
                debug!("CLI session discovery disabled (no start directory)");
                None
            }
        }
    }

    /// Generate helpful error message when no credential source is available
    fn credentials_not_found_message(&self) -> String {
        let searched = self
            .search_from
            .as_ref()
            .map(|dir| {
                format!(
                    "\n   Searched for {} from {} up to the filesystem root",
                    session_relative_path().display(),
                    dir.display()
                )
            })
            .unwrap_or_default();

        format!(
            "client_id and client_secret must be provided. Use one of:\n\
             \n\
             1. CLI arguments:     sitecoreai --client-id <ID> --client-secret <SECRET>\n\
             2. Environment vars:  export {}=<ID> {}=<SECRET>\n\
             3. CLI login:         sitecore cloud login (creates {})\n\
             {}",
            env::CLIENT_ID,
            env::CLIENT_SECRET,
            session_relative_path().display(),
            searched
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
