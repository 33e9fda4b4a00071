//! Bearer token with its unsigned expiry claim
//!
//! The signature is never checked. Only the payload segment is decoded, and
//! only to learn when the token should be replaced.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;
use std::fmt;

/// Claims we care about; everything else in the payload is ignored
#[derive(Deserialize, Debug)]
struct Claims {
    exp: Option<f64>,
}

/// Where the held token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Supplied directly by the caller
    Explicit,
    /// Copied from the CLI session file
    CliSession,
    /// Issued by the client-credentials exchange
    ClientCredentials,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Explicit => write!(f, "explicit"),
            TokenSource::CliSession => write!(f, "cli-session"),
            TokenSource::ClientCredentials => write!(f, "client-credentials"),
        }
    }
}

/// Lifecycle state of the held token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Absent,
    Valid,
    ExpiredOrExpiringSoon,
}

impl TokenState {
    /// Classify an optional token at `now`
    pub fn of(token: Option<&SessionToken>, now: i64, margin_secs: i64) -> Self {
        match token {
            None => TokenState::Absent,
            Some(t) if t.needs_refresh(now, margin_secs) => TokenState::ExpiredOrExpiringSoon,
            Some(_) => TokenState::Valid,
        }
    }
}

impl fmt::Display for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenState::Absent => write!(f, "absent"),
            TokenState::Valid => write!(f, "valid"),
            TokenState::ExpiredOrExpiringSoon => write!(f, "expired-or-expiring-soon"),
        }
    }
}

/// An opaque bearer string plus its parsed expiry
///
/// Replaced wholesale on refresh, never mutated.
#[derive(Clone)]
pub struct SessionToken {
    raw: String,
    expires_at: Option<i64>,
    source: TokenSource,
}

impl SessionToken {
    pub fn new(raw: impl Into<String>, source: TokenSource) -> Self {
        let raw = raw.into();
        let expires_at = decode_expiry(&raw);
        Self {
            raw,
            expires_at,
            source,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `exp` claim in epoch seconds, if the token carries a readable one
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// True when the token must be replaced before use.
    ///
    /// Tokens without a readable `exp` always need a refresh. Otherwise the
    /// boundary is inclusive: `now == exp - margin` already refreshes.
    pub fn needs_refresh(&self, now: i64, margin_secs: i64) -> bool {
        match self.expires_at {
            None => true,
            Some(exp) => now > exp || now >= exp.saturating_sub(margin_secs),
        }
    }
}

// Keep the token value out of debug output and logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("expires_at", &self.expires_at)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Read the `exp` claim from a three-segment token.
///
/// Returns `None` for anything that is not exactly three dot-separated
/// segments, a payload that is not base64url JSON, or a missing or
/// non-numeric `exp`.
pub fn decode_expiry(token: &str) -> Option<i64> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&payload).ok()?;

    claims
        .exp
        .filter(|exp| exp.is_finite())
        .map(|exp| exp.trunc() as i64)
}
