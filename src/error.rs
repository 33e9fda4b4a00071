use std::fmt;
use std::time::Duration;

use crate::api::ApiResponse;

/// Maximum number of response body bytes rendered in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error type for every client operation
#[derive(Debug)]
pub enum ClientError {
    /// Missing or invalid credentials, unreadable CLI session, bad transport settings
    Configuration(String),
    /// Token exchange failed or no credential could produce a token
    Authentication {
        status: Option<u16>,
        message: String,
    },
    /// Request body could not be encoded or response body could not be decoded
    Serialization(String),
    /// Network-level failure reaching the API or the auth host
    Transport(reqwest::Error),
    /// The API answered with status >= 400; the response is kept for inspection
    RequestFailed { status: u16, response: ApiResponse },
    /// A readiness poll ran out of time
    WaitTimeout { what: String, timeout: Duration },
}

impl ClientError {
    /// Status code of the failed request, if the API answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            ClientError::Authentication { status, .. } => *status,
            _ => None,
        }
    }

    /// The response attached to a `RequestFailed` error
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            ClientError::RequestFailed { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Consume the error and take ownership of the attached response
    pub fn into_response(self) -> Option<ApiResponse> {
        match self {
            ClientError::RequestFailed { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Truncate a response body so error messages stay readable
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}... (truncated, {} total bytes)",
        &body[..end],
        body.len()
    )
}

fn format_timeout(timeout: Duration) -> String {
    let secs = timeout.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} minutes", secs / 60)
    } else if secs > 0 {
        format!("{} seconds", secs)
    } else {
        format!("{} ms", timeout.as_millis())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ClientError::Authentication {
                status: Some(status),
                message,
            } => write!(
                f,
                "Authentication failed with status {}: {}",
                status, message
            ),
            ClientError::Authentication {
                status: None,
                message,
            } => write!(f, "Authentication failed: {}", message),
            ClientError::Serialization(msg) => write!(f, "JSON error: {}", msg),
            ClientError::Transport(e) => write!(f, "HTTP request failed: {}", e),
            ClientError::RequestFailed { status, response } => {
                write!(f, "Request to {} failed with status {}", response.url, status)?;
                let body = response.text();
                if !body.trim().is_empty() {
                    write!(f, ": {}", truncate_body(body.trim()))?;
                }
                Ok(())
            }
            ClientError::WaitTimeout { what, timeout } => write!(
                f,
                "Timed out waiting for {} after {}",
                what,
                format_timeout(*timeout)
            ),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
