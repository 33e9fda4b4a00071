//! Raw API request and environment wait arguments

use clap::{Parser, ValueEnum};

use crate::config::defaults;

/// HTTP methods accepted by 'api'
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", reqwest::Method::from(*self))
    }
}

/// Arguments for 'api'
#[derive(Parser, Debug)]
pub struct ApiArgs {
    /// HTTP method (case-insensitive)
    #[arg(value_enum, ignore_case = true)]
    pub method: HttpMethod,

    /// Request path appended to the base URL, e.g. /api/projects/v1
    pub path: String,

    /// JSON request body
    #[arg(short = 'd', long)]
    pub data: Option<String>,
}

/// Arguments for 'wait-env'
#[derive(Parser, Debug)]
pub struct WaitEnvArgs {
    /// Environment ID
    pub environment_id: String,

    /// Give up after this many minutes
    #[arg(short = 't', long, default_value_t = defaults::WAIT_TIMEOUT_MINUTES)]
    pub timeout_minutes: u64,

    /// Only print the final environment, without progress spinner
    #[arg(short = 'q', long, default_value_t = false)]
    pub quiet: bool,
}
