//! CLI argument parsing

mod api;
mod auth;
mod common;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{defaults, env};

pub use api::{ApiArgs, HttpMethod, WaitEnvArgs};
pub use auth::{AuthCommand, AuthStatusArgs};
pub use common::OutputFormat;

/// SitecoreAI deploy API client
#[derive(Parser, Debug)]
#[command(name = "sitecoreai")]
#[command(version)]
#[command(about = "Authenticated client for the SitecoreAI deploy API", long_about = None)]
pub struct Cli {
    /// OAuth client ID
    #[arg(long, global = true, env = env::CLIENT_ID)]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, global = true, env = env::CLIENT_SECRET, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Bearer token to use instead of the client-credentials exchange
    #[arg(long, global = true, env = env::TOKEN, hide_env_values = true)]
    pub token: Option<String>,

    /// Path to a Sitecore CLI session file (.sitecore/user.json)
    ///
    /// Without it, and without client credentials or a token, the file is
    /// searched for in the current directory and its parents.
    #[arg(long, global = true)]
    pub cli_config: Option<PathBuf>,

    /// Deploy API base URL (overrides the CLI session host)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// OAuth authority URL (overrides the CLI session authority)
    #[arg(long, global = true)]
    pub auth_url: Option<String>,

    /// Route all traffic through this proxy (disables TLS verification)
    #[arg(long, global = true, env = env::PROXY)]
    pub proxy: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or print the bearer token
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Send an authenticated request and print the response body
    Api(ApiArgs),

    /// Wait until an environment has finished provisioning
    #[command(name = "wait-env")]
    WaitEnv(WaitEnvArgs),
}
