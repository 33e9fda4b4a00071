//! sitecoreai - Authenticated client for the SitecoreAI deploy API
//!
//! Resolves credentials (client id/secret, an explicit bearer token, or a
//! session file written by the Sitecore CLI), keeps a bearer token fresh
//! and sends JSON requests to the deploy API.
//!
//! # Example
//!
//! ```bash
//! # Show where the token comes from and when it expires
//! sitecoreai auth status
//!
//! # Call any API path
//! sitecoreai api GET /api/projects/v1
//!
//! # Wait for a freshly created environment to finish provisioning
//! sitecoreai wait-env <environment-id> --timeout-minutes 45
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod ui;

pub use api::{wait_until, ApiClient, ApiResponse, Environment, Method, TokenStatus};
pub use auth::{
    Clock, CredentialResolver, CredentialStrategy, ManualClock, SessionToken, SystemClock,
    TokenSource, TokenState,
};
pub use cli::{ApiArgs, AuthCommand, Cli, Command, OutputFormat, WaitEnvArgs};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
