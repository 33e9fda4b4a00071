//! Authenticated access to the deploy API
//!
//! The [`ApiClient`] owns the HTTP transport and the bearer token. Requests
//! made through [`ApiClient::do_request`] refresh the token first when it is
//! missing or about to expire.

mod auth;
mod client;
mod environments;
mod poll;
mod request;

pub use auth::TokenStatus;
pub use client::ApiClient;
pub use environments::{environment_path, Environment};
pub use poll::wait_until;
pub use request::ApiResponse;
pub use reqwest::Method;
