//! Credential resolution and token bookkeeping
//!
//! Nothing in this module talks to the network; the token exchange lives on
//! the `ApiClient`.

mod clock;
mod resolver;
mod session_file;
mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use resolver::{ClientCredentials, CredentialResolver, CredentialStrategy};
pub use session_file::{
    discover_cli_session_path, read_cli_session, session_relative_path, SessionEndpoint,
    SessionEndpoints, SessionFile,
};
pub use token::{decode_expiry, SessionToken, TokenSource, TokenState};

#[cfg(test)]
pub(crate) use token::test_support;
