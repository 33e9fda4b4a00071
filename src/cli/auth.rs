//! Auth command definitions and arguments

use clap::{Parser, Subcommand};

use super::common::OutputFormat;

/// Subcommands of 'auth'
#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Authenticate and show where the token came from and when it expires
    Status(AuthStatusArgs),

    /// Print a valid bearer token, refreshing it first if needed
    Token,
}

/// Arguments for 'auth status'
#[derive(Parser, Debug)]
pub struct AuthStatusArgs {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}
