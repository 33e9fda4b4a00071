//! Output formatting module
//!
//! Handles the table and JSON renderings of command results

mod json;
mod table;

use chrono::{DateTime, Utc};

use crate::api::{ApiResponse, Environment, TokenStatus};
use crate::cli::OutputFormat;

pub use self::json::JsonFormatter;
pub use self::table::TableFormatter;

/// Trait for output formatters
pub trait Formatter {
    /// Render the token status
    fn format(&self, status: &TokenStatusRow) -> String;
}

/// Flattened token status for output
#[derive(Debug, Clone)]
pub struct TokenStatusRow {
    pub source: String,
    pub state: String,
    pub expires_at: String,
    pub expires_in: String,
}

impl TokenStatusRow {
    pub fn new(status: &TokenStatus) -> Self {
        Self {
            source: status
                .source
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
            state: status.state.to_string(),
            expires_at: status
                .expires_at
                .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0))
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string()),
            expires_in: status
                .expires_in_secs()
                .map(format_remaining)
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Human readable remaining lifetime, e.g. `59m 30s` or `expired 2m 5s ago`
fn format_remaining(secs: i64) -> String {
    let abs = secs.unsigned_abs();
    let text = if abs >= 3600 {
        format!("{}h {}m", abs / 3600, (abs % 3600) / 60)
    } else if abs >= 60 {
        format!("{}m {}s", abs / 60, abs % 60)
    } else {
        format!("{}s", abs)
    };
    if secs < 0 {
        format!("expired {} ago", text)
    } else {
        text
    }
}

/// Print the token status in the requested format
pub fn output_token_status(status: &TokenStatus, format: &OutputFormat) {
    let row = TokenStatusRow::new(status);
    let rendered = match format {
        OutputFormat::Table => TableFormatter.format(&row),
        OutputFormat::Json => JsonFormatter.format(&row),
    };
    println!("{}", rendered);
}

/// Response body for display: pretty JSON when it parses, raw text otherwise
pub fn render_body(response: &ApiResponse) -> String {
    match serde_json::from_slice::<serde_json::Value>(&response.body) {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| response.text().into_owned())
        }
        Err(_) => response.text().into_owned(),
    }
}

/// Print an environment as pretty JSON
pub fn output_environment(environment: &Environment) {
    match serde_json::to_string_pretty(environment) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}
