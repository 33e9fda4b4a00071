//! JSON output formatter

use serde::Serialize;

use super::{Formatter, TokenStatusRow};

/// Formatter for JSON output
pub struct JsonFormatter;

/// Serializable token status for JSON output
#[derive(Serialize)]
struct JsonTokenStatus<'a> {
    source: &'a str,
    state: &'a str,
    expires_at: &'a str,
    expires_in: &'a str,
}

impl<'a> From<&'a TokenStatusRow> for JsonTokenStatus<'a> {
    fn from(row: &'a TokenStatusRow) -> Self {
        Self {
            source: &row.source,
            state: &row.state,
            expires_at: &row.expires_at,
            expires_in: &row.expires_in,
        }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, status: &TokenStatusRow) -> String {
        match serde_json::to_string_pretty(&JsonTokenStatus::from(status)) {
            Ok(json) => json,
            Err(e) => format!("Error serializing to JSON: {}", e),
        }
    }
}
