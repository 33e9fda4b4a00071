//! Table output formatter

use comfy_table::{presets::NOTHING, Table};

use super::{Formatter, TokenStatusRow};

/// Formatter for plain table output
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format(&self, status: &TokenStatusRow) -> String {
        let mut table = Table::new();
        table
            .load_preset(NOTHING)
            .set_header(vec!["Source", "State", "Expires At", "Expires In"]);
        table.add_row(vec![
            &status.source,
            &status.state,
            &status.expires_at,
            &status.expires_in,
        ]);
        table.to_string()
    }
}
