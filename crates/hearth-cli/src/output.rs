// crates/hearth-cli/src/output.rs
//
// Output formatting utilities for the hearth CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print `value` as JSON, or `rows` as a table.
pub fn emit<T: Serialize, R: Tabled>(format: OutputFormat, value: &T, rows: &[R]) {
    match format {
        OutputFormat::Json => println!("{}", format_json(value)),
        OutputFormat::Table => println!("{}", format_table(rows)),
    }
}

/// Two-column key/value row for single-record views.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl FieldRow {
    pub fn new(field: &'static str, value: impl ToString) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Render a trust value with fixed precision.
pub fn trust(value: f64) -> String {
    format!("{:.3}", value)
}

pub fn or_dash(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_contains_headers_and_values() {
        let rows = vec![FieldRow::new("User", "alice"), FieldRow::new("Trust", trust(0.8))];
        let table = format_table(&rows);
        assert!(table.contains("Field"));
        assert!(table.contains("alice"));
        assert!(table.contains("0.800"));
    }

    #[test]
    fn dash_for_missing_values() {
        assert_eq!(or_dash(None::<u32>), "--");
        assert_eq!(or_dash(Some(2)), "2");
    }
}
