// crates/hive-cli/src/output.rs
//
// Rendering helpers shared by the `hive` subcommands.
//
// Table mode prints titled sections with HONEY amounts in decimal form;
// JSON mode prints one pretty document with raw base units.

use clap::ValueEnum;
use serde::Serialize;
use tabled::{Table, Tabled};

use hive_core::error::HiveError;
use hive_economics::Honey;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Titled tables with decimal HONEY amounts (default).
    Table,
    /// One JSON document in base units.
    Json,
}

/// Base units rendered as a decimal HONEY amount.
pub fn honey(units: u128) -> String {
    Honey::from_units(units).to_string()
}

/// A section title underlined to its own width.
pub fn section(title: &str) -> String {
    format!("{}\n{}", title, "-".repeat(title.chars().count()))
}

/// Rows as a table, or a placeholder line when there are none.
pub fn table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::from("  (none)");
    }
    Table::new(rows).to_string()
}

/// Pretty-printed JSON.
pub fn json<T: Serialize>(value: &T) -> Result<String, HiveError> {
    Ok(serde_json::to_string_pretty(value)?)
}
