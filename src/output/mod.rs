//! Output formatting for CLI results

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cache::{Notification, NotificationLevel};
use crate::cli::OutputFormat;
use crate::error::{Result, ValidationError};

pub mod json;
pub mod table;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;

    /// Format and print to stdout
    fn print(&self, format: OutputFormat) -> Result<()> {
        let output = self.format(format)?;
        println!("{}", output);
        Ok(())
    }
}

/// Lists of display rows render as a table, or as a JSON array.
impl<T: Tabled + Serialize> Formattable for Vec<T> {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json(self)?),
            OutputFormat::Pretty | OutputFormat::Table => Ok(table::format_table(self)),
        }
    }
}

/// Print a write notification to stderr
pub fn print_notification(notification: &Notification) {
    match notification.level {
        NotificationLevel::Success => eprintln!(
            "{} {}: {}",
            "✓".green(),
            notification.title.bold(),
            notification.description
        ),
        NotificationLevel::Error => eprintln!(
            "{} {}: {}",
            "✗".red(),
            notification.title.bold(),
            notification.description
        ),
    }
}

/// Print each violated field on its own line to stderr
pub fn print_field_errors(error: &ValidationError) {
    for field in &error.fields {
        eprintln!("  {} {}: {}", "•".red(), field.field.bold(), field.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled, Serialize)]
    struct Row {
        #[tabled(rename = "ID")]
        id: u64,
    }

    #[test]
    fn test_vec_formats_as_table_or_json() {
        let rows = vec![Row { id: 7 }];

        let table = rows.format(OutputFormat::Table).unwrap();
        assert!(table.contains("ID"));

        let json = rows.format(OutputFormat::Json).unwrap();
        assert!(json.contains("\"id\": 7"));
    }
}
