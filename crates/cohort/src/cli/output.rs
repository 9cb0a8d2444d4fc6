//! Output formatting utilities

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;

use tabled::{builder::Builder, settings::Style};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Pretty,
    Table,
}

/// Color output modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: ColorMode) {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal(),
    };
    colored::control::set_override(enabled);
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            eprintln!("{}", format_success(&format!("Output written to {}", path.display())));
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Format value as table (if possible)
///
/// Arrays of objects become one row per object with the first object's keys
/// as columns; a single object becomes a key/value table.
pub fn format_as_table(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let Some(Value::Object(first)) = items.first() else {
                return if items.is_empty() {
                    Some("(empty list)".to_string())
                } else {
                    None
                };
            };
            let keys: Vec<&String> = first.keys().collect();

            let mut builder = Builder::default();
            builder.push_record(keys.iter().map(|k| k.as_str()));
            for item in items {
                let row: Vec<String> = keys
                    .iter()
                    .map(|k| item.get(k.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
            Some(builder.build().with(Style::modern()).to_string())
        }
        Value::Object(obj) => {
            let mut builder = Builder::default();
            builder.push_record(["Key", "Value"]);
            for (key, value) in obj {
                builder.push_record([key.clone(), format_value(value)]);
            }
            Some(builder.build().with(Style::modern()).to_string())
        }
        _ => None,
    }
}

/// Render one table cell
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| format!("{}={}", k, format_value(v)))
            .collect::<Vec<_>>()
            .join(" "),
        scalar => scalar.to_string(),
    }
}

/// Render a value in the requested format
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let pretty = match format {
        OutputFormat::Json => false,
        OutputFormat::Pretty => true,
        OutputFormat::Table => match format_as_table(value) {
            Some(table) => return Ok(table),
            None => true,
        },
    };
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize JSON")
}

/// Print output in the requested format
pub fn print_output(value: &Value, format: OutputFormat, output_file: Option<&Path>) -> Result<()> {
    let content = render(value, format)?;
    write_output(&content, output_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_columns_follow_first_row() {
        let rows = json!([
            {"patientId": "p2", "score": 0.9},
            {"patientId": "p1", "score": 0.25}
        ]);
        let table = render(&rows, OutputFormat::Table).unwrap();
        assert!(table.contains("patientId"));
        assert!(table.contains("p2"));
        assert!(table.contains("0.25"));
    }

    #[test]
    fn test_scalar_table_falls_back_to_json() {
        assert_eq!(render(&json!(true), OutputFormat::Table).unwrap(), "true");
        assert_eq!(render(&json!({"a": [1]}), OutputFormat::Json).unwrap(), r#"{"a":[1]}"#);
    }

    #[test]
    fn test_nested_object_cells() {
        assert_eq!(
            format_value(&json!({"missingLeaves": 1})),
            "missingLeaves=1"
        );
    }
}
