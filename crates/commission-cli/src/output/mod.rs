pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use std::fs;
use std::io::{self, Write};

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch an envelope to the selected formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Write pre-rendered text (an export) to `path`, or stdout when absent.
pub fn write_text(path: Option<&str>, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            fs::write(path, text).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
            tracing::info!(path = %path, bytes = text.len(), "wrote export");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(text.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}
