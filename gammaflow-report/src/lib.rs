#![warn(missing_docs)]
//! Gammaflow Report - Sweep Output
//!
//! Generates the result stream of a sweep in several formats:
//! - Human (one `avg=…, stddev=…, median=…, mode=…` line per round)
//! - JSON (machine-readable, with run metadata)
//! - CSV (spreadsheet-compatible)

mod csv;
mod human;
mod json;
mod report;

pub use csv::{CSV_HEADER, format_csv_row, generate_csv_report};
pub use human::{format_round_line, format_significant};
pub use json::generate_json_report;
pub use report::{ReportMeta, SweepReport};

/// Significant digits used for human output unless configured otherwise
pub const DEFAULT_PRECISION: usize = 3;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with run metadata
    Json,
    /// CSV for spreadsheets
    Csv,
    /// Human-readable line per round
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
