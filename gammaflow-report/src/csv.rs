//! CSV Output

use crate::report::SweepReport;
use gammaflow_core::RoundReport;

/// Column names of the CSV output
pub const CSV_HEADER: &str = "round,shape,scale,avg,stddev,median,mode";

/// Format one round as a CSV row (full precision)
pub fn format_csv_row(report: &RoundReport) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        report.round,
        report.shape,
        report.scale,
        report.facts.avg,
        report.facts.stddev,
        report.facts.median,
        report.facts.mode
    )
}

/// Generate a CSV document with a header and one row per round
pub fn generate_csv_report(report: &SweepReport) -> String {
    let mut output = String::from(CSV_HEADER);
    output.push('\n');
    for round in &report.rounds {
        output.push_str(&format_csv_row(round));
        output.push('\n');
    }
    output
}
