//! JSON Output

use crate::report::SweepReport;

/// Generate a prettified JSON report.
pub fn generate_json_report(report: &SweepReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
