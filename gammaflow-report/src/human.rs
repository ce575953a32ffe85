//! Human Output
//!
//! Numbers are printed with a fixed number of significant digits, switching
//! to scientific notation for very small or very large magnitudes, and with
//! trailing zeros removed (`0.690` prints as `0.69`).

use gammaflow_core::RoundReport;

/// Format `value` with `precision` significant digits
pub fn format_significant(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let precision = precision.max(1);

    // Let the scientific formatter do the rounding, then read the exponent
    // back; rounding can carry into the next power of ten (9.996 -> 1.00e1).
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Format one round as `avg=…, stddev=…, median=…, mode=…`
pub fn format_round_line(report: &RoundReport, precision: usize) -> String {
    let facts = &report.facts;
    format!(
        "avg={}, stddev={}, median={}, mode={}",
        format_significant(facts.avg, precision),
        format_significant(facts.stddev, precision),
        format_significant(facts.median, precision),
        facts.mode
    )
}
