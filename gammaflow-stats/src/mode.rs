//! Mode of Truncated Values
//!
//! Samples are truncated toward zero to integers, then the longest run of
//! equal values in sorted order wins. Ties go to the smaller value.

use crate::descriptive::{StatsError, sorted_copy, validate};

/// Most frequent value after truncation toward zero
pub fn mode(samples: &[f64]) -> Result<i64, StatsError> {
    validate(samples, "mode")?;
    let sorted = sorted_copy(samples);
    let mut values = sorted.iter().map(|&x| x as i64);

    let Some(first) = values.next() else {
        return Err(StatsError::EmptyInput { statistic: "mode" });
    };

    let mut current = first;
    let mut run = 1usize;
    let mut mode = first;
    let mut mode_run = 0usize;

    for value in values {
        if value == current {
            run += 1;
            continue;
        }
        if run > mode_run {
            mode = current;
            mode_run = run;
        }
        current = value;
        run = 1;
    }

    // The run still open when the scan ends competes as well.
    if run > mode_run {
        mode = current;
    }

    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_run_last_in_sorted_order() {
        let samples = vec![1.2, 1.9, 2.1, 2.5, 2.99];
        assert_eq!(mode(&samples).unwrap(), 2);
    }

    #[test]
    fn test_longest_run_first() {
        let samples = vec![0.1, 0.5, 0.7, 1.5, 3.2];
        assert_eq!(mode(&samples).unwrap(), 0);
    }

    #[test]
    fn test_longest_run_in_middle() {
        let samples = vec![5.5, 1.0, 3.3, 3.9, 3.0, 7.1];
        assert_eq!(mode(&samples).unwrap(), 3);
    }

    #[test]
    fn test_tie_prefers_smaller_value() {
        let samples = vec![4.0, 4.5, 2.0, 2.5];
        assert_eq!(mode(&samples).unwrap(), 2);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // -0.9 and 0.9 both truncate to 0
        let samples = vec![-0.9, 0.9, -1.5];
        assert_eq!(mode(&samples).unwrap(), 0);
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(mode(&[7.8]).unwrap(), 7);
    }

    #[test]
    fn test_empty_samples() {
        assert_eq!(
            mode(&[]),
            Err(StatsError::EmptyInput { statistic: "mode" })
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut samples: Vec<f64> = (0..64).map(|i| i as f64 * 0.25).collect();
        for i in (0..samples.len()).step_by(5) {
            samples[i] = f64::NAN;
        }
        assert_eq!(
            mode(&samples),
            Err(StatsError::NonFinite { statistic: "mode" })
        );
        assert_eq!(
            mode(&[1.0, f64::INFINITY, 1.5]),
            Err(StatsError::NonFinite { statistic: "mode" })
        );
    }
}
