//! Descriptive Statistics
//!
//! Mean, standard deviation and median of a dataset. Every function rejects an
//! empty dataset with `StatsError::EmptyInput` and a dataset holding NaN or an
//! infinity with `StatsError::NonFinite` instead of returning NaN.

use thiserror::Error;

/// Errors from statistic computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StatsError {
    /// The dataset has no samples.
    #[error("Cannot compute {statistic} of an empty dataset")]
    EmptyInput {
        /// Name of the statistic that was requested
        statistic: &'static str,
    },

    /// The dataset holds NaN or an infinity.
    #[error("Cannot compute {statistic} of a dataset with non-finite samples")]
    NonFinite {
        /// Name of the statistic that was requested
        statistic: &'static str,
    },
}

/// Reject empty and non-finite datasets
pub(crate) fn validate(samples: &[f64], statistic: &'static str) -> Result<(), StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptyInput { statistic });
    }
    if samples.iter().any(|x| !x.is_finite()) {
        return Err(StatsError::NonFinite { statistic });
    }
    Ok(())
}

/// Arithmetic mean
pub fn mean(samples: &[f64]) -> Result<f64, StatsError> {
    validate(samples, "mean")?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation around `mean`
///
/// `mean` is taken as given rather than recomputed, so callers can share one
/// mean between several consumers.
pub fn std_dev(samples: &[f64], mean: f64) -> Result<f64, StatsError> {
    validate(samples, "standard deviation")?;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    Ok(variance.sqrt())
}

/// Median of the samples
///
/// Sorts a private copy; the input is never reordered. For an even number of
/// samples this is the average of the two middle order statistics.
pub fn median(samples: &[f64]) -> Result<f64, StatsError> {
    validate(samples, "median")?;

    let sorted = sorted_copy(samples);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

pub(crate) fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}
