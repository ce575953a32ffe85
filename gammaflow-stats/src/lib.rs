#![warn(missing_docs)]
//! Gammaflow Statistical Engine
//!
//! Provides the statistics computed for every synthetic dataset:
//! - Arithmetic mean
//! - Population standard deviation around a precomputed mean
//! - Median (order statistic, operating on a private sorted copy)
//! - Mode of the values truncated toward zero
//!
//! and the gamma sampler that produces those datasets from a shared,
//! seeded `RandomSource`.

mod descriptive;
mod mode;
mod sampling;

pub use descriptive::{StatsError, mean, median, std_dev};
pub use mode::mode;
pub use sampling::{RandomSource, SamplingError, sample_gamma};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_SEED, 1);
    }
}
