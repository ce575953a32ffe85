//! Gamma Sampling
//!
//! Draws synthetic datasets from a gamma distribution using one seeded
//! generator shared by handle. The generator is never reseeded: every draw
//! continues the same stream, across however many datasets are produced.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Gamma};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from sampling
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SamplingError {
    /// Shape or scale is not a positive, finite number.
    #[error("Invalid gamma parameters (shape={shape}, scale={scale}): {reason}")]
    InvalidParameter {
        /// Requested shape
        shape: f64,
        /// Requested scale
        scale: f64,
        /// Why the parameters were rejected
        reason: String,
    },

    /// Zero samples were requested.
    #[error("Sample size must be at least 1")]
    EmptySample,

    /// A previous holder of the generator panicked.
    #[error("Random source is poisoned")]
    Poisoned,
}

/// Shared handle to one seeded pseudo-random generator
///
/// Clones refer to the same generator, so its state advances for every
/// holder whenever any of them draws.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: Arc<Mutex<StdRng>>,
    seed: u64,
}

impl RandomSource {
    /// Create a generator seeded with `seed`
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            seed,
        }
    }

    /// Seed the generator was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run `f` with exclusive access to the generator
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> Result<R, SamplingError> {
        let mut rng = self.rng.lock().map_err(|_| SamplingError::Poisoned)?;
        Ok(f(&mut rng))
    }
}

/// Draw `count` i.i.d. samples from Gamma(`shape`, `scale`)
///
/// Fails fast on a zero count or a non-positive/non-finite parameter instead
/// of producing degenerate output.
pub fn sample_gamma(
    count: usize,
    shape: f64,
    scale: f64,
    source: &RandomSource,
) -> Result<Vec<f64>, SamplingError> {
    if count == 0 {
        return Err(SamplingError::EmptySample);
    }

    let invalid = |reason: &str| SamplingError::InvalidParameter {
        shape,
        scale,
        reason: reason.to_string(),
    };
    if !shape.is_finite() || shape <= 0.0 {
        return Err(invalid("shape must be positive and finite"));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(invalid("scale must be positive and finite"));
    }

    let gamma = Gamma::new(shape, scale).map_err(|e| invalid(&e.to_string()))?;
    source.with_rng(|rng| gamma.sample_iter(rng).take(count).collect())
}
