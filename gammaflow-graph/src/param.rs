//! Parameter Cells
//!
//! A `Param` is a shared `f64` read by root nodes at evaluation time, so the
//! graph topology stays fixed while its inputs change between evaluations.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared, lock-free `f64` cell
#[derive(Debug, Clone)]
pub struct Param {
    bits: Arc<AtomicU64>,
}

impl Param {
    /// Create a cell holding `value`
    pub fn new(value: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(value.to_bits())),
        }
    }

    /// Current value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Replace the value
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// Add `delta` and return the new value
    pub fn add(&self, delta: f64) -> f64 {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return f64::from_bits(next),
                Err(actual) => current = actual,
            }
        }
    }
}
