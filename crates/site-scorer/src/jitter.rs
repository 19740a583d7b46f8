//! Bounded random variation for derived impact metrics
//!
//! CO₂ savings and renewable utilization carry a small amount of noise so
//! that sites with identical inputs do not report identical estimates. The
//! source is injected: tests use [`NoJitter`], reproducible runs use a seeded
//! [`SeededJitter`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of non-negative noise
pub trait JitterSource {
    /// Sample a value in `[0, span)`; returns 0 when `span <= 0`
    fn sample(&mut self, span: f64) -> f64;
}

/// Deterministic source that never perturbs anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&mut self, _span: f64) -> f64 {
        0.0
    }
}

/// Uniform noise from a `StdRng`
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    /// Reproducible sequence for a given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl JitterSource for SeededJitter {
    fn sample(&mut self, span: f64) -> f64 {
        if !(span.is_finite() && span > 0.0) {
            return 0.0;
        }
        self.rng.gen_range(0.0..span)
    }
}
