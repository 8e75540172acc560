//! Injectable randomness.
//!
//! Probabilistic branches (social rolls, model gating, weighted activity
//! choice, activity durations) all draw from a `RandomSource` so tests can
//! pin them to one branch.

use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

pub trait RandomSource: Send + Sync {
    /// A uniform float in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// A uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    fn next_below(&self, bound: usize) -> usize;

    /// A uniform integer in `[low, high]`. Returns `low` when `high <= low`.
    fn range_inclusive(&self, low: u64, high: u64) -> u64;

    /// Roll against a probability: true with likelihood `chance`.
    fn chance(&self, chance: f64) -> bool {
        self.next_f64() < chance
    }
}

/// `StdRng`-backed source, seedable for reproducible runs.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.rng.lock().expect("rng lock poisoned").gen::<f64>()
    }

    fn next_below(&self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.rng.lock().expect("rng lock poisoned").gen_range(0..bound)
    }

    fn range_inclusive(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        self.rng.lock().expect("rng lock poisoned").gen_range(low..=high)
    }
}

/// Always rolls the same value: `0.0` passes every roll with a non-zero
/// chance, `1.0` fails every roll.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl FixedRandom {
    pub fn always_pass() -> Self {
        Self(0.0)
    }

    pub fn always_fail() -> Self {
        Self(1.0)
    }
}

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }

    fn next_below(&self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        ((self.0.clamp(0.0, 1.0) * bound as f64) as usize).min(bound - 1)
    }

    fn range_inclusive(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        let span = (high - low) as f64;
        low + (self.0.clamp(0.0, 1.0) * span).round() as u64
    }
}
