//! Injectable randomness
//!
//! Everything stochastic in the simulation (wander jitter, path request
//! gating, archetype rolls, loot drops) draws from a [`RandomSource`], so
//! tests can replace the seeded generator with a fixed script.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    /// Next uniform sample in `[0, 1)`
    fn next_f32(&mut self) -> f32;

    /// Uniform sample in `[min, max)`
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform index into a collection of `len` items
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let index = (self.next_f32() * len as f32) as usize;
        Some(index.min(len - 1))
    }
}

/// Seeded pseudo-random generator
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a generator from a seed
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f32(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f32>,
    index: usize,
}

impl SequenceRandom {
    /// Create a script. An empty script always yields 0.
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            index: 0,
        }
    }

    /// Always yield the same sample
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_f32(&mut self) -> f32 {
        let Some(&value) = self.values.get(self.index) else {
            return 0.0;
        };
        self.index = (self.index + 1) % self.values.len();
        value.clamp(0.0, 1.0 - f32::EPSILON)
    }
}
