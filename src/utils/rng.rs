// src/utils/rng.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Single process-wide random source for a simulation run.
///
/// Every stochastic component (orderflow generator, execution schedules,
/// signal agents) draws from one `SimRng` passed down explicitly, so a run
/// is fully determined by the seed. Draw order is part of the contract:
/// reordering calls changes the realized stream.
pub struct SimRng {
    seed: Option<u64>,
    inner: StdRng,
}

impl SimRng {
    /// Seeded when `seed` is `Some`, entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let inner = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { seed, inner }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Restart the stream from a fresh seed.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = Some(seed);
        self.inner = StdRng::seed_from_u64(seed);
    }

    /// Uniform float in `[low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.inner.gen_range(low..high)
    }

    /// Bernoulli trial with success probability `p`.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p)
    }

    /// Random integer in `[low, high)`.
    pub fn randint(&mut self, low: u64, high: u64) -> u64 {
        self.inner.gen_range(low..high)
    }

    /// Uniform pick from a slice, `None` when empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.inner.gen_range(0..items.len());
        Some(&items[i])
    }

    /// Uniform sign draw from {-1, +1}.
    pub fn sign(&mut self) -> f64 {
        if self.inner.gen_bool(0.5) { 1.0 } else { -1.0 }
    }

    /// Access to the raw generator for `rand_distr` samplers.
    pub fn raw(&mut self) -> &mut StdRng {
        &mut self.inner
    }
}

impl std::fmt::Debug for SimRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimRng").field("seed", &self.seed).finish()
    }
}
