// src/utils/distributions.rs

//! Thin wrappers around the `rand_distr` samplers used by the orderflow
//! model. Each wrapper holds only parameters; the shared [`SimRng`] is
//! passed in at sample time so all draws come from one stream.

use rand::distributions::{Distribution, WeightedIndex};
use rand_distr::{Geometric, LogNormal, Zipf};

use crate::error::ConfigError;
use crate::utils::rng::SimRng;

/// Log-normal draw, parameterized by the underlying normal's mu/sigma.
#[derive(Debug, Clone)]
pub struct LogNormalDist {
    inner: LogNormal<f64>,
}

impl LogNormalDist {
    pub fn new(mu: f64, sigma: f64) -> Result<Self, ConfigError> {
        let inner = LogNormal::new(mu, sigma)
            .map_err(|e| ConfigError::Distribution(format!("lognormal: {e}")))?;
        Ok(Self { inner })
    }

    pub fn sample(&self, rng: &mut SimRng) -> f64 {
        self.inner.sample(rng.raw())
    }
}

/// Zero-inclusive geometric draw: the number of failures before the first
/// success, so 0 lands exactly at the reference price.
#[derive(Debug, Clone)]
pub struct GeometricDist {
    inner: Geometric,
}

impl GeometricDist {
    pub fn new(p: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&p) || p == 0.0 {
            return Err(ConfigError::GeometricP(p));
        }
        let inner = Geometric::new(p)
            .map_err(|e| ConfigError::Distribution(format!("geometric: {e}")))?;
        Ok(Self { inner })
    }

    pub fn sample(&self, rng: &mut SimRng) -> u64 {
        self.inner.sample(rng.raw())
    }
}

/// Discrete Zipf over ranks `1..=max_value` with exponent `alpha`.
#[derive(Debug, Clone)]
pub struct DiscreteZipfDist {
    inner: Zipf<f64>,
}

impl DiscreteZipfDist {
    pub fn new(alpha: f64, max_value: u64) -> Result<Self, ConfigError> {
        if max_value == 0 {
            return Err(ConfigError::ZeroMaxDistance);
        }
        let inner = Zipf::new(max_value, alpha)
            .map_err(|e| ConfigError::Distribution(format!("zipf: {e}")))?;
        Ok(Self { inner })
    }

    pub fn sample(&self, rng: &mut SimRng) -> u64 {
        self.inner.sample(rng.raw()) as u64
    }
}

/// Weighted categorical draw over `0..weights.len()`.
#[derive(Debug, Clone)]
pub struct Categorical {
    inner: WeightedIndex<f64>,
}

impl Categorical {
    pub fn new(weights: &[f64]) -> Result<Self, ConfigError> {
        let inner = WeightedIndex::new(weights)
            .map_err(|e| ConfigError::Distribution(format!("categorical: {e}")))?;
        Ok(Self { inner })
    }

    pub fn sample(&self, rng: &mut SimRng) -> usize {
        self.inner.sample(rng.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lognormal_is_positive() {
        let dist = LogNormalDist::new(1.0, 0.5).unwrap();
        let mut rng = SimRng::from_seed(42);
        for _ in 0..1000 {
            assert!(dist.sample(&mut rng) > 0.0);
        }
    }

    #[test]
    fn geometric_includes_zero() {
        let dist = GeometricDist::new(0.8).unwrap();
        let mut rng = SimRng::from_seed(42);
        let samples: Vec<u64> = (0..500).map(|_| dist.sample(&mut rng)).collect();
        assert!(samples.contains(&0), "p=0.8 should hit zero quickly");
    }

    #[test]
    fn geometric_rejects_bad_p() {
        assert!(GeometricDist::new(0.0).is_err());
        assert!(GeometricDist::new(1.5).is_err());
        assert!(GeometricDist::new(1.0).is_ok());
    }

    #[test]
    fn zipf_stays_in_range() {
        let dist = DiscreteZipfDist::new(1.45, 200).unwrap();
        let mut rng = SimRng::from_seed(42);
        for _ in 0..2000 {
            let v = dist.sample(&mut rng);
            assert!((1..=200).contains(&v), "zipf rank out of range: {v}");
        }
    }

    #[test]
    fn zipf_favors_small_ranks() {
        let dist = DiscreteZipfDist::new(1.45, 200).unwrap();
        let mut rng = SimRng::from_seed(42);
        let n = 20_000;
        let small = (0..n)
            .filter(|_| dist.sample(&mut rng) <= 10)
            .count();
        // With alpha=1.45 the first ten ranks carry well over half the mass.
        assert!(small * 2 > n, "only {small}/{n} samples in ranks 1..=10");
    }

    #[test]
    fn categorical_respects_zero_weight() {
        let dist = Categorical::new(&[0.5, 0.0, 0.5]).unwrap();
        let mut rng = SimRng::from_seed(42);
        for _ in 0..1000 {
            assert_ne!(dist.sample(&mut rng), 1);
        }
    }
}
