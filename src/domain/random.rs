//! Injectable randomness for the simulation engine.
//!
//! Production code wraps a `rand` generator in [`RngSource`]; tests substitute a
//! scripted source so simulated paths are reproducible draw for draw.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Source of the draws consumed by the simulation.
pub trait RandomSource {
    /// A draw from Normal(0, 1).
    fn standard_normal(&mut self) -> f64;

    /// A draw from Uniform[0, 1).
    fn uniform(&mut self) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn standard_normal(&mut self) -> f64 {
        (**self).standard_normal()
    }

    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn standard_normal(&mut self) -> f64 {
        (**self).standard_normal()
    }

    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }
}

/// [`RandomSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Seeded when `seed` is given, entropy-backed otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }

    fn uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}
