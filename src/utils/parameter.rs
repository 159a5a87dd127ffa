//! Randomized grain parameters.

use rand::{rngs::SmallRng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};

use crate::Error;

// -------------------------------------------------------------------------------------------------

/// A source of randomized parameter values, e.g. grain durations or positions.
pub trait RandomParameter {
    /// Draw the next value.
    fn sample(&mut self) -> f64;

    /// Draw the next value and clamp it into the given range.
    fn sample_clamped(&mut self, min: f64, max: f64) -> f64 {
        self.sample().clamp(min, max)
    }

    /// Draw the next value and round it to a sample count, which is at least `min`.
    fn sample_count(&mut self, min: usize) -> usize {
        let value = self.sample().round();
        if value.is_finite() && value > min as f64 {
            value as usize
        } else {
            min
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Normally distributed parameter values around a mean.
#[derive(Debug, Clone)]
pub struct GaussianParameter {
    rng: SmallRng,
    distribution: Normal<f64>,
}

impl GaussianParameter {
    /// Create a new parameter with the given mean and standard deviation, seeded from the OS.
    pub fn new(mean: f64, deviation: f64) -> Result<Self, Error> {
        Self::with_rng(mean, deviation, SmallRng::from_os_rng())
    }

    /// Create a new parameter which generates reproducible values from the given seed.
    pub fn with_seed(mean: f64, deviation: f64, seed: u64) -> Result<Self, Error> {
        Self::with_rng(mean, deviation, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(mean: f64, deviation: f64, rng: SmallRng) -> Result<Self, Error> {
        if !mean.is_finite() {
            return Err(Error::ParameterError(format!(
                "Gaussian mean must be finite, but is {mean}"
            )));
        }
        let distribution = Normal::new(mean, deviation)
            .map_err(|err| Error::ParameterError(format!("Gaussian deviation: {err}")))?;
        Ok(Self { rng, distribution })
    }

    pub fn mean(&self) -> f64 {
        self.distribution.mean()
    }

    pub fn deviation(&self) -> f64 {
        self.distribution.std_dev()
    }
}

impl RandomParameter for GaussianParameter {
    fn sample(&mut self) -> f64 {
        self.distribution.sample(&mut self.rng)
    }
}

// -------------------------------------------------------------------------------------------------

/// Uniformly distributed parameter values in an inclusive range.
#[derive(Debug, Clone)]
pub struct UniformParameter {
    rng: SmallRng,
    distribution: Uniform<f64>,
}

impl UniformParameter {
    /// Create a new parameter in range `[low, high]`, seeded from the OS.
    pub fn new(low: f64, high: f64) -> Result<Self, Error> {
        Self::with_rng(low, high, SmallRng::from_os_rng())
    }

    /// Create a new parameter which generates reproducible values from the given seed.
    pub fn with_seed(low: f64, high: f64, seed: u64) -> Result<Self, Error> {
        Self::with_rng(low, high, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(low: f64, high: f64, rng: SmallRng) -> Result<Self, Error> {
        let distribution = Uniform::new_inclusive(low, high).map_err(|err| {
            Error::ParameterError(format!("Uniform range [{low}, {high}]: {err}"))
        })?;
        Ok(Self { rng, distribution })
    }
}

impl RandomParameter for UniformParameter {
    fn sample(&mut self) -> f64 {
        self.distribution.sample(&mut self.rng)
    }
}

// -------------------------------------------------------------------------------------------------
