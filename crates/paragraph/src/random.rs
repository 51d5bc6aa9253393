//! Random tensor construction.
//!
//! This module provides functions for creating tensors with random values.

use rand::Rng;
use rand::distr::StandardUniform;
use rand_distr::StandardNormal;

use crate::strides::num_elements;
use crate::tensor::Tensor;

impl Tensor {
    /// Create a tensor with uniform random values in [0, 1).
    ///
    /// # Example
    ///
    /// ```
    /// use paragraph::Tensor;
    ///
    /// let t = Tensor::random(&[2, 3]);
    /// assert_eq!(t.shape(), &[2, 3]);
    /// assert!(t.data().iter().all(|&v| (0.0..1.0).contains(&v)));
    /// ```
    pub fn random(shape: &[usize]) -> Self {
        Self::random_with_rng(shape, &mut rand::rng())
    }

    /// Create a tensor with uniform random values in [0, 1) using a specific RNG.
    ///
    /// This is useful for reproducible results with a seeded RNG.
    ///
    /// # Example
    ///
    /// ```
    /// use paragraph::Tensor;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let t1 = Tensor::random_with_rng(&[2, 3], &mut rng);
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let t2 = Tensor::random_with_rng(&[2, 3], &mut rng);
    ///
    /// assert_eq!(t1.data(), t2.data());
    /// ```
    pub fn random_with_rng<R: Rng>(shape: &[usize], rng: &mut R) -> Self {
        Self::random_scaled_with_rng(shape, 1.0, rng)
    }

    /// Create a tensor with uniform random values in [0, max).
    ///
    /// Small `max` gives the perturbations used for finite-difference checks.
    pub fn random_scaled_with_rng<R: Rng>(shape: &[usize], max: f64, rng: &mut R) -> Self {
        let data: Vec<f64> = (0..num_elements(shape))
            .map(|_| max * rng.sample::<f64, _>(StandardUniform))
            .collect();
        Self::from_vec(data, shape).expect("shape and data length should match")
    }

    /// Create a tensor with standard normal random values.
    pub fn randn(shape: &[usize]) -> Self {
        Self::randn_with_rng(shape, &mut rand::rng())
    }

    /// Create a tensor with standard normal random values using a specific RNG.
    pub fn randn_with_rng<R: Rng>(shape: &[usize], rng: &mut R) -> Self {
        let data: Vec<f64> = (0..num_elements(shape))
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect();
        Self::from_vec(data, shape).expect("shape and data length should match")
    }
}
