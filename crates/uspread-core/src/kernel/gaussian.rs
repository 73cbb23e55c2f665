//! Truncated Gaussian kernel.

use serde::{Deserialize, Serialize};

use super::trait_::SeparableKernel;

/// Gaussian `exp(-u^2 / (2 sigma^2))` truncated to `[-radius, radius]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianKernel {
    sigma: f64,
    radius: f64,
}

impl GaussianKernel {
    /// Create a Gaussian kernel truncated at `radius`.
    pub fn new(sigma: f64, radius: f64) -> Self {
        Self { sigma, radius }
    }

    /// Create a Gaussian kernel truncated at `n_sigma` standard deviations.
    pub fn with_sigma_cutoff(sigma: f64, n_sigma: f64) -> Self {
        Self::new(sigma, sigma * n_sigma)
    }

    /// Standard deviation.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl SeparableKernel for GaussianKernel {
    fn evaluate(&self, offset: f64) -> f64 {
        if offset.abs() > self.radius {
            return 0.0;
        }
        let r = offset / self.sigma;
        (-0.5 * r * r).exp()
    }

    fn support(&self) -> f64 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_truncation() {
        let k = GaussianKernel::with_sigma_cutoff(0.5, 3.0);
        assert_eq!(k.support(), 1.5);
        assert_eq!(k.evaluate(0.0), 1.0);
        assert_eq!(k.evaluate(1.6), 0.0);
        assert!((k.evaluate(0.5) - (-0.5f64).exp()).abs() < 1e-15);
    }
}
