//! Exponential of semicircle (ES) kernel.
//!
//! The ES kernel is the spreading kernel of FINUFFT-style non-uniform FFTs:
//!
//! ```text
//! phi(u) = exp(beta * (sqrt(1 - (2u / w)^2) - 1)),   |u| <= w / 2
//!        = 0,                                        otherwise
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::trait_::SeparableKernel;

/// Safety factor applied to the shape parameter.
const SAFETY_FACTOR: f64 = 0.98;

/// Default upsampling factor of the fine grid.
const DEFAULT_UPSAMPLING: f64 = 2.0;

/// Exponential of semicircle kernel of width `w` (support `[-w/2, w/2]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EsKernel {
    width: f64,
    beta: f64,
}

impl EsKernel {
    /// Create an ES kernel with explicit width and shape parameter.
    pub fn new(width: f64, beta: f64) -> Self {
        Self { width, beta }
    }

    /// Create an ES kernel whose shape parameter is tuned for an upsampling factor.
    ///
    /// `beta = w * pi * 0.98 * (1 - 1 / (2 * upsampling))`
    pub fn with_upsampling(width: f64, upsampling: f64) -> Self {
        let u = if upsampling > 0.0 { upsampling } else { DEFAULT_UPSAMPLING };
        let beta = width * PI * SAFETY_FACTOR * (1.0 - 1.0 / (2.0 * u));
        Self::new(width, beta)
    }

    /// Kernel width `w`.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Shape parameter `beta`.
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl Default for EsKernel {
    fn default() -> Self {
        Self::with_upsampling(2.0, DEFAULT_UPSAMPLING)
    }
}

impl SeparableKernel for EsKernel {
    fn evaluate(&self, offset: f64) -> f64 {
        let z = 2.0 * offset / self.width;
        if z.abs() > 1.0 {
            0.0
        } else {
            (self.beta * ((1.0 - z * z).sqrt() - 1.0)).exp()
        }
    }

    fn support(&self) -> f64 {
        0.5 * self.width
    }
}

/// Kernel width (in fine-grid nodes) needed to reach relative accuracy `eps`.
///
/// Returns `None` when `eps` is not in `(0, 1)`.
pub fn kernel_width(eps: f64, upsampling: f64) -> Option<f64> {
    if !(eps > 0.0 && eps < 1.0) {
        return None;
    }
    let leps = eps.log10().abs();
    let u = if upsampling > 0.0 { upsampling } else { DEFAULT_UPSAMPLING };
    let sigma_inv = 1.0 / u;
    let denominator = PI
        * SAFETY_FACTOR
        * (1.0 - sigma_inv - sigma_inv * sigma_inv * (SAFETY_FACTOR.powi(-2) - 1.0) / 4.0).sqrt();
    Some((leps / denominator).ceil() + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_es_peak_and_support() {
        let k = EsKernel::with_upsampling(4.0, 2.0);
        assert!((k.evaluate(0.0) - 1.0).abs() < 1e-12);
        assert_eq!(k.support(), 2.0);
        assert_eq!(k.evaluate(2.5), 0.0);
        assert!(k.evaluate(1.0) > k.evaluate(1.5));
        assert!((k.evaluate(0.7) - k.evaluate(-0.7)).abs() < 1e-15);
    }

    #[test]
    fn test_es_beta() {
        let k = EsKernel::with_upsampling(2.0, 2.0);
        let expected = 2.0 * PI * SAFETY_FACTOR * 0.75;
        assert!((k.beta() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_width() {
        assert_eq!(kernel_width(0.0, 2.0), None);
        let coarse = kernel_width(1e-3, 2.0).unwrap();
        let fine = kernel_width(1e-9, 2.0).unwrap();
        assert!(fine > coarse);
        assert!(coarse >= 2.0);
    }
}
