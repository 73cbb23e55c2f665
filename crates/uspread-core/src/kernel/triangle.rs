//! Triangular (hat) kernel.

use serde::{Deserialize, Serialize};

use super::trait_::SeparableKernel;

/// Triangular kernel `max(0, 1 - |u| / radius)`.
///
/// With `radius` equal to the lattice step, spreading with this kernel is
/// linear interpolation's adjoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleKernel {
    radius: f64,
}

impl TriangleKernel {
    /// Create a triangular kernel with the given support radius.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// Support radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Default for TriangleKernel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SeparableKernel for TriangleKernel {
    fn evaluate(&self, offset: f64) -> f64 {
        (1.0 - offset.abs() / self.radius).max(0.0)
    }

    fn support(&self) -> f64 {
        self.radius
    }
}
