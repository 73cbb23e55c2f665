//! Separable kernel trait.
//!
//! This module defines the per-axis kernel contract used by the spreading engine.

use std::fmt::Debug;
use std::sync::Arc;

use crate::element::Real;
use crate::error::{Result, SpreadError};

/// One-dimensional kernel with compact, symmetric support.
///
/// The D-dimensional kernel is the product of D axis kernels:
/// `phi(u) = phi_1(u_1) * ... * phi_D(u_D)`.
///
/// The kernel itself need not be symmetric, but it must vanish outside `[-s, s]`
/// where `s = support()`.
pub trait SeparableKernel: Send + Sync + Debug {
    /// Evaluate the kernel at `offset = z - x`.
    fn evaluate(&self, offset: f64) -> f64;

    /// Half-width `s > 0` of the kernel's support `[-s, s]`.
    fn support(&self) -> f64;
}

/// Evaluate `phi(z_k - x)` for every lattice coordinate `z_k` of one axis into `out`.
///
/// Offsets outside the declared support yield exactly zero, whatever the kernel returns there.
pub fn evaluate_axis<T: Real, K: SeparableKernel + ?Sized>(
    kernel: &K,
    lattice: &[T],
    x: T,
    out: &mut [T],
) {
    let s = kernel.support();
    for (o, &z) in out.iter_mut().zip(lattice) {
        let u = (z - x).into_f64();
        *o = if u.abs() > s {
            T::zero()
        } else {
            T::from_f64(kernel.evaluate(u))
        };
    }
}

/// Shared, thread-safe kernel handle.
pub type KernelRef = Arc<dyn SeparableKernel>;

/// Use the same kernel on every axis.
pub fn broadcast<const D: usize>(kernel: KernelRef) -> [KernelRef; D] {
    std::array::from_fn(|_| Arc::clone(&kernel))
}

/// Collect per-axis support radii.
pub fn supports<const D: usize>(kernels: &[KernelRef; D]) -> [f64; D] {
    std::array::from_fn(|d| kernels[d].support())
}

/// Validate that all supports are finite and strictly positive.
pub fn validate_kernels<const D: usize>(kernels: &[KernelRef; D]) -> Result<()> {
    for (axis, k) in kernels.iter().enumerate() {
        let support = k.support();
        if !(support.is_finite() && support > 0.0) {
            return Err(SpreadError::InvalidKernelSupport { axis, support });
        }
    }
    Ok(())
}
