//! Per-point, per-axis kernel weight tables.

use std::ops::Range;

use crate::element::Real;
use crate::kernel::{evaluate_axis, KernelRef};
use crate::lattice::LatticeSpec;

/// Dense `(Mq, D, S_max)` table of axis kernel weights for one cluster.
///
/// Row `(m, d)` holds `phi_d(z_k - x_md)` for the `extent[d]` window nodes `z_k`
/// of axis `d`; entries past `extent[d]` are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelWeights<T, const D: usize> {
    data: Vec<T>,
    n_points: usize,
    extent: [usize; D],
    s_max: usize,
}

impl<T: Real, const D: usize> KernelWeights<T, D> {
    /// Evaluate the weights of `points[x_idx]` on the window `roi` of `lattice`.
    pub fn build(
        points: &[[T; D]],
        x_idx: &[usize],
        lattice: &LatticeSpec<D>,
        roi: &[Range<usize>; D],
        kernels: &[KernelRef; D],
    ) -> Self {
        let axes: [Vec<T>; D] = lattice.sparse_mesh(Some(roi));
        let extent: [usize; D] = std::array::from_fn(|d| axes[d].len());
        let s_max = extent.iter().copied().max().unwrap_or(0);

        let mut data = vec![T::zero(); x_idx.len() * D * s_max];
        for (m, &i) in x_idx.iter().enumerate() {
            for d in 0..D {
                let offset = (m * D + d) * s_max;
                let row = &mut data[offset..offset + extent[d]];
                evaluate_axis(kernels[d].as_ref(), &axes[d], points[i][d], row);
            }
        }

        Self {
            data,
            n_points: x_idx.len(),
            extent,
            s_max,
        }
    }

    /// Build a table directly from raw `(Mq, D, S_max)` data.
    ///
    /// # Panics
    /// Panics if `data.len() != n_points * D * max(extent)`.
    pub fn from_raw(data: Vec<T>, n_points: usize, extent: [usize; D]) -> Self {
        let s_max = extent.iter().copied().max().unwrap_or(0);
        assert_eq!(
            data.len(),
            n_points * D * s_max,
            "kernel weight table must be (Mq, D, S_max)"
        );
        Self {
            data,
            n_points,
            extent,
            s_max,
        }
    }

    /// Number of points `Mq`.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Window shape `(S_1, ..., S_D)`.
    pub fn extent(&self) -> [usize; D] {
        self.extent
    }

    /// Weights of point `m` along axis `d` (length `extent[d]`).
    #[inline]
    pub fn row(&self, m: usize, d: usize) -> &[T] {
        let offset = (m * D + d) * self.s_max;
        &self.data[offset..offset + self.extent[d]]
    }
}
