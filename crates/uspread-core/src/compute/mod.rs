//! Local spread/interpolate kernels for a single cluster window.
//!
//! Given a cluster's kernel weight table, these routines compute
//!
//! ```text
//! spread:      out[ns, idx] += prod_d k[m, d, idx_d] * w[ns, m]
//! interpolate: out[ns, m]   += prod_d k[m, d, idx_d] * v[ns, idx]
//! ```
//!
//! over the window, where `ns` runs over the flattened stack dimensions. Only the
//! non-zero sub-box of every point's weights is traversed.

pub mod bounds;
pub mod visit;
pub mod weights;

pub use bounds::find_bounds;
pub use visit::visit_support;
pub use weights::KernelWeights;

use crate::element::Real;
use crate::lattice::row_major_strides;

/// Spread/interpolate routine bound to one window shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalKernelCompute<const D: usize> {
    extent: [usize; D],
    strides: [usize; D],
    window: usize,
}

impl<const D: usize> LocalKernelCompute<D> {
    /// Create a routine for windows of shape `extent`.
    pub fn new(extent: [usize; D]) -> Self {
        Self {
            extent,
            strides: row_major_strides(&extent),
            window: extent.iter().product(),
        }
    }

    /// Window shape.
    pub fn extent(&self) -> [usize; D] {
        self.extent
    }

    /// Number of nodes in the window.
    pub fn window_size(&self) -> usize {
        self.window
    }

    /// Visit `(m, flat, weight)` for every point and every node of its non-zero support.
    #[inline(always)]
    fn for_each_weight<T, F>(&self, weights: &KernelWeights<T, D>, mut f: F)
    where
        T: Real,
        F: FnMut(usize, usize, T),
    {
        debug_assert_eq!(weights.extent(), self.extent);
        let mut lb = [0usize; D];
        let mut ub = [0usize; D];
        'points: for m in 0..weights.n_points() {
            let rows: [&[T]; D] = std::array::from_fn(|d| weights.row(m, d));
            for d in 0..D {
                let (a, b) = find_bounds(rows[d]);
                if a >= b {
                    continue 'points;
                }
                lb[d] = a;
                ub[d] = b;
            }
            visit_support(&rows, &lb, &ub, &self.strides, |flat, k| f(m, flat, k));
        }
    }

    /// Spread point weights onto the window.
    ///
    /// * `w` - `(batch, Mq)` point weights
    /// * `out` - `(batch, S_1, ..., S_D)` window buffer, accumulated into
    pub fn spread<T: Real>(&self, weights: &KernelWeights<T, D>, w: &[T], out: &mut [T]) {
        let mq = weights.n_points();
        if mq == 0 {
            return;
        }
        let batch = w.len() / mq;
        debug_assert_eq!(w.len(), batch * mq);
        debug_assert_eq!(out.len(), batch * self.window);
        let window = self.window;
        self.for_each_weight(weights, |m, flat, k| {
            for ns in 0..batch {
                out[ns * window + flat] += k * w[ns * mq + m];
            }
        });
    }

    /// Interpolate window values at the cluster's points.
    ///
    /// * `v` - `(batch, S_1, ..., S_D)` window values
    /// * `out` - `(batch, Mq)` point values, accumulated into
    pub fn interpolate<T: Real>(&self, weights: &KernelWeights<T, D>, v: &[T], out: &mut [T]) {
        let mq = weights.n_points();
        if mq == 0 || self.window == 0 {
            return;
        }
        let batch = v.len() / self.window;
        debug_assert_eq!(v.len(), batch * self.window);
        debug_assert_eq!(out.len(), batch * mq);
        let window = self.window;
        self.for_each_weight(weights, |m, flat, k| {
            for ns in 0..batch {
                out[ns * mq + m] += k * v[ns * window + flat];
            }
        });
    }
}
