//! Regular lattice geometry.
//!
//! A lattice is described per axis by `(start, stop, num)`:
//!
//! ```text
//! z[n_1, ..., n_D]_d = start_d + n_d * step_d,   step_d = (stop_d - start_d) / (num_d - 1)
//! ```
//!
//! Single-node axes (`num_d == 1`) have `step_d == 0` and require `start_d == stop_d`.
//! Coordinates are produced per axis on demand; the D-dimensional mesh is only
//! materialized through [`LatticeSpec::dense_mesh`].
//!
//! A sub-lattice keeps the origin and spacing of the lattice it was cut from and
//! records its node offset, so its coordinates are bit-identical to the parent's.

use std::ops::Range;

use crate::element::Real;
use crate::error::{Result, SpreadError};

/// Regular D-dimensional grid of evaluation points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeSpec<const D: usize> {
    start: [f64; D],
    stop: [f64; D],
    num: [usize; D],
    // node k along axis d sits at origin[d] + (offset[d] + k) * spacing[d]
    origin: [f64; D],
    spacing: [f64; D],
    offset: [usize; D],
}

impl<const D: usize> LatticeSpec<D> {
    /// Create a lattice from per-axis bounds and node counts.
    ///
    /// # Errors
    /// Returns [`SpreadError::DegenerateLattice`] if `start > stop`, if a bound is not
    /// finite, if `num == 0`, or if `start == stop` with `num != 1` on any axis.
    pub fn new(start: [f64; D], stop: [f64; D], num: [usize; D]) -> Result<Self> {
        if D == 0 {
            return Err(SpreadError::dimension_mismatch("lattice rank must be at least 1"));
        }
        for d in 0..D {
            let (alpha, beta, n) = (start[d], stop[d], num[d]);
            if !alpha.is_finite() || !beta.is_finite() {
                return Err(SpreadError::degenerate_lattice(d, "bounds must be finite"));
            }
            if alpha > beta {
                return Err(SpreadError::degenerate_lattice(
                    d,
                    format!("start ({}) > stop ({})", alpha, beta),
                ));
            }
            if n == 0 {
                return Err(SpreadError::degenerate_lattice(d, "num must be at least 1"));
            }
            if alpha == beta && n != 1 {
                return Err(SpreadError::degenerate_lattice(
                    d,
                    format!("start == stop requires num == 1, got {}", n),
                ));
            }
            if alpha < beta && n == 1 {
                return Err(SpreadError::degenerate_lattice(
                    d,
                    "num == 1 requires start == stop",
                ));
            }
        }
        let spacing = std::array::from_fn(|d| {
            if num[d] == 1 {
                0.0
            } else {
                (stop[d] - start[d]) / (num[d] - 1) as f64
            }
        });
        Ok(Self {
            start,
            stop,
            num,
            origin: start,
            spacing,
            offset: [0; D],
        })
    }

    /// Create a lattice with the same `(start, stop, num)` on every axis.
    pub fn broadcast(start: f64, stop: f64, num: usize) -> Result<Self> {
        Self::new([start; D], [stop; D], [num; D])
    }

    /// Lower bound per axis.
    pub fn start(&self) -> &[f64; D] {
        &self.start
    }

    /// Upper bound per axis.
    pub fn stop(&self) -> &[f64; D] {
        &self.stop
    }

    /// Node count per axis.
    pub fn shape(&self) -> [usize; D] {
        self.num
    }

    /// Total node count.
    pub fn size(&self) -> usize {
        self.num.iter().product()
    }

    /// Node spacing along axis `d` (0 for single-node axes).
    pub fn step(&self, d: usize) -> f64 {
        if self.num[d] == 1 {
            0.0
        } else {
            self.spacing[d]
        }
    }

    /// Inverse spacing along axis `d`, mapping physical offsets to index offsets.
    ///
    /// Single-node axes map every coordinate to index 0.
    pub fn index_ratio(&self, d: usize) -> f64 {
        if self.num[d] == 1 {
            0.0
        } else {
            (self.num[d] - 1) as f64 / (self.stop[d] - self.start[d])
        }
    }

    /// Coordinate of node `k` along axis `d`.
    pub fn coordinate(&self, d: usize, k: usize) -> f64 {
        self.origin[d] + (self.offset[d] + k) as f64 * self.spacing[d]
    }

    /// Index of node 0 in the outermost lattice this one was cut from.
    pub fn offset(&self) -> &[usize; D] {
        &self.offset
    }

    /// Full 1-D coordinate vector of axis `d`.
    pub fn axis<T: Real>(&self, d: usize) -> Vec<T> {
        self.axis_roi(d, 0..self.num[d])
    }

    /// Coordinates of nodes `roi` along axis `d`.
    ///
    /// The range is clipped to the axis.
    pub fn axis_roi<T: Real>(&self, d: usize, roi: Range<usize>) -> Vec<T> {
        let alpha = T::from_f64(self.origin[d]);
        let step = T::from_f64(self.spacing[d]);
        let end = roi.end.min(self.num[d]);
        (roi.start.min(end)..end)
            .map(|k| alpha + T::from_f64((self.offset[d] + k) as f64) * step)
            .collect()
    }

    /// Sparse mesh: one coordinate vector per axis, optionally restricted to a region of interest.
    pub fn sparse_mesh<T: Real>(&self, roi: Option<&[Range<usize>; D]>) -> [Vec<T>; D] {
        std::array::from_fn(|d| match roi {
            Some(r) => self.axis_roi(d, r[d].clone()),
            None => self.axis(d),
        })
    }

    /// Dense mesh of all lattice nodes in row-major order.
    ///
    /// Memory grows as the product of all axis lengths; intended for export only.
    pub fn dense_mesh<T: Real>(&self) -> Vec<[T; D]> {
        let axes: [Vec<T>; D] = self.sparse_mesh(None);
        let total = self.size();
        let mut mesh = Vec::with_capacity(total);
        let mut idx = [0usize; D];
        for _ in 0..total {
            mesh.push(std::array::from_fn(|d| axes[d][idx[d]]));
            for d in (0..D).rev() {
                idx[d] += 1;
                if idx[d] < self.num[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        mesh
    }

    /// Lattice restricted to the index ranges `roi`.
    ///
    /// Node `k` of the result is node `roi[d].start + k` of `self`, with the same coordinate.
    ///
    /// # Errors
    /// Returns [`SpreadError::DegenerateLattice`] if a range is empty or exceeds the axis.
    pub fn sub_lattice(&self, roi: &[Range<usize>; D]) -> Result<Self> {
        let mut start = [0.0; D];
        let mut stop = [0.0; D];
        let mut num = [0usize; D];
        for d in 0..D {
            let r = &roi[d];
            if r.start >= r.end || r.end > self.num[d] {
                return Err(SpreadError::degenerate_lattice(
                    d,
                    format!("region {:?} outside axis of length {}", r, self.num[d]),
                ));
            }
            num[d] = r.end - r.start;
            start[d] = self.coordinate(d, r.start);
            stop[d] = if num[d] == 1 {
                start[d]
            } else {
                self.coordinate(d, r.end - 1)
            };
        }
        let mut sub = Self::new(start, stop, num)?;
        sub.origin = self.origin;
        sub.spacing = self.spacing;
        sub.offset = std::array::from_fn(|d| self.offset[d] + roi[d].start);
        Ok(sub)
    }

    /// Row-major strides (in elements) of a dense array with this lattice's shape.
    pub fn strides(&self) -> [usize; D] {
        row_major_strides(&self.num)
    }
}

/// Row-major strides for a shape.
pub fn row_major_strides<const D: usize>(shape: &[usize; D]) -> [usize; D] {
    let mut strides = [1usize; D];
    for d in (0..D.saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }
    strides
}
