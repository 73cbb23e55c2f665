//! Axis-aligned bounding boxes of sample points.
//!
//! Thin wrapper around nalgebra vectors used by the partitioner to measure
//! clusters and to derive their lattice windows.

use nalgebra::SVector;

use crate::element::Real;

/// Axis-aligned box `[lower, upper]` in D-dimensional space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox<const D: usize> {
    lower: SVector<f64, D>,
    upper: SVector<f64, D>,
}

impl<const D: usize> BoundingBox<D> {
    /// Create a box from its corners.
    pub fn new(lower: [f64; D], upper: [f64; D]) -> Self {
        Self {
            lower: SVector::from(lower),
            upper: SVector::from(upper),
        }
    }

    /// Tightest box around the points selected by `indices`.
    ///
    /// Returns `None` if `indices` is empty.
    pub fn from_points<T: Real>(points: &[[T; D]], indices: &[usize]) -> Option<Self> {
        let (&first, rest) = indices.split_first()?;
        let p = to_vector(&points[first]);
        let mut bbox = Self { lower: p, upper: p };
        for &i in rest {
            let p = to_vector(&points[i]);
            bbox.lower = bbox.lower.inf(&p);
            bbox.upper = bbox.upper.sup(&p);
        }
        Some(bbox)
    }

    /// Lower corner.
    pub fn lower(&self) -> [f64; D] {
        self.lower.into()
    }

    /// Upper corner.
    pub fn upper(&self) -> [f64; D] {
        self.upper.into()
    }

    /// Side lengths.
    pub fn extent(&self) -> [f64; D] {
        (self.upper - self.lower).into()
    }

    /// Axis along which the box is widest.
    pub fn longest_axis(&self) -> usize {
        (self.upper - self.lower).imax()
    }

    /// Grow the box by `margin[d]` on both sides of every axis.
    pub fn dilate(&self, margin: &[f64; D]) -> Self {
        let m = SVector::from(*margin);
        Self {
            lower: self.lower - m,
            upper: self.upper + m,
        }
    }

    /// Whether `point` lies inside the closed box.
    pub fn contains<T: Real>(&self, point: &[T; D]) -> bool {
        (0..D).all(|d| {
            let v = point[d].into_f64();
            self.lower[d] <= v && v <= self.upper[d]
        })
    }
}

fn to_vector<T: Real, const D: usize>(point: &[T; D]) -> SVector<f64, D> {
    SVector::from_fn(|i, _| point[i].into_f64())
}
