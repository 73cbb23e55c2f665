//! Spatial partitioning of sample points into clusters.
//!
//! Partitioning runs in four steps:
//! 1. cull samples whose kernel support misses the lattice,
//! 2. bucket the rest into grid cells of size `2 s * max_window_ratio`,
//! 3. bisect clusters holding more than `max_cluster_size` points,
//! 4. derive each cluster's lattice window from its bounding box dilated by `s`.

pub mod bisect;
pub mod cluster;
pub mod grid;

pub use bisect::bisect_cluster;
pub use cluster::{Cluster, Partition};
pub use grid::grid_cluster;

use serde::{Deserialize, Serialize};

use crate::element::Real;
use crate::error::{Result, SpreadError};
use crate::lattice::LatticeSpec;
use crate::spatial::BoundingBox;

/// Smallest allowed window ratio.
pub const MIN_WINDOW_RATIO: f64 = 3.0;

/// Partitioning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionParams {
    /// Maximum number of points per cluster (hard cap).
    pub max_cluster_size: usize,
    /// Maximum cluster size per axis, as a multiple of the kernel width `2 s` (soft cap).
    pub max_window_ratio: f64,
}

impl Default for PartitionParams {
    fn default() -> Self {
        Self {
            max_cluster_size: 10_000,
            max_window_ratio: 100.0,
        }
    }
}

impl PartitionParams {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_cluster_size == 0 {
            return Err(SpreadError::invalid_configuration(
                "max_cluster_size must be positive",
            ));
        }
        // `>=` is false for NaN.
        if !(self.max_window_ratio >= MIN_WINDOW_RATIO) {
            return Err(SpreadError::invalid_configuration(format!(
                "max_window_ratio must be >= {}, got {}",
                MIN_WINDOW_RATIO, self.max_window_ratio
            )));
        }
        Ok(())
    }
}

/// Groups sample points into lattice-bounded clusters.
#[derive(Debug, Clone, Copy)]
pub struct SpatialPartitioner<const D: usize> {
    params: PartitionParams,
    supports: [f64; D],
}

impl<const D: usize> SpatialPartitioner<D> {
    /// Create a partitioner for kernels with the given support radii.
    pub fn new(params: PartitionParams, supports: [f64; D]) -> Result<Self> {
        params.validate()?;
        for (axis, &support) in supports.iter().enumerate() {
            if !(support.is_finite() && support > 0.0) {
                return Err(SpreadError::InvalidKernelSupport { axis, support });
            }
        }
        Ok(Self { params, supports })
    }

    /// Partitioning parameters.
    pub fn params(&self) -> &PartitionParams {
        &self.params
    }

    /// Indices of samples whose support box `[x - s, x + s]` intersects the lattice.
    ///
    /// The test is widened by a few units of `T`'s rounding so that no sample is
    /// culled while `|z - x| <= s` still holds in `T` arithmetic for some node `z`.
    pub fn active_points<T: Real>(&self, points: &[[T; D]], lattice: &LatticeSpec<D>) -> Vec<usize> {
        let eps = T::epsilon().into_f64();
        let margin: [f64; D] = std::array::from_fn(|d| {
            let scale = lattice.start()[d].abs().max(lattice.stop()[d].abs()) + self.supports[d];
            self.supports[d] + 4.0 * eps * scale
        });
        let reach = BoundingBox::new(*lattice.start(), *lattice.stop()).dilate(&margin);
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| reach.contains(*p))
            .map(|(i, _)| i)
            .collect()
    }

    /// Partition `points` with respect to `lattice`.
    pub fn partition<T: Real>(&self, points: &[[T; D]], lattice: &LatticeSpec<D>) -> Partition<D> {
        let active = self.active_points(points, lattice);
        if active.is_empty() {
            tracing::debug!(n_points = points.len(), "no sample reaches the lattice");
            return Partition::new(Vec::new(), points.len());
        }

        let cell: [f64; D] =
            std::array::from_fn(|d| 2.0 * self.supports[d] * self.params.max_window_ratio);
        let groups = grid_cluster(points, &active, &cell);
        let n_cells = groups.len();
        let groups = bisect_cluster(points, groups, self.params.max_cluster_size);

        let clusters: Vec<Cluster<D>> = groups
            .into_iter()
            .filter_map(|x_idx| {
                let bbox = BoundingBox::from_points(points, &x_idx)?;
                let (anchor, extent) = self.window(&bbox, lattice);
                Some(Cluster {
                    x_idx,
                    anchor,
                    extent,
                })
            })
            .collect();

        let partition = Partition::new(clusters, points.len());
        tracing::debug!(
            n_points = points.len(),
            n_active = partition.n_active(),
            n_culled = partition.n_culled(),
            n_cells,
            n_clusters = partition.len(),
            max_cluster_len = partition.max_cluster_len(),
            "partitioned sample points"
        );
        partition
    }

    /// Lattice window covering the kernel supports of every point in `bbox`.
    fn window(&self, bbox: &BoundingBox<D>, lattice: &LatticeSpec<D>) -> ([usize; D], [usize; D]) {
        let support_box = bbox.dilate(&self.supports);
        let (ll, ur) = (support_box.lower(), support_box.upper());
        let shape = lattice.shape();

        let mut anchor = [0usize; D];
        let mut extent = [1usize; D];
        for d in 0..D {
            let alpha = lattice.start()[d];
            let ratio = lattice.index_ratio(d);
            let last = (shape[d] - 1) as f64;
            let lo = ((ll[d] - alpha) * ratio).floor().clamp(0.0, last) as usize;
            let hi = ((ur[d] - alpha) * ratio).ceil().clamp(0.0, last) as usize;
            let hi = hi.max(lo);
            anchor[d] = lo;
            extent[d] = hi - lo + 1;
        }
        (anchor, extent)
    }
}
