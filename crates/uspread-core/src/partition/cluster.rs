//! Cluster metadata produced by the partitioner.

use std::ops::Range;

/// Group of sample points spread onto one shared sub-lattice window.
///
/// Every member's kernel support maps into `[anchor, anchor + extent)` on each axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster<const D: usize> {
    /// Indices into the operator's sample set.
    pub x_idx: Vec<usize>,
    /// Lower-left node of the window on the global lattice.
    pub anchor: [usize; D],
    /// Window size per axis.
    pub extent: [usize; D],
}

impl<const D: usize> Cluster<D> {
    /// Number of member points.
    pub fn len(&self) -> usize {
        self.x_idx.len()
    }

    /// Whether the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.x_idx.is_empty()
    }

    /// Window as index ranges on the global lattice.
    pub fn roi(&self) -> [Range<usize>; D] {
        std::array::from_fn(|d| self.anchor[d]..self.anchor[d] + self.extent[d])
    }

    /// Number of lattice nodes covered by the window.
    pub fn window_size(&self) -> usize {
        self.extent.iter().product()
    }
}

/// Result of partitioning a sample set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition<const D: usize> {
    clusters: Vec<Cluster<D>>,
    n_points: usize,
    n_active: usize,
}

impl<const D: usize> Partition<D> {
    /// Assemble a partition. `n_points` counts all samples, culled ones included.
    pub fn new(clusters: Vec<Cluster<D>>, n_points: usize) -> Self {
        let n_active = clusters.iter().map(Cluster::len).sum();
        Self {
            clusters,
            n_points,
            n_active,
        }
    }

    /// Clusters in dispatch order.
    pub fn clusters(&self) -> &[Cluster<D>] {
        &self.clusters
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether no sample contributes to the lattice.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of samples whose support reaches the lattice.
    pub fn n_active(&self) -> usize {
        self.n_active
    }

    /// Number of samples excluded because their support misses the lattice.
    pub fn n_culled(&self) -> usize {
        self.n_points - self.n_active
    }

    /// Size of the largest cluster.
    pub fn max_cluster_len(&self) -> usize {
        self.clusters.iter().map(Cluster::len).max().unwrap_or(0)
    }

    /// Sorted indices of all active samples.
    pub fn active_indices(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = self
            .clusters
            .iter()
            .flat_map(|c| c.x_idx.iter().copied())
            .collect();
        idx.sort_unstable();
        idx
    }
}
