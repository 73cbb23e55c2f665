//! Operator configuration.

use serde::{Deserialize, Serialize};
use uspread_core::error::Result;
use uspread_core::partition::PartitionParams;

use crate::validation::{validate_chunk_size, validate_cluster_size, validate_window_ratio};

/// Tuning knobs of [`UniformSpread`](crate::UniformSpread).
///
/// * `max_cluster_size` and `max_window_ratio` bound the memory used per cluster.
/// * `workers` clusters are processed in parallel; `0` uses one thread per core.
///   Small values (2 to 4) usually give the best parallel efficiency.
/// * `max_cluster_size` should be large enough for each task to do meaningful work,
///   otherwise writing many small sub-grids back to the lattice dominates.
/// * `max_window_ratio` should follow the point distribution; `inf` leaves only the
///   point cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Maximum number of points per cluster.
    pub max_cluster_size: usize,
    /// Maximum cluster extent per axis, in multiples of the kernel width.
    pub max_window_ratio: f64,
    /// Number of worker threads.
    pub workers: usize,
    /// Warn when inputs are cast to the operator's precision.
    pub enable_warnings: bool,
    /// Lattice chunk length per axis used when chunked spreading picks the lattice layout.
    pub lattice_chunk_size: usize,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: 10_000,
            max_window_ratio: 100.0,
            workers: 2,
            enable_warnings: true,
            lattice_chunk_size: 64,
        }
    }
}

impl SpreadConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of points per cluster.
    pub fn with_max_cluster_size(mut self, size: usize) -> Self {
        self.max_cluster_size = size;
        self
    }

    /// Set the maximum cluster window ratio.
    pub fn with_max_window_ratio(mut self, ratio: f64) -> Self {
        self.max_window_ratio = ratio;
        self
    }

    /// Set the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Disable precision-cast warnings.
    pub fn without_warnings(mut self) -> Self {
        self.enable_warnings = false;
        self
    }

    /// Set the automatic lattice chunk length.
    pub fn with_lattice_chunk_size(mut self, size: usize) -> Self {
        self.lattice_chunk_size = size;
        self
    }

    /// Check all parameter ranges.
    pub fn validate(&self) -> Result<()> {
        validate_cluster_size(self.max_cluster_size)?;
        validate_window_ratio(self.max_window_ratio)?;
        validate_chunk_size(self.lattice_chunk_size)?;
        Ok(())
    }

    /// Partitioner parameters derived from this config.
    pub fn partition_params(&self) -> PartitionParams {
        PartitionParams {
            max_cluster_size: self.max_cluster_size,
            max_window_ratio: self.max_window_ratio,
        }
    }
}
