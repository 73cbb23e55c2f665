//! Multi-threaded uniform spreading.

use ndarray::indices;
use uspread_core::error::Result;
use uspread_core::kernel::{evaluate_axis, supports, validate_kernels, KernelRef};
use uspread_core::lattice::LatticeSpec;
use uspread_core::partition::{Partition, SpatialPartitioner};
use uspread_core::{Precision, Real};

use super::LinearOperator;
use crate::config::SpreadConfig;
use crate::dispatch::{SpreadContext, ThreadedDispatcher};
use crate::validation::validate_batch_len;

/// Dense exports above this many bytes are reported.
const DENSE_WARN_BYTES: usize = 1 << 30;

/// Uniform spreading operator `A: R^M -> R^(N_1 x ... x N_D)`.
///
/// ```text
/// (A w)[n] = sum_m w[m] * phi(z[n] - x[m]),   z[n] = start + n * step
/// ```
///
/// `phi` is the product of the per-axis kernels. Samples are partitioned once at
/// construction; [`apply`](LinearOperator::apply) spreads and
/// [`adjoint`](LinearOperator::adjoint) interpolates cluster by cluster on the
/// operator's worker pool. Samples whose support misses the lattice are culled:
/// they contribute nothing to `apply` and read zero from `adjoint`.
///
/// The computation precision is `T`, the element type of the sample points.
#[derive(Debug)]
pub struct UniformSpread<T: Real, const D: usize> {
    points: Vec<[T; D]>,
    lattice: LatticeSpec<D>,
    kernels: [KernelRef; D],
    config: SpreadConfig,
    partition: Partition<D>,
    dispatcher: ThreadedDispatcher,
}

impl<T: Real, const D: usize> UniformSpread<T, D> {
    /// Build the operator and partition the samples.
    ///
    /// # Arguments
    /// * `points` - `M` sample coordinates
    /// * `lattice` - output lattice
    /// * `kernels` - one axis kernel per dimension
    /// * `config` - partitioning and threading parameters
    ///
    /// # Errors
    /// Fails on invalid parameters, non-positive kernel supports, or if the worker
    /// pool cannot be created.
    pub fn new(
        points: Vec<[T; D]>,
        lattice: LatticeSpec<D>,
        kernels: [KernelRef; D],
        config: SpreadConfig,
    ) -> Result<Self> {
        config.validate()?;
        validate_kernels(&kernels)?;
        let dispatcher = ThreadedDispatcher::new(config.workers)?;
        let op = Self::with_dispatcher(points, lattice, kernels, config, dispatcher)?;
        tracing::info!(
            n_points = op.points.len(),
            n_active = op.partition.n_active(),
            n_clusters = op.partition.len(),
            lattice = ?op.lattice.shape(),
            workers = op.dispatcher.workers(),
            precision = ?T::PRECISION,
            "uniform spread operator ready"
        );
        Ok(op)
    }

    /// Build an operator that runs on an existing dispatcher's pool.
    pub(crate) fn with_dispatcher(
        points: Vec<[T; D]>,
        lattice: LatticeSpec<D>,
        kernels: [KernelRef; D],
        config: SpreadConfig,
        dispatcher: ThreadedDispatcher,
    ) -> Result<Self> {
        let partitioner = SpatialPartitioner::new(config.partition_params(), supports(&kernels))?;
        let partition = partitioner.partition(&points, &lattice);
        Ok(Self {
            points,
            lattice,
            kernels,
            config,
            partition,
            dispatcher,
        })
    }

    /// Sample coordinates.
    pub fn points(&self) -> &[[T; D]] {
        &self.points
    }

    /// Output lattice.
    pub fn lattice(&self) -> &LatticeSpec<D> {
        &self.lattice
    }

    /// Axis kernels.
    pub fn kernels(&self) -> &[KernelRef; D] {
        &self.kernels
    }

    /// Configuration the operator was built with.
    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Cluster layout of the samples.
    pub fn partition(&self) -> &Partition<D> {
        &self.partition
    }

    /// Computation precision.
    pub fn precision(&self) -> Precision {
        T::PRECISION
    }

    pub(crate) fn dispatcher(&self) -> &ThreadedDispatcher {
        &self.dispatcher
    }

    fn context(&self) -> SpreadContext<'_, T, D> {
        SpreadContext::new(&self.points, &self.lattice, &self.kernels)
    }
}

impl<T: Real, const D: usize> LinearOperator<T> for UniformSpread<T, D> {
    fn dim_size(&self) -> usize {
        self.points.len()
    }

    fn codim_shape(&self) -> Vec<usize> {
        self.lattice.shape().to_vec()
    }

    fn codim_size(&self) -> usize {
        self.lattice.size()
    }

    fn apply(&self, arr: &[T]) -> Result<Vec<T>> {
        let batch = validate_batch_len(arr.len(), &[self.points.len()])?;
        let _span = tracing::debug_span!("spread", batch, n_clusters = self.partition.len()).entered();
        if batch == 0 || self.partition.is_empty() {
            return Ok(vec![T::zero(); batch * self.lattice.size()]);
        }
        self.dispatcher
            .spread(&self.context(), self.partition.clusters(), arr, batch)
    }

    fn adjoint(&self, arr: &[T]) -> Result<Vec<T>> {
        let batch = validate_batch_len(arr.len(), &self.lattice.shape())?;
        let _span =
            tracing::debug_span!("interpolate", batch, n_clusters = self.partition.len()).entered();
        if batch == 0 || self.partition.is_empty() {
            return Ok(vec![T::zero(); batch * self.points.len()]);
        }
        self.dispatcher
            .interpolate(&self.context(), self.partition.clusters(), arr, batch)
    }

    /// Evaluate `phi(z[n] - x[m])` for every node and sample.
    fn dense_matrix(&self) -> Result<Vec<T>> {
        let m = self.points.len();
        let n = self.lattice.size();
        let bytes = n * m * T::PRECISION.size_of();
        if self.config.enable_warnings && bytes > DENSE_WARN_BYTES {
            tracing::warn!(rows = n, cols = m, bytes, "materializing a large dense spreading matrix");
        }

        // tables[d] is (N_d, M): phi_d(z_k - x_md)
        let shape = self.lattice.shape();
        let tables: Vec<Vec<T>> = (0..D)
            .map(|d| {
                let axis = self.lattice.axis::<T>(d);
                let mut table = vec![T::zero(); shape[d] * m];
                let mut column = vec![T::zero(); shape[d]];
                for (j, x) in self.points.iter().enumerate() {
                    evaluate_axis(self.kernels[d].as_ref(), &axis, x[d], &mut column);
                    for (k, &value) in column.iter().enumerate() {
                        table[k * m + j] = value;
                    }
                }
                table
            })
            .collect();

        let mut mat = vec![T::one(); n * m];
        for (row, idx) in mat.chunks_exact_mut(m.max(1)).zip(indices(&shape[..])) {
            for (d, table) in tables.iter().enumerate() {
                let src = &table[idx[d] * m..(idx[d] + 1) * m];
                for (r, &k) in row.iter_mut().zip(src) {
                    *r = *r * k;
                }
            }
        }
        Ok(mat)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uspread_core::kernel::{broadcast, TriangleKernel};

    use super::*;

    fn triangle_1d(points: Vec<[f64; 1]>) -> UniformSpread<f64, 1> {
        let lattice = LatticeSpec::new([0.0], [4.0], [5]).unwrap();
        UniformSpread::new(
            points,
            lattice,
            broadcast(Arc::new(TriangleKernel::new(1.0))),
            SpreadConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_apply_triangle() {
        let op = triangle_1d(vec![[0.5], [2.5]]);
        assert_eq!(op.dim_size(), 2);
        assert_eq!(op.codim_shape(), vec![5]);
        let out = op.apply(&[1.0, 1.0]).unwrap();
        assert_eq!(out, vec![0.5, 0.5, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_adjoint_triangle() {
        let op = triangle_1d(vec![[0.5], [2.5]]);
        let out = op.adjoint(&[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(out, vec![0.5, 2.5]);
    }

    #[test]
    fn test_culled_only() {
        let op = triangle_1d(vec![[-5.0], [10.0]]);
        assert!(op.partition().is_empty());
        assert_eq!(op.apply(&[1.0, 2.0, 3.0, 4.0]).unwrap(), vec![0.0; 10]);
        assert_eq!(op.adjoint(&[1.0; 5]).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_shape_errors() {
        let op = triangle_1d(vec![[0.5], [2.5]]);
        assert!(op.apply(&[1.0, 2.0, 3.0]).is_err());
        assert!(op.adjoint(&[1.0; 4]).is_err());
    }

    #[test]
    fn test_empty_stack() {
        let op = triangle_1d(vec![[0.5], [2.5]]);
        assert!(op.apply(&[]).unwrap().is_empty());
        assert!(op.adjoint(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_dense_matrix_matches_apply() {
        let op = triangle_1d(vec![[0.5], [2.5], [3.75]]);
        let mat = op.dense_matrix().unwrap();
        assert_eq!(mat.len(), 5 * 3);
        let w = [1.0, -2.0, 0.5];
        let expected = op.apply(&w).unwrap();
        for i in 0..5 {
            let row: f64 = (0..3).map(|j| mat[i * 3 + j] * w[j]).sum();
            assert!((row - expected[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_config() {
        let lattice = LatticeSpec::new([0.0], [1.0], [2]).unwrap();
        let result = UniformSpread::<f64, 1>::new(
            vec![[0.0]],
            lattice,
            broadcast(Arc::new(TriangleKernel::new(1.0))),
            SpreadConfig::default().with_max_window_ratio(1.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_precision() {
        let lattice = LatticeSpec::new([0.0, 0.0], [1.0, 1.0], [2, 2]).unwrap();
        let op = UniformSpread::<f32, 2>::new(
            vec![[0.5, 0.5]],
            lattice,
            broadcast(Arc::new(TriangleKernel::new(1.0))),
            SpreadConfig::default(),
        )
        .unwrap();
        assert_eq!(op.precision(), Precision::Single);
        assert_eq!(op.apply(&[1.0]).unwrap(), vec![0.25; 4]);
    }
}
