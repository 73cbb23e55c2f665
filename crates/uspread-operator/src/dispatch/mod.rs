//! Cluster task execution.
//!
//! A [`SpreadContext`] turns one cluster into a local spread or interpolate task:
//! it evaluates the cluster's kernel weights on its lattice window, runs
//! [`LocalKernelCompute`] and moves window data to and from the global lattice.
//! [`ThreadedDispatcher`] runs these tasks on a worker pool and assembles the results.

pub mod threaded;

pub use threaded::ThreadedDispatcher;

use std::ops::Range;

use ndarray::{ArrayViewD, ArrayViewMutD, IxDyn, Slice};
use uspread_core::compute::{KernelWeights, LocalKernelCompute};
use uspread_core::error::Result;
use uspread_core::kernel::KernelRef;
use uspread_core::lattice::LatticeSpec;
use uspread_core::partition::Cluster;
use uspread_core::Real;

use crate::validation::shape_error;

/// Sample set, lattice and kernels shared by every cluster task.
#[derive(Debug, Clone, Copy)]
pub struct SpreadContext<'a, T, const D: usize> {
    pub points: &'a [[T; D]],
    pub lattice: &'a LatticeSpec<D>,
    pub kernels: &'a [KernelRef; D],
}

impl<'a, T: Real, const D: usize> SpreadContext<'a, T, D> {
    pub fn new(points: &'a [[T; D]], lattice: &'a LatticeSpec<D>, kernels: &'a [KernelRef; D]) -> Self {
        Self {
            points,
            lattice,
            kernels,
        }
    }

    fn weights(&self, cluster: &Cluster<D>) -> KernelWeights<T, D> {
        KernelWeights::build(self.points, &cluster.x_idx, self.lattice, &cluster.roi(), self.kernels)
    }

    /// Spread the cluster's share of `w` (`(batch, M)`) into a fresh `(batch, S_1, ..., S_D)` window.
    pub fn spread_cluster(&self, cluster: &Cluster<D>, w: &[T], batch: usize) -> Vec<T> {
        let m = self.points.len();
        let mut wq = Vec::with_capacity(batch * cluster.len());
        for row in w.chunks_exact(m).take(batch) {
            wq.extend(cluster.x_idx.iter().map(|&i| row[i]));
        }

        let compute = LocalKernelCompute::new(cluster.extent);
        let mut window = vec![T::zero(); batch * compute.window_size()];
        compute.spread(&self.weights(cluster), &wq, &mut window);
        window
    }

    /// Interpolate `v` (`(batch, N_1, ..., N_D)`) at the cluster's points, giving `(batch, Mq)`.
    pub fn interpolate_cluster(&self, cluster: &Cluster<D>, v: &[T], batch: usize) -> Result<Vec<T>> {
        let compute = LocalKernelCompute::new(cluster.extent);
        let window = self.gather_window(cluster, v, batch)?;
        let mut out = vec![T::zero(); batch * cluster.len()];
        compute.interpolate(&self.weights(cluster), &window, &mut out);
        Ok(out)
    }

    /// Copy the cluster's window out of the global `(batch, N_1, ..., N_D)` array.
    pub fn gather_window(&self, cluster: &Cluster<D>, v: &[T], batch: usize) -> Result<Vec<T>> {
        let region = window_region(cluster, batch);
        let global = ArrayViewD::from_shape(IxDyn(&self.global_shape(batch)), v).map_err(shape_error)?;
        Ok(global
            .slice_each_axis(|ax| Slice::from(region[ax.axis.index()].clone()))
            .iter()
            .copied()
            .collect())
    }

    /// Add a `(batch, S_1, ..., S_D)` window into the global array at the cluster's anchor.
    pub fn add_window(&self, cluster: &Cluster<D>, window: &[T], out: &mut [T], batch: usize) -> Result<()> {
        let region = window_region(cluster, batch);
        let extent: Vec<usize> = region.iter().map(|r| r.len()).collect();
        let window = ArrayViewD::from_shape(IxDyn(&extent), window).map_err(shape_error)?;
        let mut global = ArrayViewMutD::from_shape(IxDyn(&self.global_shape(batch)), out).map_err(shape_error)?;
        let mut target = global.slice_each_axis_mut(|ax| Slice::from(region[ax.axis.index()].clone()));
        target += &window;
        Ok(())
    }

    /// `(batch, N_1, ..., N_D)`.
    fn global_shape(&self, batch: usize) -> Vec<usize> {
        let mut shape = Vec::with_capacity(D + 1);
        shape.push(batch);
        shape.extend(self.lattice.shape());
        shape
    }
}

/// Index ranges of a cluster's window, with the batch as leading axis.
fn window_region<const D: usize>(cluster: &Cluster<D>, batch: usize) -> Vec<Range<usize>> {
    let mut region = Vec::with_capacity(D + 1);
    region.push(0..batch);
    region.extend(
        cluster
            .anchor
            .iter()
            .zip(&cluster.extent)
            .map(|(&a, &s)| a..a + s),
    );
    region
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uspread_core::kernel::{broadcast, TriangleKernel};

    use super::*;

    fn cluster() -> Cluster<2> {
        Cluster {
            x_idx: vec![0],
            anchor: [1, 1],
            extent: [2, 2],
        }
    }

    #[test]
    fn test_gather_and_add_window() {
        let lattice = LatticeSpec::<2>::new([0.0, 0.0], [2.0, 3.0], [3, 4]).unwrap();
        let kernels = broadcast::<2>(Arc::new(TriangleKernel::default()));
        let points = [[1.5f64, 1.5]];
        let ctx = SpreadContext::new(&points, &lattice, &kernels);

        let v: Vec<f64> = (0..12).map(|i| i as f64).collect();
        assert_eq!(ctx.gather_window(&cluster(), &v, 1).unwrap(), vec![5.0, 6.0, 9.0, 10.0]);

        let mut out = vec![0.0; 12];
        ctx.add_window(&cluster(), &[1.0, 2.0, 3.0, 4.0], &mut out, 1).unwrap();
        assert_eq!(out[5], 1.0);
        assert_eq!(out[10], 4.0);
        assert_eq!(out.iter().sum::<f64>(), 10.0);

        // a second batch row lands one lattice further on
        let v2: Vec<f64> = (0..24).map(|i| i as f64).collect();
        assert_eq!(
            ctx.gather_window(&cluster(), &v2, 2).unwrap(),
            vec![5.0, 6.0, 9.0, 10.0, 17.0, 18.0, 21.0, 22.0]
        );
    }

    #[test]
    fn test_window_length_mismatch() {
        let lattice = LatticeSpec::<2>::new([0.0, 0.0], [2.0, 3.0], [3, 4]).unwrap();
        let kernels = broadcast::<2>(Arc::new(TriangleKernel::default()));
        let points = [[1.5f64, 1.5]];
        let ctx = SpreadContext::new(&points, &lattice, &kernels);

        let mut out = vec![0.0; 12];
        assert!(ctx.add_window(&cluster(), &[1.0, 2.0, 3.0], &mut out, 1).is_err());
        assert!(ctx.gather_window(&cluster(), &[0.0; 11], 1).is_err());
    }

    #[test]
    fn test_spread_cluster_picks_members() {
        let lattice = LatticeSpec::<1>::new([0.0], [4.0], [5]).unwrap();
        let kernels = broadcast::<1>(Arc::new(TriangleKernel::default()));
        let points = [[9.0f64], [2.5]];
        let ctx = SpreadContext::new(&points, &lattice, &kernels);
        let c = Cluster {
            x_idx: vec![1],
            anchor: [1],
            extent: [3],
        };
        // batch of two rows over M = 2 points
        let window = ctx.spread_cluster(&c, &[7.0, 2.0, 7.0, 4.0], 2);
        assert_eq!(window, vec![0.0, 1.0, 1.0, 0.0, 2.0, 2.0]);
    }
}
