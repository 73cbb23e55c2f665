//! Thread-pool dispatch of cluster tasks.

use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use uspread_core::error::{Result, SpreadError};
use uspread_core::partition::Cluster;
use uspread_core::Real;

use super::SpreadContext;

/// Runs cluster tasks on a dedicated rayon pool.
///
/// Spreading adds every finished window into the shared output under a lock, so at
/// most one window is written at a time. Interpolation results touch disjoint
/// samples and are scattered after all tasks complete.
#[derive(Debug, Clone)]
pub struct ThreadedDispatcher {
    pool: Arc<ThreadPool>,
}

impl ThreadedDispatcher {
    /// Build a pool with `workers` threads (`0` picks one per core).
    pub fn new(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("uspread-{idx}"))
            .build()
            .map_err(|e| SpreadError::thread_pool(e.to_string()))?;
        Ok(Self::with_pool(Arc::new(pool)))
    }

    /// Share an existing pool.
    pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &Arc<ThreadPool> {
        &self.pool
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the pool.
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Spread `w` (`(batch, M)`) onto the lattice, giving `(batch, N_1, ..., N_D)`.
    pub fn spread<T: Real, const D: usize>(
        &self,
        ctx: &SpreadContext<'_, T, D>,
        clusters: &[Cluster<D>],
        w: &[T],
        batch: usize,
    ) -> Result<Vec<T>> {
        let out = Mutex::new(vec![T::zero(); batch * ctx.lattice.size()]);
        self.pool.install(|| {
            clusters.par_iter().try_for_each(|cluster| {
                let window = ctx.spread_cluster(cluster, w, batch);
                let mut guard = out.lock().unwrap_or_else(PoisonError::into_inner);
                ctx.add_window(cluster, &window, &mut guard, batch)
            })
        })?;
        Ok(out.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    /// Interpolate `v` (`(batch, N_1, ..., N_D)`) at every sample, giving `(batch, M)`.
    ///
    /// Culled samples read zero.
    pub fn interpolate<T: Real, const D: usize>(
        &self,
        ctx: &SpreadContext<'_, T, D>,
        clusters: &[Cluster<D>],
        v: &[T],
        batch: usize,
    ) -> Result<Vec<T>> {
        let m = ctx.points.len();
        let parts: Vec<Vec<T>> = self.pool.install(|| {
            clusters
                .par_iter()
                .map(|cluster| ctx.interpolate_cluster(cluster, v, batch))
                .collect::<Result<_>>()
        })?;

        let mut out = vec![T::zero(); batch * m];
        for (cluster, part) in clusters.iter().zip(parts) {
            let mq = cluster.len();
            for ns in 0..batch {
                let src = &part[ns * mq..(ns + 1) * mq];
                for (&i, &value) in cluster.x_idx.iter().zip(src) {
                    out[ns * m + i] = value;
                }
            }
        }
        Ok(out)
    }
}
