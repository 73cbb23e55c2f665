//! Uniform spreading over chunked inputs.

use std::collections::BTreeMap;
use std::ops::Range;

use ndarray::{indices, ArrayD, Dimension, IxDyn};
use uspread_core::error::{Result, SpreadError};
use uspread_core::kernel::{validate_kernels, KernelRef};
use uspread_core::lattice::LatticeSpec;
use uspread_core::Real;

use super::array::{chunk_bounds, regular_chunks, ChunkedArray};
use super::blockwise::scatter_reduce;
use crate::config::SpreadConfig;
use crate::dispatch::ThreadedDispatcher;
use crate::operator::{LinearOperator, UniformSpread};
use crate::validation::{shape_error, validate_batch_len};

/// Uniform spreading where samples and lattice are split into chunks.
///
/// Every (input block, partner chunk) pair is handled by a short-lived
/// [`UniformSpread`] restricted to one point chunk and one sub-lattice; the
/// partial blocks are then summed per destination block. Samples are
/// partitioned per chunk pair, not globally.
#[derive(Debug)]
pub struct ChunkedUniformSpread<T: Real, const D: usize> {
    points: Vec<[T; D]>,
    point_chunks: Vec<usize>,
    lattice: LatticeSpec<D>,
    lattice_chunks: [Vec<usize>; D],
    kernels: [KernelRef; D],
    config: SpreadConfig,
    dispatcher: ThreadedDispatcher,
}

impl<T: Real, const D: usize> ChunkedUniformSpread<T, D> {
    /// Build the operator.
    ///
    /// `point_chunks` lists the chunk lengths along the sample axis; the lattice is
    /// chunked into runs of `config.lattice_chunk_size` nodes per axis.
    pub fn new(
        points: Vec<[T; D]>,
        point_chunks: Vec<usize>,
        lattice: LatticeSpec<D>,
        kernels: [KernelRef; D],
        config: SpreadConfig,
    ) -> Result<Self> {
        config.validate()?;
        validate_kernels(&kernels)?;
        check_tiling(&point_chunks, points.len(), "point")?;
        let shape = lattice.shape();
        let lattice_chunks = std::array::from_fn(|d| regular_chunks(shape[d], config.lattice_chunk_size));
        let dispatcher = ThreadedDispatcher::new(config.workers)?;

        tracing::info!(
            n_points = points.len(),
            n_point_chunks = point_chunks.len(),
            lattice = ?shape,
            workers = dispatcher.workers(),
            precision = ?T::PRECISION,
            "chunked uniform spread operator ready"
        );
        Ok(Self {
            points,
            point_chunks,
            lattice,
            lattice_chunks,
            kernels,
            config,
            dispatcher,
        })
    }

    /// Build the operator from a chunked `(M, D)` coordinate array.
    ///
    /// # Errors
    /// The coordinate axis must not be chunked.
    pub fn from_chunked_points(
        points: &ChunkedArray<T>,
        lattice: LatticeSpec<D>,
        kernels: [KernelRef; D],
        config: SpreadConfig,
    ) -> Result<Self> {
        if points.ndim() != 2 || points.shape()[1] != D {
            return Err(SpreadError::ShapeMismatch {
                expected: vec![points.shape().first().copied().unwrap_or(0), D],
                actual: points.shape().to_vec(),
            });
        }
        if points.chunks()[1] != [D] {
            return Err(SpreadError::ChunkLayoutMismatch {
                expected: vec![D],
                actual: points.chunks()[1].clone(),
            });
        }
        let coords: Vec<[T; D]> = points
            .to_dense()
            .chunks_exact(D)
            .map(|c| std::array::from_fn(|d| c[d]))
            .collect();
        Self::new(coords, points.chunks()[0].clone(), lattice, kernels, config)
    }

    /// Override the lattice chunk layout.
    pub fn with_lattice_chunks(mut self, lattice_chunks: [Vec<usize>; D]) -> Result<Self> {
        let shape = self.lattice.shape();
        for d in 0..D {
            check_tiling(&lattice_chunks[d], shape[d], "lattice")?;
        }
        self.lattice_chunks = lattice_chunks;
        Ok(self)
    }

    /// Chunk lengths along the sample axis.
    pub fn point_chunks(&self) -> &[usize] {
        &self.point_chunks
    }

    /// Chunk lengths along every lattice axis.
    pub fn lattice_chunks(&self) -> &[Vec<usize>; D] {
        &self.lattice_chunks
    }

    /// Output lattice.
    pub fn lattice(&self) -> &LatticeSpec<D> {
        &self.lattice
    }

    /// Configuration the operator was built with.
    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Spread a chunked `(..., M)` array into a chunked `(..., N_1, ..., N_D)` array.
    ///
    /// Stack axes keep their chunks; lattice axes take this operator's lattice chunks.
    ///
    /// # Errors
    /// Returns [`SpreadError::ChunkLayoutMismatch`] if `w` is chunked differently
    /// from the samples along its last axis.
    pub fn apply_chunked(&self, w: &ChunkedArray<T>) -> Result<ChunkedArray<T>> {
        let k = w.ndim();
        let m = self.points.len();
        if k == 0 || w.shape()[k - 1] != m {
            return Err(SpreadError::ShapeMismatch {
                expected: vec![m],
                actual: w.shape().to_vec(),
            });
        }
        if w.chunks()[k - 1] != self.point_chunks {
            return Err(SpreadError::ChunkLayoutMismatch {
                expected: self.point_chunks.clone(),
                actual: w.chunks()[k - 1].clone(),
            });
        }

        let lattice_grid: Vec<usize> = self.lattice_chunks.iter().map(Vec::len).collect();
        let mut tasks: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
        for wb in w.block_indices() {
            for zb in indices(lattice_grid.as_slice()) {
                tasks.push((wb.clone(), zb.slice().to_vec()));
            }
        }
        let _span = tracing::debug_span!("chunked_spread", n_tasks = tasks.len()).entered();

        let mut reduced = scatter_reduce(&self.dispatcher, &tasks, |(wb, zb)| {
            let roi: [Range<usize>; D] = std::array::from_fn(|d| chunk_bounds(&self.lattice_chunks[d], zb[d]));
            let op = self.transient(chunk_bounds(&self.point_chunks, wb[k - 1]), &roi)?;
            let part = op.apply(&w.block_data(wb))?;

            let mut part_shape = w.block_shape(wb);
            part_shape.truncate(k - 1);
            part_shape.extend(roi.iter().map(|r| r.len()));
            let mut key = wb[..k - 1].to_vec();
            key.extend_from_slice(zb);
            Ok((key, ArrayD::from_shape_vec(IxDyn(&part_shape), part).map_err(shape_error)?))
        })?;

        let mut shape = w.shape()[..k - 1].to_vec();
        shape.extend(self.lattice.shape());
        let mut chunks = w.chunks()[..k - 1].to_vec();
        chunks.extend(self.lattice_chunks.iter().cloned());
        assemble(&shape, chunks, &mut reduced)
    }

    /// Interpolate a chunked `(..., N_1, ..., N_D)` array into a chunked `(..., M)` array.
    ///
    /// Lattice chunks are taken from `v`; the sample axis takes the samples' chunks.
    pub fn adjoint_chunked(&self, v: &ChunkedArray<T>) -> Result<ChunkedArray<T>> {
        let k = v.ndim();
        let lattice_shape = self.lattice.shape();
        if k < D || v.shape()[k - D..] != lattice_shape[..] {
            return Err(SpreadError::ShapeMismatch {
                expected: lattice_shape.to_vec(),
                actual: v.shape().to_vec(),
            });
        }
        let stack = k - D;

        let mut tasks: Vec<(Vec<usize>, usize)> = Vec::new();
        for vb in v.block_indices() {
            for bx in 0..self.point_chunks.len() {
                tasks.push((vb.clone(), bx));
            }
        }
        let _span = tracing::debug_span!("chunked_interpolate", n_tasks = tasks.len()).entered();

        let mut reduced = scatter_reduce(&self.dispatcher, &tasks, |(vb, bx)| {
            let roi: [Range<usize>; D] = std::array::from_fn(|d| v.block_bounds(stack + d, vb[stack + d]));
            let x_range = chunk_bounds(&self.point_chunks, *bx);
            let op = self.transient(x_range.clone(), &roi)?;
            let part = op.adjoint(&v.block_data(vb))?;

            let mut part_shape = v.block_shape(vb);
            part_shape.truncate(stack);
            part_shape.push(x_range.len());
            let mut key = vb[..stack].to_vec();
            key.push(*bx);
            Ok((key, ArrayD::from_shape_vec(IxDyn(&part_shape), part).map_err(shape_error)?))
        })?;

        let mut shape = v.shape()[..stack].to_vec();
        shape.push(self.points.len());
        let mut chunks = v.chunks()[..stack].to_vec();
        chunks.push(self.point_chunks.clone());
        assemble(&shape, chunks, &mut reduced)
    }

    /// Operator over samples `x_range` and lattice nodes `roi`, sharing this operator's pool.
    fn transient(&self, x_range: Range<usize>, roi: &[Range<usize>; D]) -> Result<UniformSpread<T, D>> {
        UniformSpread::with_dispatcher(
            self.points[x_range].to_vec(),
            self.lattice.sub_lattice(roi)?,
            self.kernels.clone(),
            self.config.clone(),
            self.dispatcher.clone(),
        )
    }
}

impl<T: Real, const D: usize> LinearOperator<T> for ChunkedUniformSpread<T, D> {
    fn dim_size(&self) -> usize {
        self.points.len()
    }

    fn codim_shape(&self) -> Vec<usize> {
        self.lattice.shape().to_vec()
    }

    fn apply(&self, arr: &[T]) -> Result<Vec<T>> {
        let m = self.points.len();
        let batch = validate_batch_len(arr.len(), &[m])?;
        if batch == 0 {
            return Ok(Vec::new());
        }
        let w = ChunkedArray::from_dense(arr, &[batch, m], vec![vec![batch], self.point_chunks.clone()])?;
        Ok(self.apply_chunked(&w)?.to_dense())
    }

    fn adjoint(&self, arr: &[T]) -> Result<Vec<T>> {
        let lattice_shape = self.lattice.shape();
        let batch = validate_batch_len(arr.len(), &lattice_shape)?;
        if batch == 0 {
            return Ok(Vec::new());
        }
        let mut shape = vec![batch];
        shape.extend(lattice_shape);
        let mut chunks = vec![vec![batch]];
        chunks.extend(self.lattice_chunks.iter().cloned());
        let v = ChunkedArray::from_dense(arr, &shape, chunks)?;
        Ok(self.adjoint_chunked(&v)?.to_dense())
    }

    /// Evaluate the kernel directly over the whole lattice.
    ///
    /// Chunking plays no part in the matrix entries, so this builds one unchunked
    /// operator on the shared pool instead of spreading unit vectors.
    fn dense_matrix(&self) -> Result<Vec<T>> {
        UniformSpread::with_dispatcher(
            self.points.clone(),
            self.lattice,
            self.kernels.clone(),
            self.config.clone(),
            self.dispatcher.clone(),
        )?
        .dense_matrix()
    }
}

fn check_tiling(chunks: &[usize], len: usize, what: &str) -> Result<()> {
    if chunks.iter().any(|&c| c == 0) || chunks.iter().sum::<usize>() != len {
        return Err(SpreadError::invalid_configuration(format!(
            "{} chunks {:?} do not tile length {}",
            what, chunks, len
        )));
    }
    Ok(())
}

/// Build the output array from reduced blocks; blocks without partials are zero.
fn assemble<T: Real>(
    shape: &[usize],
    chunks: Vec<Vec<usize>>,
    reduced: &mut BTreeMap<Vec<usize>, ArrayD<T>>,
) -> Result<ChunkedArray<T>> {
    let grid: Vec<usize> = chunks.iter().map(Vec::len).collect();
    let blocks = indices(grid.as_slice())
        .into_iter()
        .map(|b| {
            let b = b.slice();
            reduced.remove(b).unwrap_or_else(|| {
                let extent: Vec<usize> = chunks.iter().zip(b).map(|(c, &i)| c[i]).collect();
                ArrayD::zeros(IxDyn(&extent))
            })
        })
        .collect();
    ChunkedArray::from_blocks(shape, chunks, blocks)
}
