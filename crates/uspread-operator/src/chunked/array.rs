//! In-memory chunked arrays.

use std::borrow::Cow;
use std::ops::Range;

use ndarray::{indices, ArrayD, ArrayViewD, Dimension, IxDyn, Slice};
use uspread_core::error::{Result, SpreadError};
use uspread_core::Real;

use crate::validation::shape_error;

/// Split `len` into chunks of at most `chunk` elements.
pub fn regular_chunks(len: usize, chunk: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let chunk = chunk.max(1);
    let mut sizes = vec![chunk; len / chunk];
    if len % chunk != 0 {
        sizes.push(len % chunk);
    }
    sizes
}

/// Dense N-d array stored as a grid of blocks.
///
/// `chunks[a]` lists the block lengths along axis `a`; they sum to `shape[a]`.
/// Blocks are stored in row-major order of their block-grid coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedArray<T> {
    shape: Vec<usize>,
    chunks: Vec<Vec<usize>>,
    blocks: Vec<ArrayD<T>>,
}

impl<T: Real> ChunkedArray<T> {
    /// Split a dense row-major array into blocks.
    pub fn from_dense(data: &[T], shape: &[usize], chunks: Vec<Vec<usize>>) -> Result<Self> {
        check_layout(shape, &chunks)?;
        if data.len() != shape.iter().product::<usize>() {
            return Err(SpreadError::ShapeMismatch {
                expected: shape.to_vec(),
                actual: vec![data.len()],
            });
        }
        let dense = ArrayViewD::from_shape(IxDyn(shape), data).map_err(shape_error)?;

        let grid: Vec<usize> = chunks.iter().map(Vec::len).collect();
        let blocks = indices(grid.as_slice())
            .into_iter()
            .map(|b| {
                let region = block_region(&chunks, b.slice());
                dense
                    .slice_each_axis(|ax| Slice::from(region[ax.axis.index()].clone()))
                    .as_standard_layout()
                    .into_owned()
            })
            .collect();
        Ok(Self {
            shape: shape.to_vec(),
            chunks,
            blocks,
        })
    }

    /// Split a dense array into blocks of at most `chunk[a]` elements along axis `a`.
    pub fn from_dense_regular(data: &[T], shape: &[usize], chunk: &[usize]) -> Result<Self> {
        if chunk.len() != shape.len() {
            return Err(SpreadError::dimension_mismatch(format!(
                "chunk rank {} does not match array rank {}",
                chunk.len(),
                shape.len()
            )));
        }
        let chunks = shape
            .iter()
            .zip(chunk)
            .map(|(&len, &c)| regular_chunks(len, c))
            .collect();
        Self::from_dense(data, shape, chunks)
    }

    /// Assemble an array from blocks in block-grid order.
    pub fn from_blocks(shape: &[usize], chunks: Vec<Vec<usize>>, blocks: Vec<ArrayD<T>>) -> Result<Self> {
        check_layout(shape, &chunks)?;
        let grid: Vec<usize> = chunks.iter().map(Vec::len).collect();
        let n_blocks: usize = grid.iter().product();
        if blocks.len() != n_blocks {
            return Err(SpreadError::ShapeMismatch {
                expected: grid,
                actual: vec![blocks.len()],
            });
        }
        for (b, block) in indices(grid.as_slice()).into_iter().zip(&blocks) {
            let extent: Vec<usize> = block_region(&chunks, b.slice()).iter().map(|r| r.len()).collect();
            if block.shape() != extent.as_slice() {
                return Err(SpreadError::ShapeMismatch {
                    expected: extent,
                    actual: block.shape().to_vec(),
                });
            }
        }
        Ok(Self {
            shape: shape.to_vec(),
            chunks,
            blocks,
        })
    }

    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Block lengths per axis.
    pub fn chunks(&self) -> &[Vec<usize>] {
        &self.chunks
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of blocks per axis.
    pub fn block_grid(&self) -> Vec<usize> {
        self.chunks.iter().map(Vec::len).collect()
    }

    /// Total number of blocks.
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Flat position of block `b` in block-grid order.
    pub fn block_offset(&self, b: &[usize]) -> usize {
        self.chunks
            .iter()
            .zip(b)
            .fold(0, |offset, (c, &i)| offset * c.len() + i)
    }

    /// Block `b`.
    pub fn block(&self, b: &[usize]) -> &ArrayD<T> {
        &self.blocks[self.block_offset(b)]
    }

    /// Row-major data of block `b`; borrowed when the block is already row-major.
    pub fn block_data(&self, b: &[usize]) -> Cow<'_, [T]> {
        let block = self.block(b);
        match block.as_slice() {
            Some(data) => Cow::Borrowed(data),
            None => Cow::Owned(block.iter().copied().collect()),
        }
    }

    /// Shape of block `b`.
    pub fn block_shape(&self, b: &[usize]) -> Vec<usize> {
        self.block(b).shape().to_vec()
    }

    /// Element range covered by block `b` along `axis`.
    pub fn block_bounds(&self, axis: usize, b: usize) -> Range<usize> {
        chunk_bounds(&self.chunks[axis], b)
    }

    /// Block-grid coordinates of every block, in storage order.
    pub fn block_indices(&self) -> Vec<Vec<usize>> {
        indices(self.block_grid().as_slice())
            .into_iter()
            .map(|b| b.slice().to_vec())
            .collect()
    }

    /// Assemble the dense row-major array.
    pub fn to_dense(&self) -> Vec<T> {
        let mut dense = ArrayD::<T>::zeros(IxDyn(&self.shape));
        for (b, block) in indices(self.block_grid().as_slice()).into_iter().zip(&self.blocks) {
            let region = block_region(&self.chunks, b.slice());
            dense
                .slice_each_axis_mut(|ax| Slice::from(region[ax.axis.index()].clone()))
                .assign(block);
        }
        dense.iter().copied().collect()
    }
}

fn check_layout(shape: &[usize], chunks: &[Vec<usize>]) -> Result<()> {
    if chunks.len() != shape.len() {
        return Err(SpreadError::dimension_mismatch(format!(
            "chunk rank {} does not match array rank {}",
            chunks.len(),
            shape.len()
        )));
    }
    for (axis, (c, &len)) in chunks.iter().zip(shape).enumerate() {
        if c.iter().any(|&n| n == 0) || c.iter().sum::<usize>() != len {
            return Err(SpreadError::invalid_configuration(format!(
                "chunks {:?} do not tile axis {} of length {}",
                c, axis, len
            )));
        }
    }
    Ok(())
}

/// Element range of chunk `b` in a run of chunk lengths.
pub(crate) fn chunk_bounds(chunks: &[usize], b: usize) -> Range<usize> {
    let start = chunks[..b].iter().sum::<usize>();
    start..start + chunks[b]
}

/// Per-axis element ranges of block `b`.
fn block_region(chunks: &[Vec<usize>], b: &[usize]) -> Vec<Range<usize>> {
    chunks.iter().zip(b).map(|(c, &i)| chunk_bounds(c, i)).collect()
}
