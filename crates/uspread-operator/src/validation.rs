//! Validation utilities for operator configuration and call inputs.
//!
//! This module provides the range checks behind [`SpreadConfig::validate`](crate::SpreadConfig::validate)
//! and the shape checks performed on every `apply`/`adjoint` call.

use ndarray::ShapeError;
use uspread_core::error::{Result, SpreadError};
use uspread_core::partition::MIN_WINDOW_RATIO;

/// Validate the per-cluster point cap.
pub fn validate_cluster_size(max_cluster_size: usize) -> Result<()> {
    if max_cluster_size == 0 {
        return Err(SpreadError::invalid_configuration(
            "max_cluster_size must be positive",
        ));
    }
    Ok(())
}

/// Validate the cluster window ratio (`inf` disables the window cap).
pub fn validate_window_ratio(max_window_ratio: f64) -> Result<()> {
    if max_window_ratio.is_nan() || max_window_ratio < MIN_WINDOW_RATIO {
        return Err(SpreadError::invalid_configuration(format!(
            "max_window_ratio must be >= {}, got {}",
            MIN_WINDOW_RATIO, max_window_ratio
        )));
    }
    Ok(())
}

/// Validate the automatic lattice chunk length.
pub fn validate_chunk_size(lattice_chunk_size: usize) -> Result<()> {
    if lattice_chunk_size == 0 {
        return Err(SpreadError::invalid_configuration(
            "lattice_chunk_size must be positive",
        ));
    }
    Ok(())
}

/// Check that a flat buffer holds a whole number of `core` blocks and return the stack size.
///
/// `core` is the trailing shape of one item (`[M]` for point weights, `[N_1, ..., N_D]`
/// for lattice values). An empty buffer is an empty stack, except for an empty core,
/// which accepts only an empty buffer and counts it as one item.
pub fn validate_batch_len(len: usize, core: &[usize]) -> Result<usize> {
    let unit: usize = core.iter().product();
    if unit == 0 {
        if len == 0 {
            return Ok(1);
        }
    } else if len % unit == 0 {
        return Ok(len / unit);
    }
    Err(SpreadError::ShapeMismatch {
        expected: core.to_vec(),
        actual: vec![len],
    })
}

/// Map an `ndarray` layout error onto [`SpreadError::DimensionMismatch`].
pub(crate) fn shape_error(err: ShapeError) -> SpreadError {
    SpreadError::dimension_mismatch(err.to_string())
}
