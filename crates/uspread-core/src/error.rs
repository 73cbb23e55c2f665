//! Error types for spreading/interpolation operations.
//!
//! Configuration problems are reported at construction time, shape problems
//! at call time. Precision mismatches are not errors (inputs are cast).

use thiserror::Error;

/// Main error type for the spreading engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpreadError {
    /// Lattice bounds or node counts are inconsistent.
    #[error("Degenerate lattice on axis {axis}: {message}")]
    DegenerateLattice { axis: usize, message: String },

    /// Kernel support radius is not strictly positive.
    #[error("Invalid kernel support on axis {axis}: {support}")]
    InvalidKernelSupport { axis: usize, support: f64 },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Dimension mismatch.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Chunk structure along the point axis does not match the points' chunks.
    #[error("Chunk layout mismatch along point axis: expected {expected:?}, got {actual:?}")]
    ChunkLayoutMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Tensor data could not be converted.
    #[error("Tensor data error: {0}")]
    TensorData(String),
}

/// Result type for spreading operations.
pub type Result<T> = std::result::Result<T, SpreadError>;

impl SpreadError {
    /// Create a degenerate lattice error.
    pub fn degenerate_lattice(axis: usize, msg: impl Into<String>) -> Self {
        Self::DegenerateLattice {
            axis,
            message: msg.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Create a thread pool error.
    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }

    /// Create a tensor data error.
    pub fn tensor_data(msg: impl Into<String>) -> Self {
        Self::TensorData(msg.into())
    }
}
