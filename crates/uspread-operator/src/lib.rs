//! Uniform spreading and interpolation operators.
//!
//! [`UniformSpread`] spreads weights attached to scattered sample points onto a
//! regular lattice through a separable, compactly supported kernel, and
//! interpolates lattice values back to the samples with the adjoint map.
//! Work is split into spatial clusters that run on a rayon pool.
//! [`ChunkedUniformSpread`] runs the same computation over block-chunked inputs.
//!
//! ```ignore
//! use std::sync::Arc;
//! use uspread_core::{kernel::broadcast, EsKernel, LatticeSpec};
//! use uspread_operator::{LinearOperator, SpreadConfig, UniformSpread};
//!
//! let lattice = LatticeSpec::<2>::broadcast(0.0, 1.0, 64)?;
//! let kernels = broadcast(Arc::new(EsKernel::with_upsampling(6.0, 2.0)));
//! let op = UniformSpread::new(points, lattice, kernels, SpreadConfig::default())?;
//! let grid = op.apply(&weights)?;
//! ```

pub mod chunked;
pub mod config;
pub mod dispatch;
pub mod operator;
pub mod tensor;
pub mod validation;

pub use chunked::{ChunkedArray, ChunkedUniformSpread};
pub use config::SpreadConfig;
pub use dispatch::ThreadedDispatcher;
pub use operator::{LinearOperator, UniformSpread};
pub use uspread_core::{Precision, Real, Result, SpreadError};
