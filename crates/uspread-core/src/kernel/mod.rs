//! Separable kernels.
//!
//! This module provides the per-axis kernel trait and the built-in kernels
//! used for spreading and interpolation.

pub mod trait_;
pub mod triangle;
pub mod es;
pub mod gaussian;
pub mod closure;

pub use trait_::{broadcast, evaluate_axis, supports, validate_kernels, KernelRef, SeparableKernel};
pub use triangle::TriangleKernel;
pub use es::{kernel_width, EsKernel};
pub use gaussian::GaussianKernel;
pub use closure::FnKernel;
