//! Core building blocks of the uniform spreading engine.
//!
//! - [`lattice`] - regular grid geometry (`start`, `stop`, `num` per axis)
//! - [`kernel`] - separable, compactly supported axis kernels
//! - [`spatial`] - bounding boxes of sample points
//! - [`partition`] - culling, grid bucketing and bisection of sample points into clusters
//! - [`compute`] - per-cluster spread/interpolate inner loops, specialised over the rank `D`

pub mod compute;
pub mod element;
pub mod error;
pub mod kernel;
pub mod lattice;
pub mod partition;
pub mod spatial;

pub use compute::{KernelWeights, LocalKernelCompute};
pub use element::{Precision, Real};
pub use error::{Result, SpreadError};
pub use kernel::{EsKernel, FnKernel, GaussianKernel, KernelRef, SeparableKernel, TriangleKernel};
pub use lattice::LatticeSpec;
pub use partition::{Cluster, Partition, PartitionParams, SpatialPartitioner};
pub use spatial::BoundingBox;
