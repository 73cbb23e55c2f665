//! Spatial types for sample-point geometry.
//!
//! All types are based on nalgebra for efficient vector operations.

pub mod bbox;

pub use bbox::BoundingBox;

// Common type aliases for 1D, 2D and 3D
pub type BoundingBox1 = BoundingBox<1>;
pub type BoundingBox2 = BoundingBox<2>;
pub type BoundingBox3 = BoundingBox<3>;
