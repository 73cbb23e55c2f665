//! Chunked spreading for inputs stored as block grids.

pub mod array;
pub mod blockwise;
pub mod operator;

pub use array::{regular_chunks, ChunkedArray};
pub use blockwise::scatter_reduce;
pub use operator::ChunkedUniformSpread;
