//! Linear operator interface and the uniform spreading operator.

pub mod uniform;

pub use uniform::UniformSpread;

use uspread_core::error::Result;
use uspread_core::Real;

/// A linear map `A: R^M -> R^(N_1 x ... x N_D)` applied to stacks of inputs.
///
/// Inputs and outputs are flat row-major buffers whose trailing block is one
/// operator input (`dim_size` values) or output (`codim_shape`); every leading
/// block is processed independently.
pub trait LinearOperator<T: Real> {
    /// Number of input values `M`.
    fn dim_size(&self) -> usize;

    /// Output shape `(N_1, ..., N_D)`.
    fn codim_shape(&self) -> Vec<usize>;

    /// Number of output values.
    fn codim_size(&self) -> usize {
        self.codim_shape().iter().product()
    }

    /// Forward map: `(..., M) -> (..., N_1, ..., N_D)`.
    fn apply(&self, arr: &[T]) -> Result<Vec<T>>;

    /// Adjoint map: `(..., N_1, ..., N_D) -> (..., M)`.
    fn adjoint(&self, arr: &[T]) -> Result<Vec<T>>;

    /// Dense `(codim_size, dim_size)` matrix in row-major order.
    ///
    /// The default implementation applies the operator to every unit vector.
    fn dense_matrix(&self) -> Result<Vec<T>> {
        let (m, n) = (self.dim_size(), self.codim_size());
        if m == 0 {
            return Ok(Vec::new());
        }
        let mut eye = vec![T::zero(); m * m];
        for i in 0..m {
            eye[i * m + i] = T::one();
        }
        let columns = self.apply(&eye)?;
        let mut mat = vec![T::zero(); n * m];
        for (j, col) in columns.chunks_exact(n).enumerate() {
            for (i, &value) in col.iter().enumerate() {
                mat[i * m + j] = value;
            }
        }
        Ok(mat)
    }
}
