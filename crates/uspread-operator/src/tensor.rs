//! Burn tensor adapters.
//!
//! Tensors are copied to host buffers, spread or interpolated there, and copied back
//! to the input's device. Inputs whose float type differs from the operator's
//! precision are cast (with a warning when warnings are enabled).

use burn::tensor::backend::Backend;
use burn::tensor::{Element, Tensor, TensorData};
use uspread_core::error::{Result, SpreadError};
use uspread_core::kernel::KernelRef;
use uspread_core::lattice::LatticeSpec;
use uspread_core::Real;

use crate::config::SpreadConfig;
use crate::operator::{LinearOperator, UniformSpread};

/// Extract tensor data as `T`, casting if needed.
fn read_tensor<T: Real + Element, B: Backend, const K: usize>(
    tensor: Tensor<B, K>,
    warn: bool,
) -> Result<Vec<T>> {
    let data = tensor.into_data();
    let data = if data.dtype != T::PRECISION.dtype() {
        if warn {
            tracing::warn!(
                found = ?data.dtype,
                expected = ?T::PRECISION,
                "input precision differs from operator precision, casting"
            );
        }
        data.convert::<T>()
    } else {
        data
    };
    data.to_vec::<T>()
        .map_err(|e| SpreadError::tensor_data(format!("{:?}", e)))
}

impl<T: Real + Element, const D: usize> UniformSpread<T, D> {
    /// Build the operator from an `[M, D]` coordinate tensor.
    pub fn from_tensor<B: Backend>(
        points: Tensor<B, 2>,
        lattice: LatticeSpec<D>,
        kernels: [KernelRef; D],
        config: SpreadConfig,
    ) -> Result<Self> {
        let [m, d] = points.dims();
        if d != D {
            return Err(SpreadError::ShapeMismatch {
                expected: vec![m, D],
                actual: vec![m, d],
            });
        }
        let flat = read_tensor::<T, B, 2>(points, config.enable_warnings)?;
        let coords = flat
            .chunks_exact(D)
            .map(|c| std::array::from_fn(|i| c[i]))
            .collect();
        Self::new(coords, lattice, kernels, config)
    }

    /// Spread a `(..., M)` tensor into a `(..., N_1, ..., N_D)` tensor.
    ///
    /// `KO` must equal `K - 1 + D`.
    pub fn apply_tensor<B: Backend, const K: usize, const KO: usize>(
        &self,
        w: Tensor<B, K>,
    ) -> Result<Tensor<B, KO>> {
        if K == 0 || KO + 1 != K + D {
            return Err(SpreadError::dimension_mismatch(format!(
                "spreading a rank-{} tensor gives rank {}, requested {}",
                K,
                (K + D).saturating_sub(1),
                KO
            )));
        }
        let dims = w.dims();
        if dims[K - 1] != self.dim_size() {
            return Err(SpreadError::ShapeMismatch {
                expected: vec![self.dim_size()],
                actual: dims.to_vec(),
            });
        }
        let device = w.device();
        let input = read_tensor::<T, B, K>(w, self.config().enable_warnings)?;
        let out = self.apply(&input)?;

        let mut shape = dims[..K - 1].to_vec();
        shape.extend(self.lattice().shape());
        Ok(Tensor::from_data(TensorData::new(out, shape), &device))
    }

    /// Interpolate a `(..., N_1, ..., N_D)` tensor into a `(..., M)` tensor.
    ///
    /// `KO` must equal `K - D + 1`.
    pub fn adjoint_tensor<B: Backend, const K: usize, const KO: usize>(
        &self,
        v: Tensor<B, K>,
    ) -> Result<Tensor<B, KO>> {
        if K < D || KO + D != K + 1 {
            return Err(SpreadError::dimension_mismatch(format!(
                "interpolating a rank-{} tensor gives rank {}, requested {}",
                K,
                (K + 1).saturating_sub(D),
                KO
            )));
        }
        let dims = v.dims();
        let lattice_shape = self.lattice().shape();
        if dims[K - D..] != lattice_shape[..] {
            return Err(SpreadError::ShapeMismatch {
                expected: lattice_shape.to_vec(),
                actual: dims.to_vec(),
            });
        }
        let device = v.device();
        let input = read_tensor::<T, B, K>(v, self.config().enable_warnings)?;
        let out = self.adjoint(&input)?;

        let mut shape = dims[..K - D].to_vec();
        shape.push(self.dim_size());
        Ok(Tensor::from_data(TensorData::new(out, shape), &device))
    }

    /// Dense `[N, M]` matrix as a tensor on `device`.
    pub fn dense_matrix_tensor<B: Backend>(&self, device: &B::Device) -> Result<Tensor<B, 2>> {
        let mat = self.dense_matrix()?;
        Ok(Tensor::from_data(
            TensorData::new(mat, [self.codim_size(), self.dim_size()]),
            device,
        ))
    }
}
