use std::sync::Arc;

use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use uspread_core::kernel::{broadcast, TriangleKernel};
use uspread_core::lattice::LatticeSpec;
use uspread_operator::{LinearOperator, SpreadConfig, UniformSpread};

type B32 = NdArray<f32>;
type B64 = NdArray<f64>;

fn lattice() -> LatticeSpec<2> {
    LatticeSpec::new([0.0, 0.0], [2.0, 3.0], [3, 4]).unwrap()
}

fn points_tensor<B: burn::tensor::backend::Backend>(device: &B::Device) -> Tensor<B, 2> {
    Tensor::from_data(TensorData::new(vec![0.5f32, 0.5, 1.0, 2.5, 1.75, 0.25], [3, 2]), device)
}

#[test]
fn test_apply_tensor_f32() {
    let device = Default::default();
    let op = UniformSpread::<f32, 2>::from_tensor(
        points_tensor::<B32>(&device),
        lattice(),
        broadcast(Arc::new(TriangleKernel::new(1.0))),
        SpreadConfig::default(),
    )
    .unwrap();
    assert_eq!(op.dim_size(), 3);

    let w = Tensor::<B32, 2>::from_data(TensorData::new(vec![1.0f32, 0.0, 0.0, 0.0, 2.0, 1.0], [2, 3]), &device);
    let out: Tensor<B32, 3> = op.apply_tensor(w).unwrap();
    assert_eq!(out.dims(), [2, 3, 4]);

    let data = out.into_data();
    let values = data.as_slice::<f32>().unwrap();
    // (0.5, 0.5) splits evenly over nodes (0,0), (0,1), (1,0), (1,1).
    assert_eq!(&values[..2], &[0.25, 0.25]);
    assert_eq!(&values[4..6], &[0.25, 0.25]);
    let total: f32 = values[..12].iter().sum();
    assert!((total - 1.0).abs() < 1e-6);
}

#[test]
fn test_adjoint_tensor_matches_slices() {
    let device = Default::default();
    let op = UniformSpread::<f64, 2>::from_tensor(
        points_tensor::<B64>(&device),
        lattice(),
        broadcast(Arc::new(TriangleKernel::new(1.0))),
        SpreadConfig::default(),
    )
    .unwrap();
    let v: Vec<f64> = (0..12).map(|i| i as f64).collect();
    let expected = op.adjoint(&v).unwrap();

    let t = Tensor::<B64, 2>::from_data(TensorData::new(v, [3, 4]), &device);
    let out: Tensor<B64, 1> = op.adjoint_tensor(t).unwrap();
    assert_eq!(out.dims(), [3]);
    let data = out.into_data();
    assert_eq!(data.as_slice::<f64>().unwrap(), expected.as_slice());
}

#[test]
fn test_precision_cast() {
    // f64 operator fed with f32 tensors: inputs are cast, results land back in f32.
    let device = Default::default();
    let op = UniformSpread::<f64, 2>::from_tensor(
        points_tensor::<B32>(&device),
        lattice(),
        broadcast(Arc::new(TriangleKernel::new(1.0))),
        SpreadConfig::default().without_warnings(),
    )
    .unwrap();
    let w = Tensor::<B32, 1>::from_data(TensorData::new(vec![1.0f32, 1.0, 1.0], [3]), &device);
    let out: Tensor<B32, 2> = op.apply_tensor(w).unwrap();
    let expected = op.apply(&[1.0, 1.0, 1.0]).unwrap();
    let data = out.into_data();
    for (a, b) in data.as_slice::<f32>().unwrap().iter().zip(&expected) {
        assert!((*a as f64 - b).abs() < 1e-6);
    }
}

#[test]
fn test_rank_and_shape_errors() {
    let device = Default::default();
    let op = UniformSpread::<f32, 2>::from_tensor(
        points_tensor::<B32>(&device),
        lattice(),
        broadcast(Arc::new(TriangleKernel::new(1.0))),
        SpreadConfig::default(),
    )
    .unwrap();
    let w = Tensor::<B32, 1>::zeros([3], &device);
    assert!(op.apply_tensor::<B32, 1, 3>(w).is_err());
    let w = Tensor::<B32, 1>::zeros([4], &device);
    assert!(op.apply_tensor::<B32, 1, 2>(w).is_err());

    let bad_points = Tensor::<B32, 2>::zeros([3, 3], &device);
    assert!(UniformSpread::<f32, 2>::from_tensor(
        bad_points,
        lattice(),
        broadcast(Arc::new(TriangleKernel::new(1.0))),
        SpreadConfig::default(),
    )
    .is_err());
}

#[test]
fn test_dense_matrix_tensor() {
    let device = Default::default();
    let op = UniformSpread::<f32, 2>::from_tensor(
        points_tensor::<B32>(&device),
        lattice(),
        broadcast(Arc::new(TriangleKernel::new(1.0))),
        SpreadConfig::default(),
    )
    .unwrap();
    let mat: Tensor<B32, 2> = op.dense_matrix_tensor(&device).unwrap();
    assert_eq!(mat.dims(), [12, 3]);
}

#[test]
fn test_empty_stack_tensor() {
    let device = Default::default();
    let op = UniformSpread::<f32, 2>::from_tensor(
        points_tensor::<B32>(&device),
        lattice(),
        broadcast(Arc::new(TriangleKernel::new(1.0))),
        SpreadConfig::default(),
    )
    .unwrap();
    let w = Tensor::<B32, 2>::zeros([0, 3], &device);
    let out: Tensor<B32, 3> = op.apply_tensor(w).unwrap();
    assert_eq!(out.dims(), [0, 3, 4]);

    let v = Tensor::<B32, 3>::zeros([0, 3, 4], &device);
    let back: Tensor<B32, 2> = op.adjoint_tensor(v).unwrap();
    assert_eq!(back.dims(), [0, 3]);
}
