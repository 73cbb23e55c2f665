use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use uspread_core::kernel::{broadcast, EsKernel, FnKernel, KernelRef};
use uspread_core::lattice::LatticeSpec;
use uspread_core::SpreadError;
use uspread_operator::{ChunkedArray, ChunkedUniformSpread, LinearOperator, SpreadConfig, UniformSpread};

const M: usize = 150;

fn setup() -> (Vec<[f64; 2]>, LatticeSpec<2>, [KernelRef; 2]) {
    let mut rng = StdRng::seed_from_u64(7);
    let points: Vec<[f64; 2]> = (0..M)
        .map(|_| [rng.gen_range(-0.2..3.2), rng.gen_range(-0.2..2.2)])
        .collect();
    let lattice = LatticeSpec::<2>::new([0.0, 0.0], [3.0, 2.0], [13, 9]).unwrap();
    let kernels = broadcast(Arc::new(EsKernel::with_upsampling(0.75, 2.0)));
    (points, lattice, kernels)
}

fn assert_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((x - y).abs() < 1e-9, "{} != {}", x, y);
    }
}

#[test]
fn test_chunked_matches_threaded() {
    let (points, lattice, kernels) = setup();
    let config = SpreadConfig::default().with_lattice_chunk_size(4);
    let threaded = UniformSpread::new(points.clone(), lattice, kernels.clone(), config.clone()).unwrap();
    let chunked = ChunkedUniformSpread::new(points, vec![50, 60, 40], lattice, kernels, config).unwrap();
    assert_eq!(chunked.lattice_chunks()[0], vec![4, 4, 4, 1]);

    let mut rng = StdRng::seed_from_u64(11);
    let w: Vec<f64> = (0..3 * M).map(|_| rng.gen_range(-1.0..1.0)).collect();
    assert_close(&chunked.apply(&w).unwrap(), &threaded.apply(&w).unwrap());

    let v: Vec<f64> = (0..2 * 13 * 9).map(|_| rng.gen_range(-1.0..1.0)).collect();
    assert_close(&chunked.adjoint(&v).unwrap(), &threaded.adjoint(&v).unwrap());
}

#[test]
fn test_chunked_arrays_with_stack_chunks() {
    let (points, lattice, kernels) = setup();
    let threaded = UniformSpread::new(points.clone(), lattice, kernels.clone(), SpreadConfig::default()).unwrap();
    let chunked = ChunkedUniformSpread::new(points, vec![75, 75], lattice, kernels, SpreadConfig::default())
        .unwrap()
        .with_lattice_chunks([vec![5, 8], vec![9]])
        .unwrap();

    let w: Vec<f64> = (0..4 * M).map(|i| ((i % 13) as f64 - 6.0) / 6.0).collect();
    let w_chunked = ChunkedArray::from_dense(&w, &[4, M], vec![vec![1, 3], vec![75, 75]]).unwrap();
    let out = chunked.apply_chunked(&w_chunked).unwrap();
    assert_eq!(out.shape(), &[4, 13, 9]);
    assert_eq!(out.chunks(), &[vec![1, 3], vec![5, 8], vec![9]]);
    assert_close(&out.to_dense(), &threaded.apply(&w).unwrap());

    // Interpolation follows the value array's own lattice chunks.
    let v = out.to_dense();
    let v_chunked = ChunkedArray::from_dense(&v, &[4, 13, 9], vec![vec![2, 2], vec![13], vec![3, 3, 3]]).unwrap();
    let back = chunked.adjoint_chunked(&v_chunked).unwrap();
    assert_eq!(back.shape(), &[4, M]);
    assert_eq!(back.chunks()[1], vec![75, 75]);
    assert_close(&back.to_dense(), &threaded.adjoint(&v).unwrap());
}

#[test]
fn test_point_axis_chunk_mismatch() {
    let (points, lattice, kernels) = setup();
    let chunked = ChunkedUniformSpread::new(points, vec![100, 50], lattice, kernels, SpreadConfig::default()).unwrap();
    let w = vec![1.0; M];
    let wrong = ChunkedArray::from_dense(&w, &[M], vec![vec![50, 100]]).unwrap();
    match chunked.apply_chunked(&wrong) {
        Err(SpreadError::ChunkLayoutMismatch { expected, actual }) => {
            assert_eq!(expected, vec![100, 50]);
            assert_eq!(actual, vec![50, 100]);
        }
        other => panic!("expected a chunk layout mismatch, got {:?}", other),
    }
}

#[test]
fn test_lattice_shape_mismatch() {
    let (points, lattice, kernels) = setup();
    let chunked = ChunkedUniformSpread::new(points, vec![M], lattice, kernels, SpreadConfig::default()).unwrap();
    let v = vec![0.0; 13 * 8];
    let wrong = ChunkedArray::from_dense(&v, &[13, 8], vec![vec![13], vec![8]]).unwrap();
    assert!(matches!(
        chunked.adjoint_chunked(&wrong),
        Err(SpreadError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_chunked_matches_threaded_with_box_kernel() {
    // 0.3 / 6 is inexact and the box kernel jumps at its support edge, so any
    // coordinate drift between chunk and full lattice flips whole kernel values
    let lattice = LatticeSpec::<1>::new([0.0], [0.3], [7]).unwrap();
    let s = 2.0 * lattice.step(0);
    let kernels: [KernelRef; 1] = broadcast(Arc::new(FnKernel::new(|_: f64| 1.0, s)));
    let mut points: Vec<[f64; 1]> = lattice
        .axis::<f64>(0)
        .iter()
        .flat_map(|&z| [[z], [z - s], [z + s]])
        .collect();
    points.extend((0..40).map(|i| [-0.12 + i as f64 * 0.0137]));
    let m = points.len();

    let config = SpreadConfig::default().with_lattice_chunk_size(3);
    let threaded = UniformSpread::new(points.clone(), lattice, kernels.clone(), config.clone()).unwrap();
    let chunked = ChunkedUniformSpread::new(points, vec![30, m - 30], lattice, kernels, config).unwrap();
    assert_eq!(chunked.lattice_chunks()[0], vec![3, 3, 1]);

    let mat = threaded.dense_matrix().unwrap();
    let w = vec![1.0; m];
    let expected: Vec<f64> = mat.chunks_exact(m).map(|row| row.iter().sum()).collect();
    assert_eq!(threaded.apply(&w).unwrap(), expected);
    assert_eq!(chunked.apply(&w).unwrap(), expected);

    let v = vec![1.0; 7];
    let column_sums: Vec<f64> = (0..m).map(|j| (0..7).map(|i| mat[i * m + j]).sum()).collect();
    assert_eq!(threaded.adjoint(&v).unwrap(), column_sums);
    assert_eq!(chunked.adjoint(&v).unwrap(), column_sums);
}

#[test]
fn test_chunked_dense_matrix_matches_threaded() {
    let (points, lattice, kernels) = setup();
    let config = SpreadConfig::default().with_lattice_chunk_size(4);
    let threaded = UniformSpread::new(points.clone(), lattice, kernels.clone(), config.clone()).unwrap();
    let chunked = ChunkedUniformSpread::new(points, vec![50, 100], lattice, kernels, config).unwrap();
    assert_eq!(chunked.dense_matrix().unwrap(), threaded.dense_matrix().unwrap());
}

#[test]
fn test_empty_stack() {
    let (points, lattice, kernels) = setup();
    let chunked = ChunkedUniformSpread::new(points, vec![M], lattice, kernels, SpreadConfig::default()).unwrap();
    assert!(chunked.apply(&[]).unwrap().is_empty());
    assert!(chunked.adjoint(&[]).unwrap().is_empty());

    let w = ChunkedArray::from_dense(&[], &[0, M], vec![vec![], vec![M]]).unwrap();
    let out = chunked.apply_chunked(&w).unwrap();
    assert_eq!(out.shape(), &[0, 13, 9]);
    assert_eq!(out.n_blocks(), 0);
    assert!(out.to_dense().is_empty());
}
