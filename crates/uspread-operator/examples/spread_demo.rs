//! Spreading Demo
//!
//! Spreads random weights onto a 2-D lattice with the ES kernel, checks the
//! adjoint identity, and compares threaded and chunked execution.
//!
//! Usage:
//!   cargo run --example spread_demo

use std::sync::Arc;
use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use uspread_core::kernel::{broadcast, es::kernel_width, EsKernel};
use uspread_core::lattice::LatticeSpec;
use uspread_operator::{ChunkedUniformSpread, LinearOperator, SpreadConfig, UniformSpread};

const N_POINTS: usize = 20_000;
const N_NODES: usize = 256;

fn main() -> anyhow::Result<()> {
    println!("Uniform Spreading Demo");
    println!("======================\n");

    tracing_subscriber::fmt().with_env_filter("info").init();

    // 1. Unit-step lattice and a kernel sized for 1e-6 accuracy at 2x upsampling.
    let extent = (N_NODES - 1) as f64;
    let lattice = LatticeSpec::<2>::broadcast(0.0, extent, N_NODES)?;
    let width = kernel_width(1e-6, 2.0).ok_or_else(|| anyhow::anyhow!("no kernel width for eps"))?;
    let kernels = broadcast(Arc::new(EsKernel::with_upsampling(width, 2.0)));
    println!("Kernel width: {} nodes", width);

    // 2. Random samples, some outside the lattice.
    let mut rng = StdRng::seed_from_u64(42);
    let points: Vec<[f64; 2]> = (0..N_POINTS)
        .map(|_| {
            let x = rng.gen_range(-0.1 * extent..1.1 * extent);
            let y = rng.gen_range(-0.1 * extent..1.1 * extent);
            [x, y]
        })
        .collect();
    let w: Vec<f64> = (0..N_POINTS).map(|_| rng.gen_range(-1.0..1.0)).collect();

    let config = SpreadConfig::default()
        .with_max_cluster_size(2_000)
        .with_workers(4);
    let op = UniformSpread::new(points.clone(), lattice, kernels.clone(), config.clone())?;
    println!(
        "Clusters: {} (active {}, culled {})",
        op.partition().len(),
        op.partition().n_active(),
        op.partition().n_culled()
    );

    // 3. Spread and interpolate.
    let start = Instant::now();
    let grid = op.apply(&w)?;
    println!("apply:   {:?}", start.elapsed());

    let start = Instant::now();
    let back = op.adjoint(&grid)?;
    println!("adjoint: {:?}", start.elapsed());

    let lhs: f64 = grid.iter().map(|x| x * x).sum();
    let rhs: f64 = w.iter().zip(&back).map(|(a, b)| a * b).sum();
    println!("<Aw, Aw> = {:.6e}, <w, A*Aw> = {:.6e}", lhs, rhs);

    // 4. Chunked execution over 4 point chunks.
    let chunked = ChunkedUniformSpread::new(
        points,
        vec![N_POINTS / 4; 4],
        lattice,
        kernels,
        config.with_lattice_chunk_size(64),
    )?;
    let start = Instant::now();
    let grid_chunked = chunked.apply(&w)?;
    println!("chunked apply: {:?}", start.elapsed());

    let max_diff = grid
        .iter()
        .zip(&grid_chunked)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    println!("max |threaded - chunked| = {:.3e}", max_diff);

    Ok(())
}
