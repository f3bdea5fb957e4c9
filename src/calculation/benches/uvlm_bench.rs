//! Benchmarks for the hot paths of the vortex-lattice time march.
//!
//! Run with: `cargo bench -p tombo-calc`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use tombo_calc::geometry::RigidMotion;
use tombo_calc::influence::assemble_matrix;
use tombo_calc::kernel::{Filament, induced_velocities};
use tombo_calc::mesh::{self, Surface};
use tombo_calc::nondim::nondimensionalize;
use tombo_calc::{Config, NoObserver, Simulation, Vec3, Wing, WingHalf};

/// Hovering defaults with a finer mesh
fn fine_config(n_span: usize, n_chord: usize) -> Config {
    let mut config = Config::default();
    for wing in [&mut config.front, &mut config.rear] {
        wing.n_span = n_span;
        wing.n_chord = n_chord;
    }
    config
}

/// Four placed halves at t = 0.3
fn placed_surfaces(config: &Config) -> Vec<Surface> {
    let (params, _) = nondimensionalize(config).unwrap();
    let front = mesh::generate(&params.front).unwrap();
    let rear = mesh::generate(&params.rear).unwrap();
    WingHalf::ALL
        .iter()
        .map(|&half| {
            let wing = if half.wing() == Wing::Front { &front } else { &rear };
            RigidMotion::at(&params, half, 0.3).place(&wing.half(half.side()))
        })
        .collect()
}

/// Benchmark the batched kernel against a synthetic wake
fn bench_kernel(c: &mut Criterion) {
    let surfaces = placed_surfaces(&fine_config(8, 4));
    let wake: Vec<Filament> = surfaces
        .iter()
        .flat_map(|s| s.rings.iter())
        .enumerate()
        .map(|(i, ring)| Filament {
            ring: ring.map_corners(|c| *c + Vec3::new(0.5, 0.0, -0.1 * (i % 7) as f64)),
            gamma: 0.01 * i as f64,
        })
        .collect();
    let points: Vec<Vec3> = surfaces.iter().flat_map(|s| s.collocation.iter().copied()).collect();

    let mut group = c.benchmark_group("Kernel");
    group.throughput(Throughput::Elements((points.len() * wake.len()) as u64));
    group.bench_function("induced_velocities", |bencher| {
        bencher.iter(|| induced_velocities(&points, &[wake.as_slice()], 1e-3));
    });
    group.finish();
}

/// Benchmark influence-matrix assembly for growing meshes
fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("Assembly");
    for (n_span, n_chord) in [(4, 2), (8, 4), (16, 4)] {
        let surfaces = placed_surfaces(&fine_config(n_span, n_chord));
        let refs: Vec<&Surface> = surfaces.iter().collect();
        let dim: usize = surfaces.iter().map(Surface::total_count).sum();
        group.throughput(Throughput::Elements((dim * dim) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(dim), &refs, |bencher, refs| {
            bencher.iter(|| assemble_matrix(refs, 1e-3));
        });
    }
    group.finish();
}

/// Benchmark a short end-to-end run (typical parameter sweep unit)
fn bench_time_march(c: &mut Criterion) {
    let mut config = fine_config(4, 2);
    config.simulation.nstep = 10;

    let mut group = c.benchmark_group("TimeMarch");
    group.sample_size(10);
    group.bench_function("ten_steps", |bencher| {
        bencher.iter(|| {
            let (simulation, _) = Simulation::from_config(&config).unwrap();
            simulation.run(&mut NoObserver).unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_kernel, bench_assembly, bench_time_march);
criterion_main!(benches);
