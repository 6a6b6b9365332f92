//! Benchmarks for FIR design construction and HRF estimation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use firhrf_core::{Event, EventTable, PeristimulusGrid, RetrievalConfig};
use firhrf_native::processing::{build_design_matrices, estimate_average, estimate_fir, Timecourse};
use firhrf_native::{simulate_timecourse, SimulationConfig};

/// Alternating-condition schedule with jittered onsets
fn generate_events(n_events: usize, n_conditions: i64) -> EventTable {
    (0..n_events)
        .map(|i| {
            let jitter = (i as f64 * 0.37).sin() * 1.5;
            let code = i as i64 % n_conditions;
            Event::new(8.0 + i as f64 * 12.0 + jitter, code, 1.0, format!("cond{code}"))
        })
        .collect()
}

fn generate_voxels(base: &Timecourse, n_voxels: usize) -> Timecourse {
    let samples = base.voxel_samples(0).unwrap_or_default();
    let rows: Vec<Vec<f64>> = (0..n_voxels)
        .map(|v| {
            samples
                .iter()
                .enumerate()
                .map(|(t, s)| s * (1.0 + v as f64 * 0.1) + (t as f64 * 0.123 + v as f64).sin())
                .collect()
        })
        .collect();
    Timecourse::from_rows(&rows).unwrap()
}

fn bench_design_matrices(c: &mut Criterion) {
    let mut group = c.benchmark_group("design_matrices");
    let config = RetrievalConfig::new(2.0).with_er(0.5);
    let grid = PeristimulusGrid::new(&config).unwrap();

    for n_events in [20, 80, 320].iter() {
        let events = generate_events(*n_events, 4);
        let conditions = events.conditions();
        let ntps = n_events * 6 + 20;

        group.bench_with_input(BenchmarkId::from_parameter(n_events), n_events, |b, _| {
            b.iter(|| build_design_matrices(black_box(&events), &conditions, &grid, ntps));
        });
    }

    group.finish();
}

fn bench_fir_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fir_estimation");
    let config = RetrievalConfig::new(2.0);
    let grid = PeristimulusGrid::new(&config).unwrap();

    for n_voxels in [1, 16, 128].iter() {
        let events = generate_events(60, 3);
        let sim = SimulationConfig {
            n_timepoints: 400,
            ..SimulationConfig::default()
        };
        let base = simulate_timecourse(&events, &grid, &sim).unwrap();
        let tc = generate_voxels(&base, *n_voxels);
        let designs = build_design_matrices(&events, &events.conditions(), &grid, 400);

        group.bench_with_input(BenchmarkId::from_parameter(n_voxels), n_voxels, |b, _| {
            b.iter(|| estimate_fir(black_box(&designs), &tc, grid.n_h_est()).unwrap());
        });
    }

    group.finish();
}

fn bench_average_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("average_estimation");
    let config = RetrievalConfig::new(2.0);
    let grid = PeristimulusGrid::new(&config).unwrap();
    let events = generate_events(60, 1);
    let sim = SimulationConfig {
        n_timepoints: 400,
        ..SimulationConfig::default()
    };
    let base = simulate_timecourse(&events, &grid, &sim).unwrap();
    let designs = build_design_matrices(&events, &events.conditions(), &grid, 400);

    for n_voxels in [1, 128].iter() {
        let tc = generate_voxels(&base, *n_voxels);

        group.bench_with_input(BenchmarkId::from_parameter(n_voxels), n_voxels, |b, _| {
            b.iter(|| estimate_average(black_box(&designs[0]), &tc, &grid).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_design_matrices,
    bench_fir_estimation,
    bench_average_estimation
);
criterion_main!(benches);
