use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ebci_confidence::{cva, length_optimal_ebci, mse_ebci, tangency_point};
use ebci_core::SolverConfig;

fn bench_tangency(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tangency");
    let config = SolverConfig::default();

    for &chi in &[2.0, 4.0, 16.0] {
        group.bench_with_input(BenchmarkId::from_parameter(chi), &chi, |b, &chi| {
            b.iter(|| tangency_point(black_box(chi), &config))
        });
    }

    group.finish();
}

fn bench_critical_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("CriticalValue");
    let config = SolverConfig::default();
    let fast = SolverConfig::fast();

    for &m in &[0.1, 1.0, 10.0, 100.0] {
        group.bench_with_input(BenchmarkId::new("unbounded", m), &m, |b, &m| {
            b.iter(|| cva(black_box(m), None, 0.05, &config))
        });

        group.bench_with_input(BenchmarkId::new("kappa_3", m), &m, |b, &m| {
            b.iter(|| cva(black_box(m), Some(3.0), 0.05, &config))
        });

        group.bench_with_input(BenchmarkId::new("kappa_3_fast", m), &m, |b, &m| {
            b.iter(|| cva(black_box(m), Some(3.0), 0.05, &fast))
        });
    }

    group.finish();
}

fn bench_robust_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("RobustEbci");
    group.sample_size(20);
    let config = SolverConfig::default();

    for &ratio in &[0.1, 1.0, 10.0] {
        let w_eb = ratio / (1.0 + ratio);

        group.bench_with_input(BenchmarkId::new("mse_optimal", ratio), &ratio, |b, &r| {
            b.iter(|| mse_ebci(w_eb, black_box(r), Some(3.0), 0.05, &config))
        });

        group.bench_with_input(BenchmarkId::new("length_optimal", ratio), &ratio, |b, &r| {
            b.iter(|| length_optimal_ebci(black_box(r), Some(3.0), 0.05, &config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tangency, bench_critical_value, bench_robust_modes);
criterion_main!(benches);
