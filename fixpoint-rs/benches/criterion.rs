use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fixpoint_rs::examples::{chains, fib};
use fixpoint_rs::solver::{solve, solve_lazy};

fn bench_eager(c: &mut Criterion) {
    let mut group = c.benchmark_group("eager");
    for &n in &[100u32, 1000] {
        group.bench_with_input(BenchmarkId::new("linear_oneway", n), &n, |b, &n| {
            let problem = chains::linear_oneway(n);
            b.iter(|| solve(&problem).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("fan_out", n), &n, |b, &n| {
            let problem = chains::fan_out(n);
            b.iter(|| solve(&problem).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("diamond", n), &n, |b, &n| {
            let problem = chains::diamond(n);
            b.iter(|| solve(&problem).unwrap())
        });
    }
    group.finish();
}

fn bench_lazy(c: &mut Criterion) {
    let mut group = c.benchmark_group("lazy");
    for &n in &[10u32, 40] {
        group.bench_with_input(BenchmarkId::new("fib", n), &n, |b, &n| {
            b.iter(|| solve_lazy(fib::var(n), fib::resolver).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_eager, bench_lazy);
criterion_main!(benches);
