#[macro_use]
extern crate criterion;

use criterion::{BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};

use column_buffer::select::SelectExt;
use column_buffer::{ColumnVec, Idx};

static SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn push(c: &mut Criterion) {
    let mut g = c.benchmark_group("push");
    for n in SIZES.iter() {
        g.bench_with_input(BenchmarkId::new("vec-1", n), n, |b, n| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..*n {
                    v.push(i as f64);
                }
                std::hint::black_box(v);
            })
        });
        g.bench_with_input(BenchmarkId::new("columns-1", n), n, |b, n| {
            b.iter(|| {
                let mut v: ColumnVec<(f64,)> = ColumnVec::new();
                for i in 0..*n {
                    v.push((i as f64,));
                }
                std::hint::black_box(v);
            })
        });
        g.bench_with_input(BenchmarkId::new("vec-3", n), n, |b, n| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..*n {
                    let x = i as f64;
                    v.push((x, x, x));
                }
                std::hint::black_box(v);
            })
        });
        g.bench_with_input(BenchmarkId::new("columns-3", n), n, |b, n| {
            b.iter(|| {
                let mut v: ColumnVec<(f64, f64, f64)> = ColumnVec::new();
                for i in 0..*n {
                    let x = i as f64;
                    v.push((x, x, x));
                }
                std::hint::black_box(v);
            })
        });
    }
    g.finish();
}

fn random_rows(n: usize) -> Vec<(f64, u32, u8)> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    (0..n).map(|_| (rng.gen(), rng.gen(), rng.gen())).collect()
}

fn iterate(c: &mut Criterion) {
    let mut g = c.benchmark_group("iterate");
    for n in SIZES.iter() {
        let rows = random_rows(*n);
        let columns: ColumnVec<(f64, u32, u8)> = rows.iter().copied().collect();

        g.bench_with_input(BenchmarkId::new("vec", n), n, |b, _| {
            b.iter(|| std::hint::black_box(rows.iter().map(|row| row.0).sum::<f64>()))
        });
        g.bench_with_input(BenchmarkId::new("rows", n), n, |b, _| {
            b.iter(|| std::hint::black_box(columns.iter().map(|row| *row.get::<0>()).sum::<f64>()))
        });
        g.bench_with_input(BenchmarkId::new("column", n), n, |b, _| {
            b.iter(|| std::hint::black_box(columns.column::<0>().iter().sum::<f64>()))
        });
        g.bench_with_input(BenchmarkId::new("select", n), n, |b, _| {
            b.iter(|| {
                let sum: f64 = columns
                    .iter()
                    .select::<(Idx<0>, Idx<2>)>()
                    .map(|row| *row.get::<0>() * *row.get::<1>() as f64)
                    .sum();
                std::hint::black_box(sum)
            })
        });
        g.bench_with_input(BenchmarkId::new("vec-select", n), n, |b, _| {
            b.iter(|| {
                let sum: f64 = rows
                    .iter()
                    .select::<(Idx<0>, Idx<2>)>()
                    .map(|row| *row.get::<0>() * *row.get::<1>() as f64)
                    .sum();
                std::hint::black_box(sum)
            })
        });
    }
    g.finish();
}

criterion_group!(benches, push, iterate);
criterion_main!(benches);
