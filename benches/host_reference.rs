//! Host-side reference and comparison throughput.
//!
//! The host reference is recomputed for every test invocation, so it should
//! stay cheap relative to the device round trip it validates.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kernelcheck::harness::compare::{all_close, Tolerance};
use kernelcheck::harness::data;
use kernelcheck::kerneltests::matrix_mul::matmul_reference;

fn bench_matmul_reference(c: &mut Criterion) {
    let a = data::uniform(64 * 32, 0.0, 1.0, 1);
    let b = data::uniform(32 * 128, 0.0, 1.0, 2);

    c.bench_function("matmul_reference_64x32x128", |bench| {
        bench.iter(|| matmul_reference(black_box(&a), black_box(&b), 64, 32, 128))
    });
}

fn bench_all_close(c: &mut Criterion) {
    let expected = data::uniform(10_000, 0.0, 1.0, 3);
    let actual = expected.clone();

    c.bench_function("all_close_10k", |bench| {
        bench.iter(|| all_close(black_box(&expected), black_box(&actual), Tolerance::default()))
    });
}

criterion_group!(benches, bench_matmul_reference, bench_all_close);
criterion_main!(benches);
