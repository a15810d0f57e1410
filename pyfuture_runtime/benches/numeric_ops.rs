//! Integer Arithmetic Benchmarks
//!
//! Measures `NewInt` division for machine-sized operands and for operands
//! large enough to take the arbitrary-precision path.
//!
//! # Key Metrics
//!
//! - True division, small: one IEEE division after the exactness check
//! - True division, big: one bignum shift and divide per call
//! - Banker's rounding: exact decimal scaling of the float's binary value

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pyfuture_runtime::ops::{BinaryOp, binary_op};
use pyfuture_runtime::{NewInt, Value, round};

fn operands(bits: u32) -> (NewInt, NewInt) {
    let one = NewInt::from(1u8);
    let a = &one.shl(&NewInt::from(bits)).unwrap_or_default() - &NewInt::from(12_345);
    let b = &one.shl(&NewInt::from(bits / 2)).unwrap_or_default() + &NewInt::from(7);
    (a, b)
}

// =============================================================================
// Division Benchmarks
// =============================================================================

fn bench_division(c: &mut Criterion) {
    let mut group = c.benchmark_group("int_division");

    for bits in [32u32, 128, 1024] {
        let (a, b) = operands(bits);
        let neg = -&a;

        group.bench_with_input(BenchmarkId::new("floor_div", bits), &(&neg, &b), |bench, (x, y)| {
            bench.iter(|| black_box(black_box(*x).floor_div(black_box(*y))))
        });

        group.bench_with_input(BenchmarkId::new("modulo", bits), &(&neg, &b), |bench, (x, y)| {
            bench.iter(|| black_box(black_box(*x).modulo(black_box(*y))))
        });

        group.bench_with_input(BenchmarkId::new("true_div", bits), &(&a, &b), |bench, (x, y)| {
            bench.iter(|| black_box(black_box(*x).true_div(black_box(*y))))
        });
    }

    group.finish();
}

// =============================================================================
// Coercion Layer Benchmarks
// =============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let x = Value::from(1_000_003);
    let y = Value::from(97);
    let f = Value::from(2.5);

    group.bench_function("int_floor_div", |bench| {
        bench.iter(|| black_box(binary_op(BinaryOp::FloorDiv, black_box(&x), black_box(&y))))
    });

    group.bench_function("mixed_true_div", |bench| {
        bench.iter(|| black_box(binary_op(BinaryOp::TrueDiv, black_box(&x), black_box(&f))))
    });

    group.bench_function("round_2_digits", |bench| {
        bench.iter(|| black_box(round(black_box(&2.675f64), Some(2))))
    });

    group.finish();
}

criterion_group!(benches, bench_division, bench_dispatch);
criterion_main!(benches);
