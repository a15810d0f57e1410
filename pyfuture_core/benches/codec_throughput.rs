//! Codec Throughput Benchmarks
//!
//! Measures decode/encode speed for clean input and for input that forces
//! the error handler path.
//!
//! # Key Metrics
//!
//! - Clean UTF-8 decode: dominated by validation, should track input size
//! - Surrogate escape overhead: one handler call per invalid run

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pyfuture_core::codec::{self, SURROGATE_ESCAPE, STRICT};
use pyfuture_core::register_surrogateescape;

fn clean_input(len: usize) -> Vec<u8> {
    "héllo wörld 日本 ".bytes().cycle().take(len).collect()
}

fn dirty_input(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| if i % 16 == 0 { 0xFF } else { b'a' + (i % 26) as u8 })
        .collect()
}

// =============================================================================
// Decode Benchmarks
// =============================================================================

fn bench_decode(c: &mut Criterion) {
    register_surrogateescape();
    let mut group = c.benchmark_group("decode");

    for size in [64usize, 1024, 16 * 1024] {
        let clean = clean_input(size);
        let dirty = dirty_input(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("utf8_clean", size), &clean, |b, input| {
            b.iter(|| black_box(codec::decode(black_box(input), "utf-8", STRICT)))
        });

        group.bench_with_input(BenchmarkId::new("utf8_escaped", size), &dirty, |b, input| {
            b.iter(|| black_box(codec::decode(black_box(input), "utf-8", SURROGATE_ESCAPE)))
        });

        group.bench_with_input(BenchmarkId::new("latin1", size), &dirty, |b, input| {
            b.iter(|| black_box(codec::decode(black_box(input), "latin-1", STRICT)))
        });
    }

    group.finish();
}

// =============================================================================
// Encode Benchmarks
// =============================================================================

fn bench_encode(c: &mut Criterion) {
    register_surrogateescape();
    let mut group = c.benchmark_group("encode");

    for size in [64usize, 1024, 16 * 1024] {
        let clean = codec::decode(&clean_input(size), "utf-8", STRICT).unwrap_or_default();
        let escaped =
            codec::decode(&dirty_input(size), "utf-8", SURROGATE_ESCAPE).unwrap_or_default();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("utf8_clean", size), &clean, |b, text| {
            b.iter(|| black_box(codec::encode(black_box(text), "utf-8", STRICT)))
        });

        group.bench_with_input(BenchmarkId::new("utf8_escaped", size), &escaped, |b, text| {
            b.iter(|| black_box(codec::encode(black_box(text), "utf-8", SURROGATE_ESCAPE)))
        });

        group.bench_with_input(BenchmarkId::new("utf16", size), &clean, |b, text| {
            b.iter(|| black_box(codec::encode(black_box(text), "utf-16", STRICT)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
