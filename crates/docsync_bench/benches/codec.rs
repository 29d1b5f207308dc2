//! Document comparator and JSON codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docsync_bench::random_document;
use docsync_codec::json::{from_json, to_json};

/// Benchmark the tie-break comparator on documents of growing width.
fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    for fields in [1, 8, 32, 128].iter() {
        group.throughput(Throughput::Elements(*fields as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fields), fields, |b, &fields| {
            let left = random_document("A", fields, 16);
            // Same keys, so the walk reaches the values.
            let mut right = left.clone();
            right.set("n", 0i64).unwrap();

            b.iter(|| black_box(&left).compare(black_box(&right)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark JSON encoding.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_encode");

    for fields in [1, 8, 32].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(fields), fields, |b, &fields| {
            let doc = random_document("A", fields, 32);
            b.iter(|| to_json(black_box(&doc)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark JSON decoding.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_decode");

    for fields in [1, 8, 32].iter() {
        let encoded = to_json(&random_document("A", *fields, 32)).unwrap();
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(fields),
            &encoded,
            |b, encoded| {
                b.iter(|| from_json(black_box(encoded)).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compare, bench_encode, bench_decode);
criterion_main!(benches);
