//! String column benchmarks
//!
//! Measures the paths that decide column throughput:
//!
//! - Append into short leaves, long leaves, and across leaf splits
//! - Random positional reads
//! - Linear find versus indexed find
//! - Short-to-long promotion of a full leaf

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use turcol::{ColumnConfig, SlabAllocator, StringColumn};

fn filled(alloc: &mut SlabAllocator, count: usize, long: bool) -> StringColumn {
    let mut column = StringColumn::new(alloc).unwrap();
    for i in 0..count {
        let value = if long {
            format!("long value number {:08}", i)
        } else {
            format!("v{:06}", i % 1000)
        };
        column.add(alloc, &value).unwrap();
    }
    column
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_append");

    for count in [1000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        for (name, long) in [("short", false), ("long", true)] {
            group.bench_with_input(BenchmarkId::new(name, count), count, |b, &count| {
                b.iter(|| {
                    let mut alloc = SlabAllocator::new();
                    let column = filled(&mut alloc, count, long);
                    black_box(column.node_ref())
                });
            });
        }
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_get");

    for count in [1000, 100_000].iter() {
        let mut alloc = SlabAllocator::new();
        let column = filled(&mut alloc, *count, false);

        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(BenchmarkId::new("random", count), count, |b, &count| {
            b.iter(|| {
                let mut row = 17usize;
                for _ in 0..1000 {
                    row = (row * 31 + 7) % count;
                    black_box(column.get(&alloc, row).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_find");
    let count = 50_000;

    let mut alloc = SlabAllocator::new();
    let mut column = filled(&mut alloc, count, false);

    group.bench_function("scan", |b| {
        b.iter(|| black_box(column.find_all(&alloc, black_box("v000999")).unwrap()));
    });

    column.create_index(&mut alloc).unwrap();
    group.bench_function("indexed", |b| {
        b.iter(|| black_box(column.find_all(&alloc, black_box("v000999")).unwrap()));
    });

    group.finish();
}

fn bench_promotion(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_promotion");
    let config = ColumnConfig::default();

    group.bench_function("full_leaf", |b| {
        b.iter_with_setup(
            || {
                let mut alloc = SlabAllocator::new();
                let mut column = StringColumn::with_config(&mut alloc, config).unwrap();
                for i in 0..config.leaf_capacity() - 1 {
                    column.add(&mut alloc, &format!("s{:04}", i)).unwrap();
                }
                (alloc, column)
            },
            |(mut alloc, mut column)| {
                column
                    .add(&mut alloc, "this value forces a long leaf")
                    .unwrap();
                (alloc, column)
            },
        );
    });

    group.finish();
}

criterion_group!(benches, bench_append, bench_get, bench_find, bench_promotion);
criterion_main!(benches);
