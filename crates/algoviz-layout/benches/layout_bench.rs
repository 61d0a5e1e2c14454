//! Benchmarks for Algoviz layout
//!
//! Measures performance of:
//! - Hierarchical layout of degenerate and balanced trees
//! - Bar layout of large arrays

use algoviz_layout::{bar_layout, Hierarchy, LayoutConfig, Margin, Side};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A chain of right children: the worst case for recursion depth.
fn chain(n: u64) -> Hierarchy {
    let mut h = Hierarchy::new();
    for id in 0..n {
        h.add_node(id).unwrap();
        if id > 0 {
            h.attach(id - 1, id, Some(Side::Right)).unwrap();
        }
    }
    h
}

/// A complete binary tree in heap order.
fn complete(n: u64) -> Hierarchy {
    let mut h = Hierarchy::new();
    for id in 0..n {
        h.add_node(id).unwrap();
        if id > 0 {
            let side = if id % 2 == 1 { Side::Left } else { Side::Right };
            h.attach((id - 1) / 2, id, Some(side)).unwrap();
        }
    }
    h
}

fn bench_tree_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_layout");
    let config = LayoutConfig::default();

    for &n in &[15u64, 127, 1023] {
        group.throughput(Throughput::Elements(n));
        let balanced = complete(n);
        group.bench_with_input(BenchmarkId::new("complete", n), &balanced, |b, h| {
            b.iter(|| h.layout(black_box(&config)).unwrap())
        });
        let degenerate = chain(n);
        group.bench_with_input(BenchmarkId::new("chain", n), &degenerate, |b, h| {
            b.iter(|| h.layout(black_box(&config)).unwrap())
        });
    }
    group.finish();
}

fn bench_bar_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("bar_layout");

    for &n in &[10usize, 100, 1000] {
        let values: Vec<i64> = (0..n as i64).map(|v| (v * 37) % 100 + 1).collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, v| {
            b.iter(|| bar_layout(black_box(v), 800.0, 400.0, Margin::default()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tree_layout, bench_bar_layout);
criterion_main!(benches);
