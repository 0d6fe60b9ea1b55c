// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use understory_locator::RadiusLocator;

use rstar::RTree;
use rstar::primitives::GeomWithData;

fn gen_grid_points(n: usize, cell: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Point::new(x as f64 * cell + 0.5, y as f64 * cell + 0.5));
        }
    }
    out
}

fn to_rstar_points(v: &[Point]) -> Vec<GeomWithData<[f64; 2], u32>> {
    v.iter()
        .enumerate()
        .map(|(i, p)| GeomWithData::new([p.x, p.y], i as u32))
        .collect()
}

fn bench_radius_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("radius_external_compare");
    for &n in &[64usize, 128] {
        let cell = 10.0;
        let points = gen_grid_points(n, cell);
        let bounds = Rect::new(0.0, 0.0, n as f64 * cell, n as f64 * cell);
        let center = bounds.center();
        let range = 150.0;
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("understory_build_query_n{}", n), |b| {
            b.iter_batched(
                || RadiusLocator::new(bounds, |i: &u32| points[*i as usize]),
                |mut loc| {
                    for i in 0..points.len() as u32 {
                        loc.add(i);
                    }
                    let hits = loc.query_radius(center, range).len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_points(&points),
                |entries| {
                    let mut tree = RTree::new();
                    for e in entries {
                        tree.insert(e);
                    }
                    let hits = tree
                        .locate_within_distance([center.x, center.y], range * range)
                        .count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_points(&points),
                |entries| {
                    let tree = RTree::bulk_load(entries);
                    let hits = tree
                        .locate_within_distance([center.x, center.y], range * range)
                        .count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_radius_external_compare);
criterion_main!(benches);
