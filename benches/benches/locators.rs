// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use understory_locator::{ContainmentLocator, RadiusLocator, SplitPolicy};

const WORLD: f64 = 2000.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_points(count: usize, seed: u64) -> Vec<Point> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| Point::new(rng.next_f64() * WORLD, rng.next_f64() * WORLD))
        .collect()
}

fn gen_clustered_points(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Point> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for _ in 0..n_clusters {
        let cx = spread + rng.next_f64() * (WORLD - 2.0 * spread);
        let cy = spread + rng.next_f64() * (WORLD - 2.0 * spread);
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Point::new(cx + dx, cy + dy));
        }
    }
    out
}

fn gen_random_boxes(count: usize, max_side: f64) -> Vec<Rect> {
    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
    (0..count)
        .map(|_| {
            let x0 = rng.next_f64() * (WORLD - max_side);
            let y0 = rng.next_f64() * (WORLD - max_side);
            let w = 1.0 + rng.next_f64() * max_side;
            let h = 1.0 + rng.next_f64() * max_side;
            Rect::new(x0, y0, x0 + w, y0 + h)
        })
        .collect()
}

fn world() -> Rect {
    Rect::new(0.0, 0.0, WORLD, WORLD)
}

fn bench_radius(c: &mut Criterion) {
    let mut group = c.benchmark_group("radius");
    for &n in &[1_000usize, 10_000] {
        let points = gen_random_points(n, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("build_query_n{}", n), |b| {
            b.iter_batched(
                || RadiusLocator::new(world(), |i: &u32| points[*i as usize]),
                |mut loc| {
                    for i in 0..n as u32 {
                        loc.add(i);
                    }
                    let hits = loc.query_radius(Point::new(1000.0, 1000.0), 100.0).len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }

    let points = gen_clustered_points(16, 500, 60.0);
    let probes = gen_random_points(256, 0xBADC_F00D_1234_5678);
    group.throughput(Throughput::Elements(probes.len() as u64));
    for threshold in [4usize, 16, 64] {
        let policy = SplitPolicy {
            threshold,
            min_size: 1.0,
        };
        let mut loc = RadiusLocator::with_policy(world(), policy, |i: &u32| points[*i as usize]);
        for i in 0..points.len() as u32 {
            loc.add(i);
        }
        group.bench_function(format!("clustered_query_t{}", threshold), |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                for p in &probes {
                    hits += loc.query_radius(*p, 50.0).len();
                }
                black_box(hits);
            })
        });
    }

    let churn: Vec<u32> = (0..points.len() as u32).step_by(3).collect();
    group.throughput(Throughput::Elements((churn.len() * 2) as u64));
    group.bench_function("clustered_remove_readd", |b| {
        b.iter_batched(
            || {
                let mut loc = RadiusLocator::new(world(), |i: &u32| points[*i as usize]);
                for i in 0..points.len() as u32 {
                    loc.add(i);
                }
                loc
            },
            |mut loc| {
                for i in &churn {
                    loc.remove(i);
                }
                for &i in &churn {
                    loc.add(i);
                }
                black_box(loc.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_containment(c: &mut Criterion) {
    let mut group = c.benchmark_group("containment");
    for &n in &[1_000usize, 10_000] {
        let boxes = gen_random_boxes(n, 40.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("batch_flush_n{}", n), |b| {
            b.iter_batched(
                || ContainmentLocator::new(|i: &u32| boxes[*i as usize]),
                |mut loc| {
                    for i in 0..n as u32 {
                        loc.add(i);
                    }
                    let hits = loc.query_point(Point::new(1000.0, 1000.0)).len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("query_per_add_n{}", n.min(2_000)), |b| {
            b.iter_batched(
                || ContainmentLocator::new(|i: &u32| boxes[*i as usize]),
                |mut loc| {
                    let mut hits = 0_usize;
                    for i in 0..n.min(2_000) as u32 {
                        loc.add(i);
                        hits += loc.query_point(Point::new(1000.0, 1000.0)).len();
                    }
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }

    let boxes = gen_random_boxes(10_000, 40.0);
    let probes = gen_random_points(256, 0x0123_4567_89AB_CDEF);
    let mut loc = ContainmentLocator::new(|i: &u32| boxes[*i as usize]);
    for i in 0..boxes.len() as u32 {
        loc.add(i);
    }
    loc.flush();
    group.throughput(Throughput::Elements(probes.len() as u64));
    group.bench_function("query_heavy_n10000", |b| {
        b.iter(|| {
            let mut hits = 0_usize;
            for p in &probes {
                hits += loc.query_point(*p).len();
            }
            black_box(hits);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_radius, bench_containment);
criterion_main!(benches);
