// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeSet;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_ordered_index::OrderedIndex;

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
}

fn gen_keys(count: usize, seed: u64) -> Vec<u64> {
    let mut rng = Rng::new(seed);
    (0..count).map(|_| rng.next_u64() % 1_000_000).collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_build");
    for &n in &[1_000usize, 10_000, 100_000] {
        let keys = gen_keys(n, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("random_n{}", n), |b| {
            b.iter_batched(
                OrderedIndex::<u64>::default,
                |mut idx| {
                    for &k in &keys {
                        let _ = idx.insert(k);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("ascending_n{}", n), |b| {
            b.iter_batched(
                OrderedIndex::<u64>::default,
                |mut idx| {
                    for k in 0..n as u64 {
                        let _ = idx.insert(k);
                    }
                    black_box(idx.height());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("btreeset_random_n{}", n), |b| {
            b.iter_batched(
                BTreeSet::<u64>::new,
                |mut set| {
                    for &k in &keys {
                        set.insert(k);
                    }
                    black_box(set.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_lookup_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_lookup_heavy");
    let keys = gen_keys(50_000, 0xBADC_F00D_1234_5678);
    let idx: OrderedIndex<u64> = keys.iter().copied().collect();
    let probes = gen_keys(1_000, 0xFACE_FEED_CAFE_BABE);
    group.throughput(Throughput::Elements(probes.len() as u64));
    group.bench_function("find_before_after", |b| {
        b.iter(|| {
            let mut acc = 0_u64;
            for p in &probes {
                acc = acc.wrapping_add(idx.find_before(p).copied().unwrap_or(0));
                acc = acc.wrapping_add(idx.find_after(p).copied().unwrap_or(0));
            }
            black_box(acc);
        })
    });
    group.bench_function("including_window_1000", |b| {
        b.iter(|| {
            let mut hits = 0_usize;
            for p in &probes {
                hits += idx.including(Some(p), Some(&(p + 1_000))).count();
            }
            black_box(hits);
        })
    });
    group.bench_function("inside_window_1000", |b| {
        b.iter(|| {
            let mut hits = 0_usize;
            for p in &probes {
                hits += idx.inside(Some(p), Some(&(p + 1_000))).count();
            }
            black_box(hits);
        })
    });
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_churn");
    let base = gen_keys(20_000, 0xC1A5_7E55_9999_ABCD);
    let churn = gen_keys(5_000, 0x0123_4567_89AB_CDEF);
    group.throughput(Throughput::Elements((churn.len() * 2) as u64));
    group.bench_function("remove_reinsert", |b| {
        b.iter_batched(
            || base.iter().copied().collect::<OrderedIndex<u64>>(),
            |mut idx| {
                for k in &churn {
                    let _ = idx.remove(k);
                }
                for &k in &churn {
                    let _ = idx.insert(k);
                }
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("duplicate_20000", |b| {
        let idx: OrderedIndex<u64> = base.iter().copied().collect();
        b.iter(|| black_box(idx.duplicate().len()))
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup_heavy, bench_churn);
criterion_main!(benches);
