//! ConcurrentMultimap throughput benchmark.
//!
//! Measures single-threaded `put` and `get` cost, and `put` throughput from
//! several threads writing to disjoint keys versus one shared key.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use livearray::multimap::ConcurrentMultimap;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

const SIZES: [usize; 3] = [100, 1000, 10000];
const THREAD_COUNTS: [usize; 3] = [1, 2, 4];
const PUTS_PER_THREAD: usize = 1000;

fn benchmark_put(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("concurrent_multimap_put");

    for size in SIZES {
        group.bench_with_input(BenchmarkId::new("put", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let multimap = ConcurrentMultimap::new();
                for value in 0..size {
                    multimap.put(value % 16, value);
                }
                black_box(multimap)
            });
        });
    }

    group.finish();
}

fn benchmark_view_contains(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("concurrent_multimap_view_contains");

    for size in SIZES {
        let multimap = ConcurrentMultimap::new();
        multimap.put_all(0_usize, 0..size);
        let view = multimap.get(0);
        group.bench_with_input(BenchmarkId::new("contains", size), &size, |bencher, &size| {
            bencher.iter(|| black_box(view.contains(black_box(&(size / 2)))));
        });
    }

    group.finish();
}

fn run_writers(threads: usize, shared_key: bool) -> Arc<ConcurrentMultimap<usize, usize>> {
    let multimap = Arc::new(ConcurrentMultimap::new());
    let handles: Vec<_> = (0..threads)
        .map(|thread_index| {
            let multimap = Arc::clone(&multimap);
            thread::spawn(move || {
                let key = if shared_key { 0 } else { thread_index };
                for value in 0..PUTS_PER_THREAD {
                    multimap.put(key, thread_index * PUTS_PER_THREAD + value);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    multimap
}

fn benchmark_contention(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("concurrent_multimap_contention");

    for threads in THREAD_COUNTS {
        group.bench_with_input(BenchmarkId::new("disjoint_keys", threads), &threads, |bencher, &threads| {
            bencher.iter(|| black_box(run_writers(threads, false)));
        });
        group.bench_with_input(BenchmarkId::new("shared_key", threads), &threads, |bencher, &threads| {
            bencher.iter(|| black_box(run_writers(threads, true)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_put, benchmark_view_contains, benchmark_contention);

criterion_main!(benches);
