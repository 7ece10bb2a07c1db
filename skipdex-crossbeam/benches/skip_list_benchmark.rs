//! Benchmark comparing the epoch-guarded skipdex list with crossbeam-skiplist.
//!
//! Run with: cargo bench --package skipdex-crossbeam --bench skip_list_benchmark

use std::sync::Arc;
use std::thread;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use crossbeam_skiplist::SkipMap;
use mimalloc::MiMalloc;

use skipdex_crossbeam::EpochSkipList;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const OPS_PER_THREAD: u64 = 10_000;
const THREAD_COUNTS: [u64; 4] = [1, 2, 4, 8];

fn key(i: u64) -> [u8; 8] {
    i.to_be_bytes()
}

// ============================================================================
// Insert-only
// ============================================================================

fn bench_skipdex_insert(thread_count: u64, ops_per_thread: u64) {
    let list: Arc<EpochSkipList<u64>> = Arc::new(EpochSkipList::new());

    let handles: Vec<_> = (0..thread_count)
        .map(|t| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                let base = t * ops_per_thread;
                for i in 0..ops_per_thread {
                    list.set(key(base + i), i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn bench_crossbeam_insert(thread_count: u64, ops_per_thread: u64) {
    let map: Arc<SkipMap<[u8; 8], u64>> = Arc::new(SkipMap::new());

    let handles: Vec<_> = (0..thread_count)
        .map(|t| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                let base = t * ops_per_thread;
                for i in 0..ops_per_thread {
                    map.insert(key(base + i), i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

// ============================================================================
// Lookups against a prepopulated list
// ============================================================================

fn bench_skipdex_get(list: &Arc<EpochSkipList<u64>>, thread_count: u64, ops_per_thread: u64) {
    let handles: Vec<_> = (0..thread_count)
        .map(|t| {
            let list = Arc::clone(list);
            thread::spawn(move || {
                let mut rng = fastrand::Rng::with_seed(t);
                for _ in 0..ops_per_thread {
                    black_box(list.get(key(rng.u64(0..ops_per_thread))));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn bench_crossbeam_get(map: &Arc<SkipMap<[u8; 8], u64>>, thread_count: u64, ops_per_thread: u64) {
    let handles: Vec<_> = (0..thread_count)
        .map(|t| {
            let map = Arc::clone(map);
            thread::spawn(move || {
                let mut rng = fastrand::Rng::with_seed(t);
                for _ in 0..ops_per_thread {
                    black_box(map.get(&key(rng.u64(0..ops_per_thread))));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

// ============================================================================
// Mixed set/remove (50% each)
// ============================================================================

fn bench_skipdex_mixed(thread_count: u64, ops_per_thread: u64) {
    let list: Arc<EpochSkipList<u64>> = Arc::new(EpochSkipList::new());
    for i in 0..thread_count * ops_per_thread / 2 {
        list.set(key(i), i);
    }

    let handles: Vec<_> = (0..thread_count)
        .map(|t| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                let base = t * ops_per_thread;
                for i in 0..ops_per_thread {
                    if i % 2 == 0 {
                        list.set(key(base + i + 1_000_000), i);
                    } else {
                        list.remove(key(i / 2));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn bench_crossbeam_mixed(thread_count: u64, ops_per_thread: u64) {
    let map: Arc<SkipMap<[u8; 8], u64>> = Arc::new(SkipMap::new());
    for i in 0..thread_count * ops_per_thread / 2 {
        map.insert(key(i), i);
    }

    let handles: Vec<_> = (0..thread_count)
        .map(|t| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                let base = t * ops_per_thread;
                for i in 0..ops_per_thread {
                    if i % 2 == 0 {
                        map.insert(key(base + i + 1_000_000), i);
                    } else {
                        map.remove(&key(i / 2));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

// ============================================================================
// Criterion benchmark groups
// ============================================================================

fn insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for threads in THREAD_COUNTS {
        group.bench_with_input(BenchmarkId::new("skipdex", threads), &threads, |b, &threads| {
            b.iter(|| bench_skipdex_insert(black_box(threads), black_box(OPS_PER_THREAD)))
        });

        group.bench_with_input(BenchmarkId::new("crossbeam", threads), &threads, |b, &threads| {
            b.iter(|| bench_crossbeam_insert(black_box(threads), black_box(OPS_PER_THREAD)))
        });
    }

    group.finish();
}

fn get_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    let list: Arc<EpochSkipList<u64>> = Arc::new(EpochSkipList::new());
    let map: Arc<SkipMap<[u8; 8], u64>> = Arc::new(SkipMap::new());
    for i in 0..OPS_PER_THREAD {
        list.set(key(i), i);
        map.insert(key(i), i);
    }

    for threads in THREAD_COUNTS {
        group.bench_with_input(BenchmarkId::new("skipdex", threads), &threads, |b, &threads| {
            b.iter(|| bench_skipdex_get(&list, black_box(threads), black_box(OPS_PER_THREAD)))
        });

        group.bench_with_input(BenchmarkId::new("crossbeam", threads), &threads, |b, &threads| {
            b.iter(|| bench_crossbeam_get(&map, black_box(threads), black_box(OPS_PER_THREAD)))
        });
    }

    group.finish();
}

fn mixed_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");

    for threads in THREAD_COUNTS {
        group.bench_with_input(BenchmarkId::new("skipdex", threads), &threads, |b, &threads| {
            b.iter(|| bench_skipdex_mixed(black_box(threads), black_box(OPS_PER_THREAD)))
        });

        group.bench_with_input(BenchmarkId::new("crossbeam", threads), &threads, |b, &threads| {
            b.iter(|| bench_crossbeam_mixed(black_box(threads), black_box(OPS_PER_THREAD)))
        });
    }

    group.finish();
}

fn iterate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    let list: EpochSkipList<u64> = EpochSkipList::new();
    let map: SkipMap<[u8; 8], u64> = SkipMap::new();
    for i in 0..OPS_PER_THREAD {
        list.set(key(i), i);
        map.insert(key(i), i);
    }

    group.bench_function("skipdex", |b| {
        b.iter(|| list.iter().map(|e| *e.value()).sum::<u64>())
    });
    group.bench_function("crossbeam", |b| {
        b.iter(|| map.iter().map(|e| *e.value()).sum::<u64>())
    });

    group.finish();
}

criterion_group!(
    benches,
    insert_benchmark,
    get_benchmark,
    mixed_benchmark,
    iterate_benchmark
);
criterion_main!(benches);
