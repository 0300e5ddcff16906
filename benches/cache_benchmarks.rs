use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fancy_cache::config::LruCacheConfig;
use fancy_cache::LruCache;

const CACHE_BYTES: u64 = 1_000 * 64;
const NUM_OPERATIONS: usize = 10_000;

fn make_cache() -> LruCache<usize, Vec<u8>> {
    let config = LruCacheConfig::new(4096, CACHE_BYTES).unwrap();
    LruCache::new(config)
}

fn bench_put(c: &mut Criterion) {
    c.bench_function("lru_put", |b| {
        let cache = make_cache();
        let mut i = 0usize;
        b.iter(|| {
            cache.put(black_box(i % CACHE_BYTES as usize), black_box(vec![0u8; 32]));
            i += 1;
        });
    });
}

fn bench_get_hit(c: &mut Criterion) {
    let cache = make_cache();
    for i in 0..64 {
        cache.put(i, vec![0u8; 32]);
    }
    c.bench_function("lru_get_hit", |b| {
        let mut i = 0usize;
        b.iter(|| {
            black_box(cache.get(&(i % 64)));
            i += 1;
        });
    });
}

fn bench_get_miss(c: &mut Criterion) {
    let cache = make_cache();
    c.bench_function("lru_get_miss", |b| {
        let mut i = 0usize;
        b.iter(|| {
            black_box(cache.get(&(i + NUM_OPERATIONS)));
            i += 1;
        });
    });
}

criterion_group!(benches, bench_put, bench_get_hit, bench_get_miss);
criterion_main!(benches);
