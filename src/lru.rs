//! Size-bounded, single-mutex Least Recently Used (LRU) cache.
//!
//! # How it works
//!
//! The cache is a key→[`CacheItem`] index plus a [`FancyDeque`] of keys
//! ("history") ordered by recency, MRU at the head. A `get` that hits bubbles
//! the key to the head; a `put` pushes new keys to the head and evicts from
//! the tail when either the per-item or the total byte budget would be
//! exceeded.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         LruCore                              │
//! │                                                               │
//! │  HashMap<K, CacheItem<V>>      FancyDeque<K> (history)        │
//! │  ┌──────────────┐             ┌───────────────────────────┐   │
//! │  │ "a.html" ───▶ item          │ MRU ◀──▶ ... ◀──▶ LRU    │   │
//! │  │ "b.html" ───▶ item          │  ▲                  │     │   │
//! │  └──────────────┘             │  │                  ▼     │   │
//! │                                │ head             tail     │   │
//! │                                └───────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Dual-limit capacity
//!
//! - `max_item_size` — a single entry larger than this is never admitted.
//! - `max_total_size` — the sum of all entry sizes never exceeds this; the
//!   cache evicts from the LRU end until an incoming item fits, and refuses
//!   the insertion (returning `false`, leaving prior entries intact) if the
//!   history is exhausted before the budget is satisfied.
//!
//! # Thread safety
//!
//! Unlike the teacher's segmented `ConcurrentLruCache`, there is exactly one
//! lock here — every operation acquires the same [`parking_lot::Mutex`]
//! around the whole cache. No I/O happens while the lock is held, only
//! bookkeeping.
//!
//! # Example
//!
//! ```
//! use fancy_cache::{LruCache, LruCacheConfig};
//!
//! let config = LruCacheConfig::new(16, u64::MAX).unwrap();
//! let cache: LruCache<String, Vec<u8>> = LruCache::new(config);
//!
//! cache.put("a.html".to_string(), b"hello".to_vec());
//! assert_eq!(cache.get(&"a.html".to_string()), Some(b"hello".to_vec()));
//!
//! let stats = cache.stats();
//! assert_eq!(stats.item_count, 1);
//! ```

extern crate alloc;

use crate::config::LruCacheConfig;
use crate::entry::CacheItem;
use crate::list::FancyDeque;
use core::hash::Hash;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
extern crate std;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

#[cfg(feature = "concurrent")]
use parking_lot::Mutex;

/// A snapshot of cache counters, as returned by [`LruCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LruStats {
    /// Number of `get` calls that found the key present.
    pub success_hits: u64,
    /// Total number of `get` calls, hit or miss.
    pub total_hits: u64,
    /// Number of entries currently cached.
    pub item_count: usize,
    /// Sum of the byte sizes of all currently cached entries.
    pub total_bytes: u64,
}

/// Unsynchronized cache core shared by [`LruCache`] and its tests.
///
/// All algorithm logic lives here; [`LruCache`] is a thin `Mutex` wrapper
/// around it, mirroring the teacher's split between `LruSegment` (algorithm)
/// and the synchronized cache type built on top of it.
pub(crate) struct LruCore<K, V> {
    config: LruCacheConfig,
    index: HashMap<K, CacheItem<V>>,
    history: FancyDeque<K>,
    current_size: u64,
    success_hits: u64,
    total_hits: u64,
}

impl<K: Hash + Eq + Clone, V> LruCore<K, V> {
    fn new(config: LruCacheConfig) -> Self {
        LruCore {
            config,
            index: HashMap::new(),
            history: FancyDeque::new(),
            current_size: 0,
            success_hits: 0,
            total_hits: 0,
        }
    }

    fn get(&mut self, key: &K) -> Option<&V>
    where
        V: Clone,
    {
        self.total_hits += 1;
        if self.index.contains_key(key) {
            self.success_hits += 1;
            self.history.bubble(key);
            self.index.get(key).map(|item| &item.value)
        } else {
            None
        }
    }

    fn put(&mut self, key: K, value: V, bsize: u64) -> bool {
        if bsize == 0 || bsize > self.config.max_item_size {
            return false;
        }

        if let Some(old) = self.index.remove(&key) {
            self.current_size = self.current_size.saturating_sub(old.size);
            self.history.remove(&key);
        }

        if self.current_size + bsize > self.config.max_total_size {
            let bound = self.history.len();
            for _ in 0..bound {
                if self.current_size + bsize <= self.config.max_total_size {
                    break;
                }
                let Some(evicted_key) = self.history.pop_tail() else {
                    break;
                };
                if let Some(evicted) = self.index.remove(&evicted_key) {
                    self.current_size = self.current_size.saturating_sub(evicted.size);
                }
            }
            if self.current_size + bsize > self.config.max_total_size {
                return false;
            }
        }

        self.index.insert(key.clone(), CacheItem::new(value, bsize));
        self.history.push_head(key);
        self.current_size += bsize;
        true
    }

    fn stats(&self) -> LruStats {
        LruStats {
            success_hits: self.success_hits,
            total_hits: self.total_hits,
            item_count: self.index.len(),
            total_bytes: self.current_size,
        }
    }
}

/// A size-bounded LRU cache guarded by a single mutex.
///
/// See the module documentation for the eviction and concurrency model.
pub struct LruCache<K, V> {
    #[cfg(feature = "concurrent")]
    core: Mutex<LruCore<K, V>>,
    #[cfg(not(feature = "concurrent"))]
    core: core::cell::RefCell<LruCore<K, V>>,
}

// SAFETY: `core` is always accessed through its lock; no raw pointers escape
// `LruCache` itself.
#[cfg(feature = "concurrent")]
unsafe impl<K: Send, V: Send> Send for LruCache<K, V> {}
#[cfg(feature = "concurrent")]
unsafe impl<K: Send, V: Send> Sync for LruCache<K, V> {}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Creates a new cache from a validated [`LruCacheConfig`].
    pub fn new(config: LruCacheConfig) -> Self {
        #[cfg(feature = "concurrent")]
        {
            LruCache {
                core: Mutex::new(LruCore::new(config)),
            }
        }
        #[cfg(not(feature = "concurrent"))]
        {
            LruCache {
                core: core::cell::RefCell::new(LruCore::new(config)),
            }
        }
    }

    /// Looks up `key`, bubbling it to most-recently-used on a hit.
    ///
    /// Always records a hit/miss in the stats counters, even when `key` is
    /// absent.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        #[cfg(feature = "concurrent")]
        {
            self.core.lock().get(key).cloned()
        }
        #[cfg(not(feature = "concurrent"))]
        {
            self.core.borrow_mut().get(key).cloned()
        }
    }

    /// Inserts `value` under `key`, sizing it via `value.as_ref().len()`.
    ///
    /// Returns `false` without mutating the cache if the item exceeds
    /// `max_item_size`, or if eviction from the LRU end cannot free enough
    /// room to satisfy `max_total_size`.
    pub fn put(&self, key: K, value: V) -> bool
    where
        V: AsRef<[u8]>,
    {
        let bsize = value.as_ref().len() as u64;
        #[cfg(feature = "concurrent")]
        {
            self.core.lock().put(key, value, bsize)
        }
        #[cfg(not(feature = "concurrent"))]
        {
            self.core.borrow_mut().put(key, value, bsize)
        }
    }

    /// Returns a snapshot of the cache's hit/miss/size counters.
    pub fn stats(&self) -> LruStats {
        #[cfg(feature = "concurrent")]
        {
            self.core.lock().stats()
        }
        #[cfg(not(feature = "concurrent"))]
        {
            self.core.borrow().stats()
        }
    }
}

impl<K, V> core::fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruCache").finish_non_exhaustive()
    }
}
