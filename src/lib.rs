//! A size-bounded LRU cache and the embedded-index deque it is built on.
//!
//! # Modules
//!
//! - [`list`]: `FancyDeque`, a doubly linked list with an embedded value→node
//!   index giving O(1) `bubble`/`drown` in addition to the usual push/pop.
//! - [`entry`]: [`CacheItem`], the value/size/timestamp triple stored per key.
//! - [`config`]: [`LruCacheConfig`] and its validation error.
//! - [`lru`]: [`LruCache`] itself.
//!
//! # Example
//!
//! ```rust
//! use fancy_cache::LruCache;
//! use fancy_cache::config::LruCacheConfig;
//!
//! let config = LruCacheConfig::new(1024, 4096).unwrap();
//! let mut cache: LruCache<&str, Vec<u8>> = LruCache::new(config);
//!
//! cache.put("a", vec![1, 2, 3]);
//! cache.put("b", vec![4, 5, 6]);
//! cache.get(&"a");        // "a" becomes most recently used
//! assert!(cache.get(&"b").is_some());
//! ```
//!
//! ## Dual-limit capacity
//!
//! Admission is governed by two byte budgets rather than an entry count:
//! `max_item_size` bounds any single value, `max_total_size` bounds the sum
//! of all cached values. A `put` that cannot be satisfied even after
//! evicting the entire history is refused outright, leaving the cache
//! exactly as it was — the cache never sits transiently over budget.
//!
//! ## Concurrency
//!
//! With the `concurrent` feature (on by default), [`LruCache`] is guarded by
//! a single [`parking_lot::Mutex`] and is `Send + Sync`. Without it, the
//! cache is backed by a `RefCell` for `no_std` environments with no
//! synchronization primitive and a single owning thread.

#![no_std]

/// Doubly linked list with an embedded value→node index.
///
/// Internal infrastructure: exposes raw-pointer operations that require
/// careful invariant maintenance. Use [`LruCache`] instead of this directly.
pub(crate) mod list;

/// Per-entry storage: value, size, and insertion timestamp.
pub mod entry;

/// Cache configuration structures.
pub mod config;

/// Size-bounded Least Recently Used (LRU) cache implementation.
pub mod lru;

pub use config::LruCacheConfig;
pub use entry::CacheItem;
pub use lru::{LruCache, LruStats};
