//! Cache item storage.
//!
//! Every key admitted to the cache owns exactly one [`CacheItem`]: the payload,
//! its byte size, and the timestamp at which it was inserted. The key itself
//! lives only in the cache's index map (see [`crate::lru`]) and in the history
//! deque; it is never duplicated inside the item.

extern crate alloc;

use core::fmt;

/// A single cached value together with its size and insertion time.
///
/// `size` is fixed at construction and never recomputed, which keeps
/// `LruCore::current_size` a cheap running counter rather than a sum over
/// every entry.
pub struct CacheItem<V> {
    /// The cached payload.
    pub value: V,
    /// Size in bytes, as reported by the caller at insertion time.
    pub size: u64,
    /// Timestamp at which this item was inserted.
    pub timestamp: u64,
}

impl<V> CacheItem<V> {
    /// Creates a new item, stamping it with the current time.
    #[inline]
    pub fn new(value: V, size: u64) -> Self {
        Self {
            value,
            size,
            timestamp: Self::now_nanos(),
        }
    }

    /// Current time in nanoseconds.
    ///
    /// With the `std` feature enabled, this is nanoseconds since the UNIX
    /// epoch. `no_std` builds have no portable clock, so the timestamp is a
    /// monotonically increasing counter instead; it is never used for
    /// eviction decisions, only diagnostics, so the distinction is invisible
    /// to callers.
    #[cfg(feature = "std")]
    fn now_nanos() -> u64 {
        extern crate std;
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    #[cfg(not(feature = "std"))]
    fn now_nanos() -> u64 {
        use core::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }
}

impl<V: Clone> Clone for CacheItem<V> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            size: self.size,
            timestamp: self.timestamp,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for CacheItem<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheItem")
            .field("value", &self.value)
            .field("size", &self.size)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
