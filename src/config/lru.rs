//! Configuration for the Least Recently Used (LRU) cache.

use core::fmt;

/// Returned by [`LruCacheConfig::new`] when the requested limits are
/// inconsistent.
///
/// This is the crate's only fallible construction path, so it is kept as a
/// small hand-rolled type rather than pulling in an error-derive crate: the
/// core cache library is `no_std` and has no other use for one. The `proxy`
/// binary that consumes this crate uses `thiserror`/`anyhow` for its own,
/// richer error surface (see its `main.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfigError {
    max_item_size: u64,
    max_total_size: u64,
}

impl fmt::Display for CacheConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_item_size ({}) must not exceed max_total_size ({})",
            self.max_item_size, self.max_total_size
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CacheConfigError {}

/// Configuration for an LRU (Least Recently Used) cache.
///
/// LRU evicts the least recently accessed items when the cache reaches
/// either of its two byte-size limits.
///
/// # Examples
///
/// ```
/// use fancy_cache::config::LruCacheConfig;
///
/// let config = LruCacheConfig::new(1024, 10 * 1024 * 1024).unwrap();
/// assert_eq!(config.max_item_size(), 1024);
///
/// assert!(LruCacheConfig::new(2_000_000, 1_000_000).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LruCacheConfig {
    pub(crate) max_item_size: u64,
    pub(crate) max_total_size: u64,
}

impl LruCacheConfig {
    /// Creates a new configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheConfigError`] if `max_item_size > max_total_size`: no
    /// item could ever be admitted under such a configuration.
    pub fn new(max_item_size: u64, max_total_size: u64) -> Result<Self, CacheConfigError> {
        if max_item_size > max_total_size {
            return Err(CacheConfigError {
                max_item_size,
                max_total_size,
            });
        }
        Ok(Self {
            max_item_size,
            max_total_size,
        })
    }

    /// The maximum size, in bytes, a single entry may occupy.
    pub fn max_item_size(&self) -> u64 {
        self.max_item_size
    }

    /// The maximum combined size, in bytes, of all entries.
    pub fn max_total_size(&self) -> u64 {
        self.max_total_size
    }
}
