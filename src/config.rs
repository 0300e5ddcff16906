//! Cache configuration.
//!
//! # Example
//!
//! ```
//! use fancy_cache::config::LruCacheConfig;
//! use fancy_cache::LruCache;
//!
//! let config = LruCacheConfig::new(1024, 10 * 1024 * 1024).unwrap();
//! let cache: LruCache<String, Vec<u8>> = LruCache::new(config);
//! ```

pub mod lru;

pub use lru::{CacheConfigError, LruCacheConfig};
