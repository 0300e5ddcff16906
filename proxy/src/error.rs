//! Errors surfaced by proxy construction and operation.

use thiserror::Error;

/// Top-level error type for the proxy binary.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The cache's size limits were inconsistent (`max_item_size > max_total_size`).
    #[error("invalid cache configuration: {0}")]
    CacheConfig(#[from] fancy_cache::config::CacheConfigError),

    /// Binding the listening socket failed.
    #[error("failed to bind port {port}")]
    Bind {
        /// The port that could not be bound.
        port: u16,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use fancy_cache::config::LruCacheConfig;
    use std::error::Error;

    #[test]
    fn cache_config_error_converts_via_from_and_formats() {
        let source = LruCacheConfig::new(2000, 1000).unwrap_err();
        let err: ProxyError = source.into();
        assert_eq!(
            err.to_string(),
            "invalid cache configuration: max_item_size (2000) must not exceed max_total_size (1000)"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn bind_error_formats_with_port_and_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err = ProxyError::Bind {
            port: 8992,
            source: io_err,
        };
        assert_eq!(err.to_string(), "failed to bind port 8992");
        assert!(err.source().is_some());
    }
}
