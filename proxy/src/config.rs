//! Process configuration for the caching proxy.

use std::time::Duration;

/// Substrings whose presence anywhere in a request path make it non-cacheable.
///
/// The second entry is the bare substring `"jspa"`, not `".jspa"` — kept
/// exactly as specified rather than normalized, since the substring match
/// below treats every entry the same way regardless of a leading dot.
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".asp", ".aspx", ".jsp", "jspa", ".jspx", ".pl", ".cgi", ".action", ".do", ".php",
];

/// Bytes read per relay iteration.
pub const RELAY_BUFFER_SIZE: usize = 4096;

/// Default port the proxy listens on.
pub const DEFAULT_PORT: u16 = 8992;

/// Default number of worker threads.
pub const DEFAULT_WORKER_COUNT: usize = 50;

/// Default per-item cache size bound, in bytes.
pub const DEFAULT_MAX_ITEM_SIZE: u64 = 10 * 1024 * 1024;

/// Default total cache size bound, in bytes.
pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 100 * 1024 * 1024;

/// Default relay timeout. Declared but not wired into socket operations by
/// default; see [`ProxyConfig::relay_timeout`].
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Parsed process configuration, built once at startup and handed by
/// reference to every subsystem that needs it.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Port to listen on.
    pub port: u16,
    /// Whether the LRU response cache is consulted and populated.
    pub cached: bool,
    /// Whether debug-level log lines are emitted.
    pub verbose: bool,
    /// Number of worker threads draining the connection queue.
    pub worker_count: usize,
    /// Per-item cache size bound, in bytes.
    pub max_item_size: u64,
    /// Total cache size bound, in bytes.
    pub max_total_size: u64,
    /// Not enforced on individual relay reads/writes by default; callers may
    /// wire it into `TcpStream::set_read_timeout`/`set_write_timeout`.
    pub relay_timeout: Duration,
}

impl ProxyConfig {
    /// Builds a config from the CLI surface, filling in the fixed defaults
    /// for everything not exposed as a flag.
    pub fn new(port: u16, cached: bool, verbose: bool) -> Self {
        ProxyConfig {
            port,
            cached,
            verbose,
            worker_count: DEFAULT_WORKER_COUNT,
            max_item_size: DEFAULT_MAX_ITEM_SIZE,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            relay_timeout: DEFAULT_RELAY_TIMEOUT,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, true, true)
    }
}

/// Whether a request for `path` with verb `verb` may be served from or
/// written to the cache.
///
/// The substring test is intentionally permissive: a path containing e.g.
/// `.php` anywhere, not just as a trailing extension, is non-cacheable.
pub fn cacheable(verb: &str, path: Option<&str>) -> bool {
    let Some(path) = path else {
        return false;
    };
    verb == "GET" && !EXCLUDED_EXTENSIONS.iter().any(|ext| path.contains(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_with_plain_path_is_cacheable() {
        assert!(cacheable("GET", Some("/a.html")));
    }

    #[test]
    fn non_get_is_never_cacheable() {
        assert!(!cacheable("POST", Some("/a.html")));
        assert!(!cacheable("HEAD", Some("/a.html")));
    }

    #[test]
    fn excluded_substring_anywhere_in_path_disables_caching() {
        assert!(!cacheable("GET", Some("/x.php")));
        assert!(!cacheable("GET", Some("/x.php?q=1")));
        assert!(!cacheable("GET", Some("/some.phparea/index.html")));
    }

    #[test]
    fn bare_jspa_substring_disables_caching() {
        assert!(!cacheable("GET", Some("/page.jspax")));
    }

    #[test]
    fn absent_path_is_never_cacheable() {
        assert!(!cacheable("GET", None));
    }
}
