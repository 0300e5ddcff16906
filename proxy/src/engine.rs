//! Accept loop, worker dispatch, and live-connection bookkeeping.

use std::collections::HashMap;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use fancy_cache::config::LruCacheConfig;
use fancy_cache::LruCache;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::handler;
use crate::worker_pool::WorkerPool;

type ClientId = u64;

/// Caching forward proxy: a single dispatcher loop backed by a worker pool
/// of per-connection handlers, all sharing one LRU response cache.
pub struct ProxyEngine {
    listener: TcpListener,
    config: Arc<ProxyConfig>,
    cache: Arc<LruCache<String, Vec<u8>>>,
    pool: WorkerPool,
    clients: Arc<Mutex<HashMap<ClientId, TcpStream>>>,
    next_client_id: AtomicU64,
    shutdown: Arc<AtomicBool>,
}

impl ProxyEngine {
    /// Binds the listening socket and builds the cache and worker pool.
    ///
    /// Fails if the cache's size limits are inconsistent or the port cannot
    /// be bound.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let listener =
            TcpListener::bind(("0.0.0.0", config.port)).map_err(|source| ProxyError::Bind {
                port: config.port,
                source,
            })?;

        let cache_config = LruCacheConfig::new(config.max_item_size, config.max_total_size)?;
        let cache = Arc::new(LruCache::new(cache_config));
        let pool = WorkerPool::new(config.worker_count);

        Ok(ProxyEngine {
            listener,
            config: Arc::new(config),
            cache,
            pool,
            clients: Arc::new(Mutex::new(HashMap::new())),
            next_client_id: AtomicU64::new(0),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the shared flag the dispatcher checks after each `accept()`
    /// wakes up. Register it with `signal_hook::flag::register` (or flip it
    /// by hand in tests) to request a graceful shutdown; the loop notices
    /// it on the next incoming connection, not mid-`accept()`.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// A snapshot of the cache's hit/miss/size counters.
    pub fn cache_stats(&self) -> fancy_cache::LruStats {
        self.cache.stats()
    }

    /// Runs the accept loop until the shutdown flag from [`Self::shutdown_flag`]
    /// is set, then shuts down cooperatively: every tracked client socket is
    /// closed and the worker pool drains its queue before this returns.
    pub fn run(self) {
        info!("proxy listening on port {}", self.config.port);
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    error!("accept failed: {e}");
                    continue;
                }
            };
            self.dispatch(stream);
        }
        self.shutdown();
    }

    fn dispatch(&self, stream: TcpStream) {
        let client_id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        match stream.try_clone() {
            Ok(shutdown_handle) => {
                self.clients.lock().insert(client_id, shutdown_handle);
            }
            Err(e) => {
                error!("failed to register client {client_id}: {e}");
            }
        }

        let config = Arc::clone(&self.config);
        let cache = Arc::clone(&self.cache);
        let clients = Arc::clone(&self.clients);
        self.pool.schedule(move || {
            handler::handle_connection(stream, &config, &cache);
            clients.lock().remove(&client_id);
        });
    }

    fn shutdown(self) {
        let tracked = {
            let mut clients = self.clients.lock();
            let tracked = clients.len();
            for (_, stream) in clients.drain() {
                let _ = stream.shutdown(Shutdown::Both);
            }
            tracked
        };
        info!("shutting down: closed {tracked} tracked client sockets");
        self.pool.shutdown();
    }
}

impl std::fmt::Debug for ProxyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(port: u16) -> ProxyConfig {
        let mut config = ProxyConfig::new(port, true, false);
        config.worker_count = 2;
        config
    }

    #[test]
    fn new_fails_when_port_already_bound() {
        let holder = TcpListener::bind(("0.0.0.0", 0)).unwrap();
        let port = holder.local_addr().unwrap().port();

        let err = ProxyEngine::new(make_config(port)).unwrap_err();
        match err {
            ProxyError::Bind { port: p, .. } => assert_eq!(p, port),
            other => panic!("expected ProxyError::Bind, got {other:?}"),
        }
    }

    #[test]
    fn new_fails_when_cache_limits_are_inconsistent() {
        let mut config = make_config(0);
        config.max_item_size = 2000;
        config.max_total_size = 1000;

        let err = ProxyEngine::new(config).unwrap_err();
        assert!(
            matches!(err, ProxyError::CacheConfig(_)),
            "expected ProxyError::CacheConfig, got {err:?}"
        );
    }

    #[test]
    fn dispatch_tracks_and_shutdown_drains_live_clients() {
        let engine = ProxyEngine::new(make_config(0)).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        // Keep each client side alive so its peer (the server-side stream
        // handed to `dispatch`) stays connected and registered until the
        // engine shuts it down; the handler thread blocks reading a request
        // line from it that never arrives.
        let mut held_clients = Vec::new();
        for _ in 0..2 {
            let client = TcpStream::connect(addr).unwrap();
            let (server_side, _) = listener.accept().unwrap();
            engine.dispatch(server_side);
            held_clients.push(client);
        }

        assert_eq!(engine.clients.lock().len(), 2);

        // `shutdown` closes every tracked socket, which unblocks the
        // handler threads' pending reads with an EOF, so `WorkerPool::shutdown`
        // inside it can join without the test hanging.
        engine.shutdown();
    }
}
