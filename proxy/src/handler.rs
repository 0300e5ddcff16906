//! Per-connection request handler: parse, cache lookup, full-duplex relay.
//!
//! One call to [`handle_connection`] carries a single client connection from
//! its first byte to socket close. It never returns an error: every failure
//! path logs and tears down both sockets, matching the source's "local
//! recovery is the default" policy (see the crate-level error taxonomy).

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::thread;

use fancy_cache::LruCache;
use tracing::{debug, error, info};

use crate::config::{ProxyConfig, RELAY_BUFFER_SIZE};
use crate::request::{read_request_line, RequestLine};

/// Handles one accepted connection end-to-end.
///
/// Reads the request line, rejects anything but `GET`, serves a cache hit
/// directly, or else connects to the origin and relays bytes in both
/// directions until either side closes.
pub fn handle_connection(
    mut source: TcpStream,
    config: &ProxyConfig,
    cache: &LruCache<String, Vec<u8>>,
) {
    let Some(raw) = read_request_line(&mut source) else {
        debug!("malformed or empty request line, closing connection");
        let _ = source.shutdown(Shutdown::Both);
        return;
    };

    let Some(request) = RequestLine::parse(&raw) else {
        debug!("unparseable request line, closing connection: {raw:?}");
        let _ = source.shutdown(Shutdown::Both);
        return;
    };

    if request.verb != "GET" {
        debug!(
            "dropping unsupported verb {} for {}",
            request.verb, request.url
        );
        let _ = source.shutdown(Shutdown::Both);
        return;
    }

    if config.cached {
        if let Some(cached) = cache.get(&request.url) {
            if request.is_cacheable() {
                match write_all_flush(&mut source, &cached) {
                    Ok(()) => info!("cache hit: {}", request.url),
                    Err(e) => error!("failed to write cached response for {}: {e}", request.url),
                }
                let _ = source.shutdown(Shutdown::Both);
                return;
            }
        }
    }

    let target = match TcpStream::connect((request.host.as_str(), request.port)) {
        Ok(stream) => stream,
        Err(e) => {
            error!(
                "failed to connect to origin {}:{}: {e}",
                request.host, request.port
            );
            let _ = source.shutdown(Shutdown::Both);
            return;
        }
    };

    relay(source, target, &request, config, cache);
}

fn write_all_flush(stream: &mut TcpStream, data: &[u8]) -> std::io::Result<()> {
    stream.write_all(data)?;
    stream.flush()
}

/// Forwards the original request line to the origin, then shuttles bytes in
/// both directions until either side hits EOF, finally attempting a cache
/// `put` of whatever the origin sent back.
fn relay(
    mut source: TcpStream,
    mut target: TcpStream,
    request: &RequestLine,
    config: &ProxyConfig,
    cache: &LruCache<String, Vec<u8>>,
) {
    let mut forward_line = request.raw_line.clone();
    forward_line.push_str("\r\n");
    if let Err(e) = write_all_flush(&mut target, forward_line.as_bytes()) {
        error!("failed to forward request line to {}: {e}", request.host);
        let _ = source.shutdown(Shutdown::Both);
        let _ = target.shutdown(Shutdown::Both);
        return;
    }

    // Blocking I/O has no single-thread select over two sockets, so the
    // source-to-target leg runs on its own thread; this thread carries the
    // target-to-source leg and owns the response accumulator, since that's
    // the side the cache cares about.
    let upstream = match (source.try_clone(), target.try_clone()) {
        (Ok(src), Ok(dst)) => Some(spawn_upstream_relay(src, dst, &request.host)),
        (Err(e), _) | (_, Err(e)) => {
            error!("failed to clone sockets for relay: {e}");
            None
        }
    };

    let mut response = Vec::new();
    let mut buf = [0u8; RELAY_BUFFER_SIZE];
    loop {
        match target.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                response.extend_from_slice(&buf[..n]);
                if let Err(e) = write_all_flush(&mut source, &buf[..n]) {
                    debug!("write to source failed, ending relay: {e}");
                    break;
                }
            }
            Err(e) => {
                debug!("read from target failed, ending relay: {e}");
                break;
            }
        }
    }

    let _ = source.shutdown(Shutdown::Both);
    let _ = target.shutdown(Shutdown::Both);
    if let Some(handle) = upstream {
        let _ = handle.join();
    }

    if config.cached && request.is_cacheable() {
        let inserted = cache.put(request.url.clone(), response);
        debug!("cache put for {}: accepted={inserted}", request.url);
    }
}

fn spawn_upstream_relay(
    mut src: TcpStream,
    mut dst: TcpStream,
    host: &str,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name(format!("proxy-relay-{host}"))
        .spawn(move || {
            let mut buf = [0u8; RELAY_BUFFER_SIZE];
            loop {
                match src.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if write_all_flush(&mut dst, &buf[..n]).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = dst.shutdown(Shutdown::Both);
        })
        .expect("failed to spawn relay thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fancy_cache::LruCacheConfig;
    use std::net::TcpListener;
    use std::thread;

    fn make_cache(max_item_size: u64, max_total_size: u64) -> LruCache<String, Vec<u8>> {
        LruCache::new(LruCacheConfig::new(max_item_size, max_total_size).unwrap())
    }

    fn spawn_origin(response: &'static [u8]) -> (String, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request_line = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                stream.read_exact(&mut byte).unwrap();
                request_line.push(byte[0]);
                if byte[0] == b'\n' {
                    break;
                }
            }
            stream.write_all(response).unwrap();
            stream.shutdown(Shutdown::Write).unwrap();
            request_line
        });
        (addr.to_string(), handle)
    }

    #[test]
    fn cache_miss_relays_and_populates_cache() {
        let (addr, origin) = spawn_origin(b"HTTP/1.1 200 OK\r\n\r\nhello");
        let cache = make_cache(1000, 10_000);
        let config = ProxyConfig::new(0, true, false);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let proxy_addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(proxy_addr).unwrap();
            let request = format!("GET http://{addr}/a.html HTTP/1.1\r\n");
            stream.write_all(request.as_bytes()).unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).unwrap();
            response
        });

        let (server_side, _) = listener.accept().unwrap();
        handle_connection(server_side, &config, &cache);

        let client_response = client.join().unwrap();
        assert_eq!(client_response, b"HTTP/1.1 200 OK\r\n\r\nhello");
        origin.join().unwrap();

        let url = format!("http://{addr}/a.html");
        assert_eq!(
            cache.get(&url),
            Some(b"HTTP/1.1 200 OK\r\n\r\nhello".to_vec())
        );
    }

    #[test]
    fn cache_hit_never_reaches_origin() {
        let cache = make_cache(1000, 10_000);
        cache.put(
            "http://example.com/a.html".to_string(),
            b"cached-body".to_vec(),
        );
        let config = ProxyConfig::new(0, true, false);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let proxy_addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(proxy_addr).unwrap();
            stream
                .write_all(b"GET http://example.com/a.html HTTP/1.1\r\n")
                .unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).unwrap();
            response
        });

        let (server_side, _) = listener.accept().unwrap();
        handle_connection(server_side, &config, &cache);

        assert_eq!(client.join().unwrap(), b"cached-body");
    }

    #[test]
    fn non_get_verb_closes_without_response() {
        let cache = make_cache(1000, 10_000);
        let config = ProxyConfig::new(0, true, false);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let proxy_addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(proxy_addr).unwrap();
            stream
                .write_all(b"POST http://example.com/a.html HTTP/1.1\r\n")
                .unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).unwrap();
            response
        });

        let (server_side, _) = listener.accept().unwrap();
        handle_connection(server_side, &config, &cache);

        assert!(client.join().unwrap().is_empty());
    }

    #[test]
    fn non_cacheable_path_is_relayed_but_not_cached() {
        let (addr, origin) = spawn_origin(b"HTTP/1.1 200 OK\r\n\r\nbody");
        let cache = make_cache(1000, 10_000);
        let config = ProxyConfig::new(0, true, false);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let proxy_addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(proxy_addr).unwrap();
            let request = format!("GET http://{addr}/x.php HTTP/1.1\r\n");
            stream.write_all(request.as_bytes()).unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).unwrap();
            response
        });

        let (server_side, _) = listener.accept().unwrap();
        handle_connection(server_side, &config, &cache);

        assert_eq!(client.join().unwrap(), b"HTTP/1.1 200 OK\r\n\r\nbody");
        origin.join().unwrap();
        assert_eq!(cache.stats().item_count, 0);
    }
}
