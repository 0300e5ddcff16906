//! Request-line parsing and the cache-key fingerprint derived from it.

use crate::config::cacheable;

/// The fingerprint extracted from a client's request line.
///
/// `url` is the cache key. `raw_line` is forwarded to the origin verbatim,
/// so the other fields exist purely to drive routing and cacheability
/// decisions, never to rebuild the line that gets sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// HTTP verb, e.g. `GET`.
    pub verb: String,
    /// The absolute URL as written by the client; the cache key.
    pub url: String,
    /// URL scheme (`http` or `https`).
    pub scheme: String,
    /// Origin host.
    pub host: String,
    /// Origin port.
    pub port: u16,
    /// URL path, including any query string.
    pub path: String,
    /// The original request line, without its trailing line ending.
    pub raw_line: String,
}

/// Hard bound on how many bytes are read while looking for the request
/// line's terminating newline, to avoid buffering an unbounded amount of
/// data from a client that never sends one.
const MAX_REQUEST_LINE_LEN: usize = 8192;

impl RequestLine {
    /// Parses the first line of an HTTP request, as sent in absolute form by
    /// a client talking to a proxy: `GET http://host[:port]/path HTTP/1.x`.
    ///
    /// Returns `None` if the line doesn't carry a verb, a URL, and an HTTP
    /// version token, or if the URL can't be decomposed into scheme/host/path
    /// by either the structured or the fallback parser.
    pub fn parse(raw_line: &str) -> Option<Self> {
        let raw_line = raw_line.trim_end_matches(['\r', '\n']);
        let mut fields = raw_line.split_whitespace();
        let verb = fields.next()?.to_string();
        let url = fields.next()?.to_string();
        fields.next()?; // HTTP version token; required to be present, never used.

        let (scheme, host, port, path) = Self::parse_url(&url)?;

        Some(RequestLine {
            verb,
            url,
            scheme,
            host,
            port,
            path,
            raw_line: raw_line.to_string(),
        })
    }

    /// Whether this request may be served from, or written to, the cache.
    pub fn is_cacheable(&self) -> bool {
        cacheable(&self.verb, Some(&self.path))
    }

    fn parse_url(url: &str) -> Option<(String, String, u16, String)> {
        if let Ok(parsed) = url::Url::parse(url) {
            let scheme = parsed.scheme();
            if scheme == "http" || scheme == "https" {
                let scheme = scheme.to_string();
                let host = parsed.host_str()?.to_string();
                let port = parsed.port_or_known_default()?;
                let mut path = parsed.path().to_string();
                if let Some(query) = parsed.query() {
                    path.push('?');
                    path.push_str(query);
                }
                return Some((scheme, host, port, path));
            }
        }
        Self::parse_url_fallback(url)
    }

    /// Manual fallback for URLs the structured parser rejects:
    /// `scheme://host[:port]/path`, with scheme restricted to http/https and
    /// a default port per scheme when none is given.
    fn parse_url_fallback(url: &str) -> Option<(String, String, u16, String)> {
        let (scheme, rest) = url.split_once("://")?;
        if scheme != "http" && scheme != "https" {
            return None;
        }
        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, format!("/{path}")),
            None => (rest, String::from("/")),
        };
        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => (host.to_string(), port.parse().ok()?),
            None => (
                authority.to_string(),
                if scheme == "https" { 443 } else { 80 },
            ),
        };
        Some((scheme.to_string(), host, port, path))
    }
}

/// Reads a single request line, byte by byte, stopping at `\n` or EOF.
///
/// Reading one byte at a time (rather than through a `BufReader`) is
/// deliberate: anything buffered past the request line would belong to the
/// relay, not the parser, and a `BufReader` would swallow it.
pub fn read_request_line<R: std::io::Read>(reader: &mut R) -> Option<String> {
    let mut raw = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return None,
            Ok(_) => {
                raw.push(byte[0]);
                if byte[0] == b'\n' {
                    break;
                }
                if raw.len() > MAX_REQUEST_LINE_LEN {
                    return None;
                }
            }
            Err(_) => return None,
        }
    }
    String::from_utf8(raw).ok()
}
