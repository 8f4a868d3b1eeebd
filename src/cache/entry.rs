//! Cached response entries.

use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

/// A fully assembled upstream response captured for replay.
///
/// Entries are created from successful cacheable upstream responses with
/// the cache-control policy already applied, and stored without the
/// diagnostic cache-status header (the assembler adds it per response).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CacheEntry {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Shared-cache lifetime the entry declares about itself, in seconds.
    ///
    /// Reads the entry's own `Cache-Control` header: `s-maxage` wins over
    /// `max-age` (this is a shared cache). Returns `None` when caching is
    /// forbidden (`no-store`, `no-cache`, `private`) or no max-age is
    /// declared at all.
    pub fn declared_max_age(&self) -> Option<u64> {
        let value = self.headers.get(CACHE_CONTROL)?.to_str().ok()?;

        let mut max_age = None;
        let mut s_maxage = None;

        for directive in value.split(',') {
            let directive = directive.trim().to_ascii_lowercase();
            match directive.split_once('=') {
                None => {
                    if matches!(directive.as_str(), "no-store" | "no-cache" | "private") {
                        return None;
                    }
                }
                Some((name, raw)) => {
                    let secs = raw.trim().parse::<u64>().ok();
                    match name.trim() {
                        "max-age" => max_age = secs,
                        "s-maxage" => s_maxage = secs,
                        _ => {}
                    }
                }
            }
        }

        s_maxage.or(max_age)
    }
}
