//! Response assembly.
//!
//! # Responsibilities
//! - Build the caller-visible response from a cache entry (hit or miss)
//! - Apply the cache-control negotiation (override vs respect-origin)
//! - Set the diagnostic cache-status header
//! - Suppress the body for HEAD requests
//!
//! # Design Decisions
//! - Entries are stored without the diagnostic header; it is stamped per
//!   response so a replayed entry can report HIT
//! - Hop-by-hop headers from the upstream leg are stripped; the body is
//!   buffered, so framing headers are recomputed by the server

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method, Response};

use crate::cache::{CacheEntry, CachePolicy};

/// Diagnostic cache-status header.
pub const X_CACHE: &str = "x-cache";

/// Headers that only applied to the upstream connection.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Whether the response was replayed from the store or fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Drop headers tied to the upstream transport leg.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Apply the cache-control negotiation to a miss response's headers.
///
/// Override mode rewrites `Cache-Control` and strips `Set-Cookie` so
/// session state never lands in a shared cache. Respect mode keeps the
/// origin's directive and only fills in the override when the origin
/// sent none.
pub fn apply_cache_policy(headers: &mut HeaderMap, policy: &CachePolicy) {
    let override_value = HeaderValue::from_str(&policy.cache_control_value())
        .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=0"));

    if !policy.respects_origin() {
        headers.insert(CACHE_CONTROL, override_value);
        headers.remove(SET_COOKIE);
    } else if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, override_value);
    }
}

/// Build the final response from an entry.
///
/// Used for both hits (entry from the store) and misses (entry freshly
/// assembled from the upstream response). The body is suppressed when
/// the inbound method was HEAD, whatever the cache status.
pub fn assemble(entry: &CacheEntry, status: CacheStatus, method: &Method) -> Response<Body> {
    let body = if *method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(entry.body.clone())
    };

    let mut response = Response::new(body);
    *response.status_mut() = entry.status;
    *response.headers_mut() = entry.headers.clone();
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static(status.as_str()));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, Method, StatusCode};
    use bytes::Bytes;

    use crate::cache::PolicyLimits;

    const LIMITS: PolicyLimits = PolicyLimits {
        default_ttl: 300,
        max_ttl: 86_400,
    };

    fn policy(query: Option<&str>) -> CachePolicy {
        CachePolicy::from_request(&Method::GET, &HeaderMap::new(), query, LIMITS)
    }

    #[test]
    fn override_mode_rewrites_cache_control_and_strips_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(SET_COOKIE, HeaderValue::from_static("session=abc"));

        apply_cache_policy(&mut headers, &policy(Some("ttl=60")));

        assert_eq!(
            headers.get(CACHE_CONTROL).unwrap(),
            "public, max-age=60, s-maxage=60"
        );
        assert!(headers.get(SET_COOKIE).is_none());
    }

    #[test]
    fn respect_mode_preserves_origin_cache_control() {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(SET_COOKIE, HeaderValue::from_static("session=abc"));

        apply_cache_policy(&mut headers, &policy(Some("respect=1")));

        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "no-store");
        assert!(headers.get(SET_COOKIE).is_some());
    }

    #[test]
    fn respect_mode_falls_back_when_origin_sent_nothing() {
        let mut headers = HeaderMap::new();

        apply_cache_policy(&mut headers, &policy(Some("respect=1&ttl=10")));

        assert_eq!(
            headers.get(CACHE_CONTROL).unwrap(),
            "public, max-age=10, s-maxage=10"
        );
    }

    #[test]
    fn hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("connection").is_none());
        assert!(headers.get("transfer-encoding").is_none());
        assert!(headers.get("content-type").is_some());
    }

    #[test]
    fn assemble_sets_diagnostic_header_and_replays_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        let entry = CacheEntry::new(StatusCode::OK, headers, Bytes::from_static(b"cached"));

        let response = assemble(&entry, CacheStatus::Hit, &Method::GET);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(X_CACHE).unwrap(), "HIT");
        assert_eq!(response.headers().get("content-type").unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn head_suppresses_the_body() {
        let entry = CacheEntry::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(b"data"));
        let response = assemble(&entry, CacheStatus::Miss, &Method::HEAD);
        assert_eq!(response.headers().get(X_CACHE).unwrap(), "MISS");

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }
}
