//! Cache key derivation.

use std::fmt;

use axum::http::header::HOST;
use axum::http::Request;

/// Normalized identifier for a cached response.
///
/// Derived from the full inbound request URL — the proxy's own host,
/// path and query, not the upstream URL — with the method pinned to GET.
/// HEAD and GET requests to the same inbound URL therefore share one
/// entry; other methods never produce a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for an inbound request.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let host = request
            .headers()
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| request.uri().authority().map(|a| a.as_str()))
            .unwrap_or("");

        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        // Method normalized to GET regardless of the inbound method.
        CacheKey(format!("GET http://{}{}", host, path_and_query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Method;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "proxy.local:8080")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn head_and_get_share_a_key() {
        let get = CacheKey::from_request(&request(Method::GET, "/https/example.com/a?x=1"));
        let head = CacheKey::from_request(&request(Method::HEAD, "/https/example.com/a?x=1"));
        assert_eq!(get, head);
    }

    #[test]
    fn query_string_differentiates_keys() {
        let plain = CacheKey::from_request(&request(Method::GET, "/https/example.com/a"));
        let with_query = CacheKey::from_request(&request(Method::GET, "/https/example.com/a?x=1"));
        assert_ne!(plain, with_query);
    }

    #[test]
    fn key_is_the_inbound_url_not_the_upstream_url() {
        let key = CacheKey::from_request(&request(Method::GET, "/https/example.com/a"));
        assert_eq!(key.as_str(), "GET http://proxy.local:8080/https/example.com/a");
    }
}
