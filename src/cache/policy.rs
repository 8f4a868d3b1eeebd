//! Cache policy evaluation.
//!
//! # Responsibilities
//! - Read the per-request cache controls (query params, bypass header)
//! - Decide read and write eligibility
//! - Resolve the effective TTL (default / clamp semantics)
//!
//! # Design Decisions
//! - Evaluated once per request, immutable afterwards
//! - Any authorization credential disables caching in both directions;
//!   credentialed responses must never be shared across requesters
//! - Bypass skips only the read: a bypassed but otherwise eligible
//!   response still populates the cache for later requests

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method, StatusCode};

/// Header that forces a cache bypass, equivalent to `no-cache=1`.
pub const BYPASS_HEADER: &str = "x-cache-bypass";

/// TTL bounds the evaluator works within, taken from the active config.
#[derive(Debug, Clone, Copy)]
pub struct PolicyLimits {
    /// Applied when the `ttl` parameter is absent or invalid.
    pub default_ttl: u32,
    /// Ceiling; larger requested values are clamped, not rejected.
    pub max_ttl: u32,
}

/// Per-request caching decision, computed once from the inbound request.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    bypass: bool,
    respect_origin: bool,
    ttl: u32,
    has_auth: bool,
    cacheable_method: bool,
}

impl CachePolicy {
    /// Evaluate the policy for an inbound request.
    pub fn from_request(
        method: &Method,
        headers: &HeaderMap,
        query: Option<&str>,
        limits: PolicyLimits,
    ) -> Self {
        let bypass_header = headers
            .get(BYPASS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "1")
            .unwrap_or(false);

        let bypass = bypass_header || query_param(query, "no-cache").as_deref() == Some("1");
        let respect_origin = query_param(query, "respect").as_deref() == Some("1");
        let ttl = resolve_ttl(query_param(query, "ttl").as_deref(), limits);

        Self {
            bypass,
            respect_origin,
            ttl,
            has_auth: headers.contains_key(AUTHORIZATION),
            cacheable_method: *method == Method::GET || *method == Method::HEAD,
        }
    }

    /// May this request be answered from the cache?
    pub fn read_eligible(&self) -> bool {
        !self.bypass && !self.has_auth && self.cacheable_method
    }

    /// May the upstream response be written to the cache?
    ///
    /// Bypass is deliberately absent here; see the module notes.
    pub fn write_eligible(&self, status: StatusCode) -> bool {
        !self.has_auth && self.cacheable_method && status.is_success()
    }

    /// Is the origin's own cache-control honored over the override?
    pub fn respects_origin(&self) -> bool {
        self.respect_origin
    }

    /// Effective TTL in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// The `Cache-Control` value applied under override mode.
    pub fn cache_control_value(&self) -> String {
        format!("public, max-age={}, s-maxage={}", self.ttl, self.ttl)
    }
}

/// Resolve the requested TTL against the configured bounds.
///
/// Absent, non-numeric and negative values fall back to the default;
/// values above the ceiling are clamped down to it.
fn resolve_ttl(raw: Option<&str>, limits: PolicyLimits) -> u32 {
    match raw.and_then(|v| v.trim().parse::<f64>().ok()) {
        Some(n) if n.is_finite() && n >= 0.0 => n.min(f64::from(limits.max_ttl)) as u32,
        _ => limits.default_ttl,
    }
}

/// First occurrence of a query parameter, percent-decoded.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
