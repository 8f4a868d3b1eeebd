//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, cache result
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_cache_writes_total` (counter): deferred store writes by outcome
//!
//! # Design Decisions
//! - Low-overhead updates (atomic operations)
//! - The cache label records hit/miss/none, not per-key detail

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
///
/// Failure to install is logged and otherwise ignored; the proxy serves
/// traffic without metrics rather than refusing to start.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    if let Err(e) = builder.install() {
        tracing::error!(error = %e, "Failed to install metrics exporter");
        return;
    }

    describe_counter!(
        "proxy_requests_total",
        "Total proxied requests by method, status and cache result"
    );
    describe_histogram!(
        "proxy_request_duration_seconds",
        "Request latency distribution"
    );
    describe_counter!(
        "proxy_cache_writes_total",
        "Deferred cache store writes by outcome"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, cache: &str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "cache" => cache.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a deferred cache write.
pub fn record_cache_write(outcome: &'static str) {
    counter!("proxy_cache_writes_total", "outcome" => outcome).increment(1);
}
