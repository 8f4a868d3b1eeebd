//! HTTP server setup and request orchestration.
//!
//! # Responsibilities
//! - Create the Axum router with the two proxy route shapes
//! - Wire up middleware (CORS, tracing, timeout, request ID)
//! - Resolve the upstream target and evaluate the cache policy
//! - Serve hits from the store, forward misses to the origin
//! - Queue asynchronous cache writes after responding
//!
//! Per request: RECEIVED → RESOLVE_URL → (REJECT 400 | EVALUATE_POLICY)
//! → (CACHE_LOOKUP → HIT | MISS) → FETCH_UPSTREAM → ASSEMBLE_RESPONSE
//! → (STORE_ASYNC if write-eligible) → DONE. No state is revisited.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::cache::{
    CacheEntry, CacheKey, CachePolicy, CacheStore, CacheWriter, InMemoryStore, PolicyLimits,
};
use crate::config::{CacheConfig, ProxyConfig};
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::response::{self, CacheStatus};
use crate::observability::metrics;
use crate::routing::UpstreamTarget;
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CacheStore>,
    pub upstream: UpstreamClient,
    pub writer: CacheWriter,
    /// Active cache settings; swapped atomically on config reload.
    pub cache: Arc<ArcSwap<CacheConfig>>,
}

/// HTTP server for the caching proxy.
pub struct HttpServer {
    router: Router,
    cache_handle: Arc<ArcSwap<CacheConfig>>,
}

impl HttpServer {
    /// Create a server with the default in-memory store.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let store = Arc::new(InMemoryStore::new(config.cache.max_entries));
        Self::with_store(config, store)
    }

    /// Create a server against an injected cache store.
    ///
    /// The store is a constructor dependency rather than ambient state so
    /// tests can substitute their own.
    pub fn with_store(
        config: ProxyConfig,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let writer = CacheWriter::spawn(store.clone());
        let cache_handle = Arc::new(ArcSwap::from_pointee(config.cache.clone()));

        let state = AppState {
            store,
            upstream,
            writer,
            cache: cache_handle.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            cache_handle,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(landing))
            .route("/{protocol}/{host}", any(proxy_handler))
            .route("/{protocol}/{host}/{*rest}", any(proxy_handler))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.upstream.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until ctrl-c or the shutdown signal fires.
    ///
    /// Validated config reloads arriving on `config_updates` swap the
    /// active cache settings; in-flight requests keep the settings they
    /// started with.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let cache_handle = self.cache_handle.clone();
        tokio::spawn(async move {
            while let Some(update) = config_updates.recv().await {
                tracing::info!(
                    default_ttl_secs = update.cache.default_ttl_secs,
                    max_ttl_secs = update.cache.max_ttl_secs,
                    enabled = update.cache.enabled,
                    "Applying reloaded cache settings"
                );
                cache_handle.store(Arc::new(update.cache));
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler: resolve, consult cache, fetch, assemble, store.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let method = request.method().clone();

    // 1. Resolve the upstream target from the path.
    let uri = request.uri();
    let target = match UpstreamTarget::from_path(uri.path(), uri.query()) {
        Ok(target) => target,
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Rejected request");
            metrics::record_request(method.as_str(), 400, "none", start);
            return (StatusCode::BAD_REQUEST, "Invalid protocol. Use http or https.")
                .into_response();
        }
    };

    // 2. Evaluate the cache policy once, against the active settings.
    let cache_cfg = state.cache.load_full();
    let limits = PolicyLimits {
        default_ttl: cache_cfg.default_ttl_secs,
        max_ttl: cache_cfg.max_ttl_secs,
    };
    let policy = CachePolicy::from_request(&method, request.headers(), uri.query(), limits);
    let key = CacheKey::from_request(&request);

    // 3. Cache lookup. A store failure degrades to a miss.
    if cache_cfg.enabled && policy.read_eligible() {
        match state.store.get(&key).await {
            Ok(Some(entry)) => {
                tracing::debug!(request_id = %request_id, key = %key, "Cache hit");
                metrics::record_request(method.as_str(), entry.status.as_u16(), "hit", start);
                return response::assemble(&entry, CacheStatus::Hit, &method);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Cache lookup failed");
            }
        }
    }

    // 4. Fetch from the origin; exactly one attempt.
    tracing::debug!(request_id = %request_id, url = %target.url(), "Fetching upstream");
    let upstream_response = match state.upstream.fetch(&target, &method, request.headers()).await {
        Ok(res) => res,
        Err(e) => {
            tracing::error!(request_id = %request_id, url = %target.url(), error = %e, "Upstream error");
            metrics::record_request(method.as_str(), 502, "miss", start);
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    // 5. Assemble: buffer the body, strip transport headers, apply policy.
    let status = upstream_response.status();
    let mut headers = upstream_response.headers().clone();
    let body = match upstream_response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream body read failed");
            metrics::record_request(method.as_str(), 502, "miss", start);
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    response::strip_hop_by_hop(&mut headers);
    response::apply_cache_policy(&mut headers, &policy);
    let entry = CacheEntry::new(status, headers, body);

    // 6. Queue the deferred store write. Bypass skips only the read.
    if cache_cfg.enabled && policy.write_eligible(status) {
        state.writer.enqueue(key, entry.clone());
    }

    metrics::record_request(method.as_str(), status.as_u16(), "miss", start);
    response::assemble(&entry, CacheStatus::Miss, &method)
}

/// Informational landing page for the root path.
async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>edge-proxy</title></head>
<body>
<h1>edge-proxy</h1>
<p>Path-addressed HTTP forward proxy with an edge response cache.</p>
<h2>Routes</h2>
<ul>
  <li><code>/{protocol}/{host}</code> &mdash; proxies to <code>{protocol}://{host}</code></li>
  <li><code>/{protocol}/{host}/{rest...}</code> &mdash; proxies to <code>{protocol}://{host}/{rest}</code></li>
</ul>
<p><code>protocol</code> must be <code>http</code> or <code>https</code>. The query string is forwarded unchanged.</p>
<h2>Query parameters</h2>
<ul>
  <li><code>ttl</code> &mdash; cache lifetime in seconds (default 300, max 86400)</li>
  <li><code>respect=1</code> &mdash; honor the origin's own Cache-Control</li>
  <li><code>no-cache=1</code> &mdash; skip the cache lookup for this request</li>
</ul>
<p>Responses carry an <code>x-cache: HIT|MISS</code> header. Requests with an
<code>Authorization</code> header are never cached.</p>
</body>
</html>
"#;

/// Wait for ctrl-c or a shutdown broadcast.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received");
        }
        _ = shutdown.recv() => {
            tracing::info!("Shutdown signal received");
        }
    }
}
