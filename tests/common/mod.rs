//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_proxy::cache::CacheStore;
use edge_proxy::config::ProxyConfig;
use edge_proxy::http::HttpServer;
use edge_proxy::lifecycle::Shutdown;

/// Scripted response returned by a mock origin.
pub type OriginReply = (StatusCode, Vec<(&'static str, String)>, String);

/// Start a mock origin server on an ephemeral port.
///
/// The script sees the request head and the 1-based hit count; the hit
/// counter is returned so tests can assert how often the origin was
/// actually consulted.
pub async fn start_origin<F>(script: F) -> (SocketAddr, Arc<AtomicU32>)
where
    F: Fn(&Parts, u32) -> OriginReply + Clone + Send + Sync + 'static,
{
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();

    let app = Router::new().fallback(move |req: Request<Body>| {
        let script = script.clone();
        let counter = counter.clone();
        async move {
            let (parts, _) = req.into_parts();
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let (status, headers, body) = script(&parts, n);

            let mut response = Response::builder().status(status);
            for (name, value) in headers {
                response = response.header(name, value);
            }
            response.body(Body::from(body)).unwrap()
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, hits)
}

/// A proxy instance running against an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<ProxyConfig>,
}

/// Start the proxy with its default in-memory store.
pub async fn start_proxy(config: ProxyConfig) -> TestProxy {
    let server = HttpServer::new(config).unwrap();
    spawn_server(server).await
}

/// Start the proxy against an injected store, for direct inspection.
pub async fn start_proxy_with_store(config: ProxyConfig, store: Arc<dyn CacheStore>) -> TestProxy {
    let server = HttpServer::with_store(config, store).unwrap();
    spawn_server(server).await
}

async fn spawn_server(server: HttpServer) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_tx, config_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_rx, server_shutdown).await;
    });

    TestProxy {
        addr,
        shutdown,
        config_tx,
    }
}

/// HTTP client configured the way the tests need it.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
