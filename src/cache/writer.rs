//! Deferred cache population.
//!
//! Store writes run on a detached task draining a queue, so cache-store
//! latency or failure never delays or alters the caller-visible response.
//! Writes are best-effort: if the process is shutting down or the store
//! errors, the write is logged and dropped.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{CacheEntry, CacheKey, CacheStore};
use crate::observability::metrics;

struct WriteJob {
    key: CacheKey,
    entry: CacheEntry,
}

/// Handle for queueing cache writes after a response has been assembled.
#[derive(Clone)]
pub struct CacheWriter {
    tx: mpsc::UnboundedSender<WriteJob>,
}

impl CacheWriter {
    /// Spawn the drain task and return the queue handle.
    pub fn spawn(store: Arc<dyn CacheStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<WriteJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match store.insert(job.key, job.entry).await {
                    Ok(()) => metrics::record_cache_write("ok"),
                    Err(e) => {
                        tracing::warn!(error = %e, "Cache store write failed");
                        metrics::record_cache_write("error");
                    }
                }
            }
        });

        Self { tx }
    }

    /// Queue a write. Fire-and-forget.
    pub fn enqueue(&self, key: CacheKey, entry: CacheEntry) {
        if self.tx.send(WriteJob { key, entry }).is_err() {
            tracing::warn!("Cache writer task stopped, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryStore;
    use axum::http::header::CACHE_CONTROL;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use bytes::Bytes;
    use std::time::Duration;

    fn key() -> CacheKey {
        let request = axum::http::Request::builder()
            .uri("/https/example.com/a")
            .header("host", "proxy.local")
            .body(())
            .unwrap();
        CacheKey::from_request(&request)
    }

    #[tokio::test]
    async fn queued_write_lands_in_the_store() {
        let store = Arc::new(InMemoryStore::new(16));
        let writer = CacheWriter::spawn(store.clone());

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=60"));
        writer.enqueue(
            key(),
            CacheEntry::new(StatusCode::OK, headers, Bytes::from_static(b"queued")),
        );

        // The write is asynchronous; poll briefly until it lands.
        for _ in 0..50 {
            if !store.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let got = store.get(&key()).await.unwrap().expect("write drained");
        assert_eq!(got.body, Bytes::from_static(b"queued"));
    }
}
