//! Edge response cache subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → policy.rs (bypass? respect-origin? effective TTL? eligibility)
//!     → key.rs (inbound URL, method normalized to GET)
//!     → store lookup (memory.rs)
//!         hit  → replay stored entry
//!         miss → upstream fetch
//!             → entry.rs (captured status/headers/body)
//!             → writer.rs (deferred store write, after responding)
//! ```
//!
//! # Design Decisions
//! - The store is injected as a trait object, never ambient global state
//! - Expiry is the store's job, read from the max-age the entry declares
//! - Store failures are logged and dropped; they never touch a response

pub mod entry;
pub mod key;
pub mod memory;
pub mod policy;
pub mod writer;

pub use entry::CacheEntry;
pub use key::CacheKey;
pub use memory::InMemoryStore;
pub use policy::{CachePolicy, PolicyLimits};
pub use writer::CacheWriter;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a cache store backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("store error: {0}")]
    Store(String),
}

/// Key-value store holding assembled upstream responses.
///
/// Implementations must be safe for concurrent use. Every write is a
/// full-entry replace under a request-derived key, so last write wins and
/// no read-modify-write races exist. Expiry is enforced here, from the
/// max-age directive the stored entry itself carries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a live entry. `Ok(None)` covers both absent and expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Store an entry, replacing any previous one under the same key.
    ///
    /// Entries whose cache-control forbids shared caching are silently
    /// not stored; that is a policy outcome, not an error.
    async fn insert(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError>;
}
