//! In-memory cache store.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CacheEntry, CacheError, CacheKey, CacheStore};

/// Process-local [`CacheStore`] backed by a concurrent map.
///
/// Expiry comes from the max-age each stored entry declares; entries that
/// forbid shared caching are refused at insert time. Capacity is bounded:
/// when full, the entry closest to expiry makes room.
pub struct InMemoryStore {
    entries: DashMap<CacheKey, StoredEntry>,
    max_entries: usize,
}

struct StoredEntry {
    entry: CacheEntry,
    expires_at: SystemTime,
}

impl InMemoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_soonest_expiring(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|r| r.value().expires_at)
            .map(|r| r.key().clone());
        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        if let Some(stored) = self.entries.get(key) {
            if SystemTime::now() >= stored.expires_at {
                drop(stored);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(stored.entry.clone()));
        }
        Ok(None)
    }

    async fn insert(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        let max_age = match entry.declared_max_age() {
            Some(secs) if secs > 0 => secs,
            // no-store/private/zero lifetime: refuse silently.
            _ => return Ok(()),
        };

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.evict_soonest_expiring();
        }

        let expires_at = SystemTime::now() + Duration::from_secs(max_age);
        self.entries.insert(key, StoredEntry { entry, expires_at });
        Ok(())
    }
}
