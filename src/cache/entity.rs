//! Entity Cache Module
//!
//! Concurrent id-to-snapshot cache for authoritative entity records,
//! populated lazily on miss and invalidated explicitly.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::cache::CacheStats;
use crate::error::{CacheError, Result};

// == Entity Entry ==
/// A cached point-in-time snapshot of one entity.
#[derive(Debug, Clone)]
struct EntityEntry<V> {
    value: V,
    /// When this snapshot was taken from the authoritative store
    inserted_at: DateTime<Utc>,
}

// == Entity Cache ==
/// Concurrent mapping from entity id to a snapshot of that entity.
///
/// Entries live until explicitly invalidated or cleared; there is no TTL. The
/// cache promises only that a cached value was authoritative at some point no
/// earlier than its insertion, so every path that mutates an entity out of
/// band must invalidate its id.
#[derive(Debug)]
pub struct EntityCache<V> {
    entries: DashMap<u64, EntityEntry<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl<V: Clone> EntityCache<V> {
    // == Constructors ==
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a cache pre-sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    // == Get ==
    /// Non-blocking lookup; never fetches.
    pub fn get(&self, id: u64) -> Option<V> {
        match self.entries.get(&id) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    // == Fetch ==
    /// Returns the cached value for `id`, or awaits `load` and caches its
    /// result before returning it.
    ///
    /// Concurrent fetches of the same missing id may each run `load`; the last
    /// completed insert wins. A miss here costs a single indexed point lookup,
    /// cheap enough that it is not worth a coalescing flight per id.
    pub async fn fetch<F, Fut>(&self, id: u64, load: F) -> Result<V>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        if let Some(value) = self.get(id) {
            return Ok(value);
        }

        debug!(id, "entity cache miss, loading from authoritative store");
        let value = load(id)
            .await
            .map_err(|err| CacheError::LookupFailed(format!("entity {id}: {err:#}")))?;
        self.insert(id, value.clone());
        Ok(value)
    }

    // == Insert ==
    /// Stores a snapshot for `id`, replacing any previous one. For callers
    /// that already hold a fresh authoritative value.
    pub fn insert(&self, id: u64, value: V) {
        self.entries.insert(
            id,
            EntityEntry {
                value,
                inserted_at: Utc::now(),
            },
        );
    }

    // == Invalidate ==
    /// Removes the entry for `id`, if present. Idempotent; returns whether an
    /// entry was removed.
    pub fn invalidate(&self, id: u64) -> bool {
        let removed = self.entries.remove(&id).is_some();
        if removed {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(id, "entity invalidated");
        }
        removed
    }

    // == Clear ==
    /// Removes every entry (global reset).
    pub fn clear(&self) {
        self.entries.clear();
        info!("entity cache cleared");
    }

    /// When the cached snapshot for `id` was taken, if present.
    pub fn inserted_at(&self, id: u64) -> Option<DateTime<Utc>> {
        self.entries.get(&id).map(|entry| entry.inserted_at)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            total_entries: self.entries.len(),
        }
    }
}

impl<V: Clone> Default for EntityCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
