//! Snapshot Cache Module
//!
//! Single-slot, staleness-gated cache for an expensively rendered snapshot,
//! with coalesced recomputation.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CoalescingGroup, SnapshotStats};
use crate::error::{CacheError, Result};

// == Slot ==
/// The cached payload and the timestamp pair that encodes freshness.
///
/// The slot is fresh iff `updated_at` is strictly after `triggered_at`. A
/// recompute stamps `triggered_at` before the expensive work starts, so every
/// reader arriving during the work observes staleness and joins the running
/// flight instead of queueing another one.
struct Slot {
    content: Bytes,
    updated_at: Instant,
    triggered_at: Instant,
}

impl Slot {
    /// The initial state: empty content, timestamps equal, therefore stale.
    fn stale() -> Self {
        let now = Instant::now();
        Self {
            content: Bytes::new(),
            updated_at: now,
            triggered_at: now,
        }
    }

    fn is_fresh(&self) -> bool {
        self.updated_at > self.triggered_at
    }
}

// == Snapshot Cache ==
/// Serves the most recent successfully computed snapshot for one logical key.
///
/// Readers that observe a fresh slot return in constant time without touching
/// the exclusive lock path. Readers that observe staleness collapse into a
/// single recompute execution and all receive its result, or its error; a
/// failed recompute leaves the previous content untouched and the slot stale,
/// so the next request retries.
pub struct SnapshotCache {
    /// Logical key under which recomputes are coalesced
    key: String,
    /// Guarded snapshot and freshness timestamps
    slot: RwLock<Slot>,
    /// At most one recompute per stale window
    group: CoalescingGroup<()>,
    fresh_hits: AtomicU64,
    recomputes: AtomicU64,
    failures: AtomicU64,
}

impl SnapshotCache {
    // == Constructor ==
    /// Creates a stale, empty cache for `key`; the first read triggers a
    /// recompute.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            slot: RwLock::new(Slot::stale()),
            group: CoalescingGroup::new(),
            fresh_hits: AtomicU64::new(0),
            recomputes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    // == Get Or Refresh ==
    /// Returns the cached snapshot, recomputing it first if the slot is stale.
    ///
    /// `recompute` is the caller-supplied expensive operation (typically the
    /// feed aggregation plus rendering). It runs at most once per stale window
    /// regardless of how many callers arrive, and never while the slot lock is
    /// held.
    pub async fn get_or_refresh<F, Fut>(&self, recompute: F) -> Result<Bytes>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Bytes>>,
    {
        {
            let slot = self.slot.read().await;
            if slot.is_fresh() {
                self.fresh_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(slot.content.clone());
            }
        }

        self.group
            .execute(&self.key, || self.refresh(recompute))
            .await?;

        // Joined or led, the flight has published by now; serve whatever the
        // slot holds under the shared lock.
        let slot = self.slot.read().await;
        Ok(slot.content.clone())
    }

    /// The flight body: stamp the trigger, run the expensive work without
    /// holding the lock, publish the new snapshot.
    async fn refresh<F, Fut>(&self, recompute: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Bytes>>,
    {
        {
            let mut slot = self.slot.write().await;
            slot.triggered_at = Instant::now();
        }

        self.recomputes.fetch_add(1, Ordering::Relaxed);
        debug!(key = %self.key, "recomputing snapshot");

        let content = recompute().await.map_err(|err| {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!(key = %self.key, "snapshot recompute failed: {err:#}");
            CacheError::RecomputeFailed(format!("{}: {err:#}", self.key))
        })?;

        let mut slot = self.slot.write().await;
        slot.content = content;
        // The update must read as strictly newer than its trigger, even when
        // the recompute finished within the clock's granularity.
        slot.updated_at = Instant::now().max(slot.triggered_at + Duration::from_nanos(1));
        Ok(())
    }

    // == Invalidate ==
    /// Marks the slot stale; the next read initiates a recompute.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.triggered_at = Instant::now();
        debug!(key = %self.key, "snapshot invalidated");
    }

    // == Reset ==
    /// Restores the initial empty, stale state (administrative flush).
    pub async fn reset(&self) {
        let mut slot = self.slot.write().await;
        *slot = Slot::stale();
        info!(key = %self.key, "snapshot cache reset");
    }

    // == Peek ==
    /// Current content without triggering any work; empty until the first
    /// successful recompute. Introspection only, the serving path is
    /// [`get_or_refresh`](Self::get_or_refresh).
    pub async fn peek(&self) -> Bytes {
        self.slot.read().await.content.clone()
    }

    /// Whether a reader right now would be served without a recompute.
    pub async fn is_fresh(&self) -> bool {
        self.slot.read().await.is_fresh()
    }

    /// Logical key of this slot.
    pub fn key(&self) -> &str {
        &self.key
    }

    // == Stats ==
    /// Returns current counters.
    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            fresh_hits: self.fresh_hits.load(Ordering::Relaxed),
            recomputes: self.recomputes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
