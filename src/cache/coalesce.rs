//! Request Coalescing Module
//!
//! Collapses concurrent executions of the same logical key into one shared
//! flight, so a burst of callers costs a single run of the operation.

use std::future::Future;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{CacheError, Result};

/// What a flight publishes: `None` until the leader finishes, then exactly one
/// shared outcome.
type Outcome<T> = Option<Result<T>>;

// == Coalescing Group ==
/// Ensures at most one in-flight execution per logical key.
///
/// The first caller for a key (the leader) runs the operation. Callers arriving
/// while it runs (joiners) wait on the same flight and receive a clone of the
/// leader's outcome, error included. Once a flight completes the key is
/// forgotten, and the next caller starts a fresh execution. Distinct keys never
/// serialize against each other, and the group never retries on its own.
#[derive(Debug)]
pub struct CoalescingGroup<T> {
    /// Live flights, keyed by logical key
    inflight: DashMap<String, watch::Receiver<Outcome<T>>>,
}

enum Role<T> {
    Lead(watch::Sender<Outcome<T>>),
    Join(watch::Receiver<Outcome<T>>),
}

impl<T: Clone> CoalescingGroup<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            inflight: DashMap::new(),
        }
    }

    // == Execute ==
    /// Runs `operation` under `key`, unless a flight for `key` is already in
    /// progress, in which case that flight's outcome is awaited and shared.
    pub async fn execute<F, Fut>(&self, key: &str, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        // Leader vs joiner is decided atomically on the in-flight map; the
        // shard guard must not be held across an await point.
        let role = match self.inflight.entry(key.to_owned()) {
            Entry::Occupied(entry) => Role::Join(entry.get().clone()),
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx);
                Role::Lead(tx)
            }
        };

        match role {
            Role::Lead(tx) => {
                // Deregistration rides on a guard so a leader whose future is
                // dropped mid-operation cannot leave a dead flight behind.
                let registration = FlightRegistration { group: self, key };
                let outcome = operation().await;
                drop(registration);
                // The key is forgotten before the outcome is published: a
                // caller arriving from here on starts a new flight instead of
                // reading a finished one.
                let _ = tx.send(Some(outcome.clone()));
                outcome
            }
            Role::Join(mut rx) => {
                debug!(key, "joining in-flight execution");
                match rx.wait_for(Option::is_some).await {
                    Ok(outcome) => outcome
                        .as_ref()
                        .cloned()
                        .unwrap_or_else(|| Err(CacheError::RecomputeAbandoned(key.to_owned()))),
                    // The sender dropped without publishing: the leader was
                    // cancelled before its operation completed.
                    Err(_) => Err(CacheError::RecomputeAbandoned(key.to_owned())),
                }
            }
        }
    }

    // == In Flight ==
    /// Number of flights currently in progress.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }
}

impl<T: Clone> Default for CoalescingGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

// == Flight Registration ==
/// Removes the in-flight entry for `key` when dropped, whether the leader
/// finished or was cancelled.
struct FlightRegistration<'a, T> {
    group: &'a CoalescingGroup<T>,
    key: &'a str,
}

impl<T> Drop for FlightRegistration<'_, T> {
    fn drop(&mut self) {
        self.group.inflight.remove(self.key);
    }
}
