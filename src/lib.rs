//! Feedcache - staleness-gated snapshot caching with request coalescing
//!
//! Serves a read-heavy feed page out of memory: one expensive aggregation
//! renders into a single cached snapshot whose recomputation is coalesced
//! across concurrent requests, and per-user point lookups are short-circuited
//! by a concurrent entity cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod state;

pub use cache::{CacheStats, CoalescingGroup, EntityCache, SnapshotCache, SnapshotStats};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use models::User;
pub use state::{Caches, UserCache};
