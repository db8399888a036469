//! Composition State
//!
//! Top-level cache handles, built once at process startup and shared with
//! request handlers.

use std::sync::Arc;

use tracing::info;

use crate::cache::{EntityCache, SnapshotCache};
use crate::config::CacheConfig;
use crate::models::User;

/// Entity cache instantiated for user records.
pub type UserCache = EntityCache<User>;

// == Caches ==
/// The process-wide cache handles.
///
/// Construct one at the composition point and clone it into request handlers;
/// clones share the same underlying caches.
#[derive(Clone)]
pub struct Caches {
    /// Rendered feed snapshot, staleness-gated and coalesced
    pub feed: Arc<SnapshotCache>,
    /// Authenticated-user point lookups
    pub users: Arc<UserCache>,
}

impl Caches {
    /// Creates cache handles from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            feed: Arc::new(SnapshotCache::new(config.feed_key.clone())),
            users: Arc::new(UserCache::with_capacity(config.user_cache_capacity)),
        }
    }

    // == Reset ==
    /// Administrative flush: restores the feed slot to its initial stale state
    /// and drops every cached user. For the environment-reset path that also
    /// reinitializes backing storage.
    pub async fn reset(&self) {
        self.feed.reset().await;
        self.users.clear();
        info!("all caches reset");
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_from_config_uses_feed_key() {
        let config = CacheConfig {
            feed_key: "front_page".to_string(),
            ..CacheConfig::default()
        };
        let caches = Caches::from_config(&config);
        assert_eq!(caches.feed.key(), "front_page");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let caches = Caches::default();
        let other = caches.clone();

        caches.users.insert(7, User::new(7, "bob"));

        assert_eq!(
            other.users.get(7).map(|u| u.account_name),
            Some("bob".to_string())
        );
    }

    #[tokio::test]
    async fn test_reset_flushes_both_caches() {
        let caches = Caches::default();
        caches.users.insert(1, User::new(1, "alice"));
        caches
            .feed
            .get_or_refresh(|| async { Ok(Bytes::from_static(b"<ol>posts</ol>")) })
            .await
            .unwrap();

        caches.reset().await;

        assert!(caches.users.get(1).is_none());
        assert!(caches.feed.peek().await.is_empty());
        assert!(!caches.feed.is_fresh().await);
    }
}
