//! Configuration Module
//!
//! Handles cache construction parameters, loadable from environment variables.

use std::env;

/// Default logical key for the feed snapshot slot.
pub const DEFAULT_FEED_KEY: &str = "feed";

/// Cache construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Logical key the feed slot coalesces its recomputes under
    pub feed_key: String,
    /// Initial capacity of the user entity cache
    pub user_cache_capacity: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FEED_CACHE_KEY` - Logical key for the feed slot (default: "feed")
    /// - `USER_CACHE_CAPACITY` - Initial user cache capacity (default: 1024)
    pub fn from_env() -> Self {
        Self {
            feed_key: env::var("FEED_CACHE_KEY").unwrap_or_else(|_| DEFAULT_FEED_KEY.to_string()),
            user_cache_capacity: env::var("USER_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            feed_key: DEFAULT_FEED_KEY.to_string(),
            user_cache_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.feed_key, "feed");
        assert_eq!(config.user_cache_capacity, 1024);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("FEED_CACHE_KEY");
        env::remove_var("USER_CACHE_CAPACITY");

        let config = CacheConfig::from_env();
        assert_eq!(config.feed_key, "feed");
        assert_eq!(config.user_cache_capacity, 1024);
    }
}
