//! Data Models
//!
//! Entity records served through the entity lookup cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == User ==
/// A user record as loaded from the authoritative store.
///
/// Cached values are point-in-time snapshots: any path that mutates the
/// authoritative row must follow up with an explicit invalidation of the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable numeric id
    pub id: u64,
    /// Unique account name
    pub account_name: String,
    /// Administrative privileges
    pub admin: bool,
    /// Account is banned and hidden from feeds
    pub banned: bool,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a fresh, unprivileged account record.
    pub fn new(id: u64, account_name: impl Into<String>) -> Self {
        Self {
            id,
            account_name: account_name.into(),
            admin: false,
            banned: false,
            created_at: Utc::now(),
        }
    }
}
