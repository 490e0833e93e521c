//! In-process profile cache backed by `moka`.
//!
//! Entries expire after a fixed time-to-live and the cache evicts by entry
//! count once full. Profile edits invalidate explicitly, so the TTL only
//! bounds staleness for writes made by other processes.

use std::time::Duration;

use moka::sync::Cache;

use crate::domain::UserId;
use crate::domain::ports::{CachedProfile, ProfileCache};

/// Bounded, expiring [`ProfileCache`].
#[derive(Clone)]
pub struct MokaProfileCache {
    entries: Cache<UserId, CachedProfile>,
}

impl MokaProfileCache {
    /// Hold at most `capacity` entries, each for at most `ttl`.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl ProfileCache for MokaProfileCache {
    fn get(&self, id: &UserId) -> Option<CachedProfile> {
        self.entries.get(id)
    }

    fn insert(&self, id: UserId, entry: CachedProfile) {
        self.entries.insert(id, entry);
    }

    fn invalidate(&self, id: &UserId) {
        self.entries.invalidate(id);
    }
}
