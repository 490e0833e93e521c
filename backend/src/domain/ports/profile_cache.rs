//! Port for the read-through profile cache.

use crate::domain::{Profile, UserId};

use super::DocumentHandle;

/// Cached resolution result: the record handle plus its public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedProfile {
    pub handle: DocumentHandle,
    pub profile: Profile,
}

/// Bounded, expiring map from opaque user id to [`CachedProfile`].
///
/// Implementations are shared across workers and must tolerate concurrent
/// access. A missing entry is never an error.
#[cfg_attr(test, mockall::automock)]
pub trait ProfileCache: Send + Sync {
    /// Look up a cached entry.
    fn get(&self, id: &UserId) -> Option<CachedProfile>;

    /// Store or replace an entry.
    fn insert(&self, id: UserId, entry: CachedProfile);

    /// Drop the entry for `id`, if any.
    fn invalidate(&self, id: &UserId);
}
