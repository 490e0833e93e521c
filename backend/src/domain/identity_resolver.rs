//! Opaque user id to document handle resolution.
//!
//! Every edge mutation addresses user records by their store handle, so each
//! request resolves the ids it was given first. Lookups are single-field
//! equality queries limited to one row; the `id` field is indexed by both
//! store adapters.
//!
//! Cache fills race with edits: a reader may load a record just before an
//! edit lands and insert it after the edit's invalidation. Every invalidation
//! bumps a shared epoch; a reader that sees the epoch move during its fill
//! drops the entry it just inserted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::debug;

use super::account_store::{USER_ID_FIELD, account_from_stored};
use super::ports::{CachedProfile, Collection, DocumentHandle, DocumentStore, ProfileCache};
use super::{Account, SocialError, UserId};

/// Resolves opaque user ids, optionally reading profiles through a cache.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn DocumentStore>,
    cache: Option<Arc<dyn ProfileCache>>,
    epoch: Arc<AtomicU64>,
}

impl IdentityResolver {
    /// Build a resolver without a profile cache.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: None,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Attach a profile cache used by [`IdentityResolver::resolve_profile`].
    pub fn with_cache(mut self, cache: Arc<dyn ProfileCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Map `id` to its document handle.
    ///
    /// # Errors
    /// [`SocialError::NotFound`] when no user has that id; store failures
    /// otherwise.
    pub async fn resolve(&self, id: &UserId) -> Result<DocumentHandle, SocialError> {
        self.load_account(id).await.map(|account| account.handle)
    }

    /// Whether a user with `id` exists.
    pub async fn exists(&self, id: &UserId) -> Result<bool, SocialError> {
        match self.resolve(id).await {
            Ok(_) => Ok(true),
            Err(SocialError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Resolve `id` and also return its public profile.
    ///
    /// Served from the cache when an entry is present; a miss loads the record
    /// and populates the cache.
    pub async fn resolve_profile(&self, id: &UserId) -> Result<CachedProfile, SocialError> {
        if let Some(hit) = self.cache.as_ref().and_then(|cache| cache.get(id)) {
            debug!(user_id = %id, "profile cache hit");
            return Ok(hit);
        }

        let started = self.epoch.load(Ordering::SeqCst);
        let account = self.load_account(id).await?;
        let entry = CachedProfile {
            handle: account.handle,
            profile: account.profile,
        };
        if let Some(cache) = &self.cache {
            cache.insert(id.clone(), entry.clone());
            if self.epoch.load(Ordering::SeqCst) != started {
                debug!(user_id = %id, "profile changed during cache fill");
                cache.invalidate(id);
            }
        }
        Ok(entry)
    }

    /// Load the full record for `id`, bypassing the cache.
    pub async fn load_account(&self, id: &UserId) -> Result<Account, SocialError> {
        let key = Value::String(id.as_ref().to_owned());
        let mut found = self
            .store
            .find_eq(Collection::Users, USER_ID_FIELD, &key, Some(1))
            .await?;
        match found.pop() {
            Some(stored) => account_from_stored(&stored),
            None => Err(SocialError::user_not_found()),
        }
    }

    /// Drop any cached profile for `id`, including one a concurrent fill is
    /// about to insert.
    pub fn invalidate(&self, id: &UserId) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.invalidate(id);
        }
    }
}
