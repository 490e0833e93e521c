//! Account records in the `users` collection.
//!
//! A user document looks like:
//!
//! ```json
//! {
//!   "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
//!   "email": "ada@example.com",
//!   "password_hash": "$argon2id$...",
//!   "first_name": "Ada",
//!   "last_name": "Lovelace",
//!   "followers": ["<handle>", ...],
//!   "following": ["<handle>", ...]
//! }
//! ```
//!
//! `email` is a unique field; the store rejects a second record with the same
//! value atomically.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::identity_resolver::IdentityResolver;
use super::ports::{
    Collection, DocumentHandle, DocumentStore, StoredDocument, decode_document, encode_document,
};
use super::{
    Account, AccountField, EmailAddress, PasswordHash, PersonName, Profile, SocialError, UserId,
};

pub(crate) const USER_ID_FIELD: &str = "id";
pub(crate) const EMAIL_FIELD: &str = "email";
pub(crate) const FOLLOWERS_FIELD: &str = "followers";
pub(crate) const FOLLOWING_FIELD: &str = "following";

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AccountDocument {
    pub(crate) id: UserId,
    pub(crate) email: EmailAddress,
    pub(crate) password_hash: PasswordHash,
    pub(crate) first_name: PersonName,
    pub(crate) last_name: PersonName,
    #[serde(default)]
    pub(crate) followers: Vec<DocumentHandle>,
    #[serde(default)]
    pub(crate) following: Vec<DocumentHandle>,
}

pub(crate) fn account_from_stored(stored: &StoredDocument) -> Result<Account, SocialError> {
    let doc: AccountDocument = decode_document(&stored.body)?;
    Ok(Account {
        handle: stored.handle.clone(),
        profile: Profile {
            id: doc.id,
            email: doc.email,
            first_name: doc.first_name,
            last_name: doc.last_name,
        },
        password_hash: doc.password_hash,
        followers: doc.followers,
        following: doc.following,
    })
}

/// Create, look up and edit user records.
#[derive(Clone)]
pub struct AccountStore {
    store: Arc<dyn DocumentStore>,
    resolver: IdentityResolver,
}

impl AccountStore {
    /// Build an account store sharing `resolver`'s profile cache.
    pub fn new(store: Arc<dyn DocumentStore>, resolver: IdentityResolver) -> Self {
        Self { store, resolver }
    }

    /// Create a record with empty edge lists and a fresh opaque id.
    ///
    /// # Errors
    /// [`SocialError::AlreadyExists`] when the email is taken.
    pub async fn create(
        &self,
        email: EmailAddress,
        password_hash: PasswordHash,
        first_name: PersonName,
        last_name: PersonName,
    ) -> Result<UserId, SocialError> {
        let id = UserId::random();
        let body = encode_document(&AccountDocument {
            id: id.clone(),
            email,
            password_hash,
            first_name,
            last_name,
            followers: Vec::new(),
            following: Vec::new(),
        })?;
        let handle = self
            .store
            .insert_unique(Collection::Users, EMAIL_FIELD, body)
            .await?;
        info!(user_id = %id, %handle, "account created");
        Ok(id)
    }

    /// Look up the record registered under `email`.
    pub async fn find_by_email(&self, email: &EmailAddress) -> Result<Account, SocialError> {
        let key = Value::String(email.as_ref().to_owned());
        let mut found = self
            .store
            .find_eq(Collection::Users, EMAIL_FIELD, &key, Some(1))
            .await?;
        match found.pop() {
            Some(stored) => account_from_stored(&stored),
            None => Err(SocialError::user_not_found()),
        }
    }

    /// Look up the record with opaque id `id`.
    pub async fn find_by_opaque_id(&self, id: &UserId) -> Result<Account, SocialError> {
        self.resolver.load_account(id).await
    }

    /// Overwrite one editable field and invalidate the cached profile.
    ///
    /// The cache entry is dropped both before and after the write, so it is
    /// gone even when the write itself fails midway.
    ///
    /// # Errors
    /// [`SocialError::NotFound`] for an unknown handle and
    /// [`SocialError::AlreadyExists`] when changing the email to one that is
    /// already registered.
    pub async fn update_field(
        &self,
        handle: &DocumentHandle,
        field: AccountField,
        value: &str,
    ) -> Result<(), SocialError> {
        let current = self
            .store
            .get(Collection::Users, handle)
            .await?
            .ok_or_else(SocialError::user_not_found)?;
        let id = account_from_stored(&current)?.profile.id;

        self.resolver.invalidate(&id);
        let written = self
            .store
            .set_field(
                Collection::Users,
                handle,
                field.as_str(),
                Value::String(value.to_owned()),
            )
            .await;
        self.resolver.invalidate(&id);
        written?;

        debug!(user_id = %id, field = field.as_str(), "account field updated");
        Ok(())
    }
}
