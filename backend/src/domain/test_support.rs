//! Shared helpers for domain unit tests.

use serde_json::Value;

use super::account_store::{AccountDocument, EMAIL_FIELD};
use super::ports::{Collection, DocumentHandle, DocumentStore, encode_document};
use super::{EmailAddress, PasswordHash, PersonName, Profile, UserId};

pub(crate) struct SeededAccount {
    pub(crate) id: UserId,
    pub(crate) handle: DocumentHandle,
}

pub(crate) fn sample_profile() -> Profile {
    Profile {
        id: UserId::random(),
        email: EmailAddress::new("sample@example.com").expect("valid email"),
        first_name: PersonName::parse("Sam", "first name").expect("valid name"),
        last_name: PersonName::parse("Ple", "last name").expect("valid name"),
    }
}

/// Write a user record straight into `store`, bypassing the services.
pub(crate) async fn seed_account(store: &dyn DocumentStore, email: &str) -> SeededAccount {
    let id = UserId::random();
    let (first, last) = email
        .split_once('@')
        .map_or(("User", "Seeded"), |(local, _)| (local, "Seeded"));
    let body = encode_document(&AccountDocument {
        id: id.clone(),
        email: EmailAddress::new(email).expect("valid email"),
        password_hash: PasswordHash::new("seeded-hash"),
        first_name: PersonName::parse(first, "first name").expect("valid name"),
        last_name: PersonName::parse(last, "last name").expect("valid name"),
        followers: Vec::new(),
        following: Vec::new(),
    })
    .expect("encode account");
    let handle = store
        .insert_unique(Collection::Users, EMAIL_FIELD, body)
        .await
        .expect("insert account");
    SeededAccount { id, handle }
}

/// Read a string array field from a stored user record.
pub(crate) async fn edge_list(
    store: &dyn DocumentStore,
    handle: &DocumentHandle,
    field: &str,
) -> Vec<String> {
    let doc = store
        .get(Collection::Users, handle)
        .await
        .expect("get user")
        .expect("user exists");
    doc.body
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
