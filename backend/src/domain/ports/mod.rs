//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are called by inbound adapters.
//! Driven ports ([`DocumentStore`], [`PasswordHasher`], [`ProfileCache`]) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts_command;
mod document_store;
mod follow_command;
mod follow_query;
mod password_hasher;
mod posts_command;
mod posts_query;
mod profile_cache;
mod profile_query;

#[cfg(test)]
pub use accounts_command::MockAccountsCommand;
pub use accounts_command::{AccountsCommand, ProfileUpdate};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    Collection, Document, DocumentHandle, DocumentStore, DocumentStoreError, StoredDocument,
    decode_document, encode_document,
};
pub use follow_command::FollowCommand;
#[cfg(test)]
pub use follow_command::MockFollowCommand;
pub use follow_query::FollowQuery;
#[cfg(test)]
pub use follow_query::MockFollowQuery;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use posts_command::MockPostsCommand;
pub use posts_command::PostsCommand;
#[cfg(test)]
pub use posts_query::MockPostsQuery;
pub use posts_query::PostsQuery;
#[cfg(test)]
pub use profile_cache::MockProfileCache;
pub use profile_cache::{CachedProfile, ProfileCache};
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::{ProfileQuery, ProfileView};
