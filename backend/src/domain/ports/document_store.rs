//! Port abstraction over the schemaless document store.
//!
//! Records are JSON objects grouped into collections. The store assigns each
//! record a [`DocumentHandle`] on insert; that handle, not any application id,
//! is what later mutations address.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::define_port_error;

/// Body of a stored record.
pub type Document = Map<String, Value>;

/// Collections known to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Posts,
}

impl Collection {
    /// Stable collection name used by adapters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Posts => "posts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-assigned identifier of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    /// Wrap a handle issued by a store.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the handle text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record together with its handle.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub handle: DocumentHandle,
    pub body: Document,
}

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached. Retrying may succeed.
        Connection { message: String } => "document store connection failed: {message}",
        /// A query or mutation failed while executing.
        Query { message: String } => "document store query failed: {message}",
        /// A unique insert or update collided with an existing value.
        Conflict { field: String } => "value for unique field `{field}` already exists",
        /// The addressed record does not exist.
        Missing { handle: String } => "document `{handle}` does not exist",
        /// A stored body could not be converted to or from its typed form.
        Malformed { message: String } => "document body is malformed: {message}",
    }
}

/// Document persistence operations needed by the social core.
///
/// Implementations must be safe to share across request workers. Array
/// operations treat the field as a set of strings: union adds the element only
/// when absent and difference removes every occurrence, so both are
/// idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `body` and return the generated handle.
    async fn insert(
        &self,
        collection: Collection,
        body: Document,
    ) -> Result<DocumentHandle, DocumentStoreError>;

    /// Insert `body` unless another record in `collection` already holds the
    /// same value in `unique_field`. The check and the insert are atomic.
    async fn insert_unique(
        &self,
        collection: Collection,
        unique_field: &str,
        body: Document,
    ) -> Result<DocumentHandle, DocumentStoreError>;

    /// Records whose top-level `field` equals `value`, in insertion order,
    /// truncated to `limit` when given.
    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, DocumentStoreError>;

    /// Every record in `collection`, in insertion order.
    async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, DocumentStoreError>;

    /// Fetch one record by handle.
    async fn get(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
    ) -> Result<Option<StoredDocument>, DocumentStoreError>;

    /// Overwrite one top-level field. Fails with `Missing` for an unknown
    /// handle and `Conflict` when the field is unique and the value is taken.
    async fn set_field(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        value: Value,
    ) -> Result<(), DocumentStoreError>;

    /// Add `element` to the string array in `field` if it is not present.
    async fn array_union(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        element: &str,
    ) -> Result<(), DocumentStoreError>;

    /// Remove `element` from the string array in `field`.
    async fn array_remove(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        element: &str,
    ) -> Result<(), DocumentStoreError>;
}

/// Serialise a typed record into a document body.
pub fn encode_document<T: Serialize>(value: &T) -> Result<Document, DocumentStoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DocumentStoreError::malformed(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(err) => Err(DocumentStoreError::malformed(err.to_string())),
    }
}

/// Deserialise a document body into a typed record.
pub fn decode_document<T: DeserializeOwned>(body: &Document) -> Result<T, DocumentStoreError> {
    serde_json::from_value(Value::Object(body.clone()))
        .map_err(|err| DocumentStoreError::malformed(err.to_string()))
}
