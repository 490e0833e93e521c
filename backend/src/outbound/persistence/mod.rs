//! Document store adapters.
//!
//! - [`InMemoryDocumentStore`]: process-local, used without a database URL
//!   and in tests.
//! - [`DieselDocumentStore`]: PostgreSQL JSONB via Diesel, `diesel-async` and
//!   a `bb8` pool.
//!
//! Diesel row structs and the schema stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use postboard::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/postboard")).await?;
//! let store = DieselDocumentStore::new(pool);
//! store.ensure_schema().await?;
//! ```

use serde_json::Value;

pub(crate) mod diesel_helpers;
mod diesel_document_store;
mod memory_document_store;
mod models;
mod pool;
mod schema;

pub use diesel_document_store::DieselDocumentStore;
pub use memory_document_store::InMemoryDocumentStore;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Text form of a unique field value: strings verbatim, anything else as
/// compact JSON.
pub(crate) fn unique_key_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("a@x.io"), "a@x.io")]
    #[case(json!(42), "42")]
    #[case(json!(true), "true")]
    fn unique_key_text_renders_scalars(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(unique_key_text(&value), expected);
    }
}
