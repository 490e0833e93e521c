//! Process-local [`DocumentStore`] used when no database URL is configured
//! and by unit tests.
//!
//! Every operation takes the single lock for its whole duration, so unique
//! inserts and array set operations are atomic with respect to each other.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::unique_key_text;
use crate::domain::ports::{
    Collection, Document, DocumentHandle, DocumentStore, DocumentStoreError, StoredDocument,
};

#[derive(Default)]
struct CollectionData {
    order: Vec<DocumentHandle>,
    bodies: HashMap<DocumentHandle, Document>,
    // (field, value text) -> owner
    unique: HashMap<(String, String), DocumentHandle>,
}

impl CollectionData {
    fn stored(&self, handle: &DocumentHandle) -> Option<StoredDocument> {
        self.bodies.get(handle).map(|body| StoredDocument {
            handle: handle.clone(),
            body: body.clone(),
        })
    }

    fn push(&mut self, body: Document) -> DocumentHandle {
        let handle = DocumentHandle::new(Uuid::new_v4().simple().to_string());
        self.order.push(handle.clone());
        self.bodies.insert(handle.clone(), body);
        handle
    }

    fn body_mut(&mut self, handle: &DocumentHandle) -> Result<&mut Document, DocumentStoreError> {
        self.bodies
            .get_mut(handle)
            .ok_or_else(|| DocumentStoreError::missing(handle.as_str()))
    }
}

/// Document store held entirely in memory.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, CollectionData>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn string_set(body: &mut Document, field: &str) -> Result<Vec<Value>, DocumentStoreError> {
    match body.remove(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => {
            let message = format!("field `{field}` holds {other}, expected an array");
            body.insert(field.to_owned(), other);
            Err(DocumentStoreError::malformed(message))
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(
        &self,
        collection: Collection,
        body: Document,
    ) -> Result<DocumentHandle, DocumentStoreError> {
        let mut guard = self.collections.write().await;
        Ok(guard.entry(collection).or_default().push(body))
    }

    async fn insert_unique(
        &self,
        collection: Collection,
        unique_field: &str,
        body: Document,
    ) -> Result<DocumentHandle, DocumentStoreError> {
        let value = body.get(unique_field).ok_or_else(|| {
            DocumentStoreError::query(format!("unique field `{unique_field}` is absent"))
        })?;
        let key = (unique_field.to_owned(), unique_key_text(value));

        let mut guard = self.collections.write().await;
        let data = guard.entry(collection).or_default();
        if data.unique.contains_key(&key) {
            return Err(DocumentStoreError::conflict(unique_field));
        }
        let handle = data.push(body);
        data.unique.insert(key, handle.clone());
        Ok(handle)
    }

    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, DocumentStoreError> {
        let guard = self.collections.read().await;
        let Some(data) = guard.get(&collection) else {
            return Ok(Vec::new());
        };
        let matches = data
            .order
            .iter()
            .filter(|handle| {
                data.bodies
                    .get(*handle)
                    .and_then(|body| body.get(field))
                    .is_some_and(|candidate| candidate == value)
            })
            .filter_map(|handle| data.stored(handle));
        Ok(match limit {
            Some(limit) => matches.take(limit).collect(),
            None => matches.collect(),
        })
    }

    async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, DocumentStoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|data| {
                data.order
                    .iter()
                    .filter_map(|handle| data.stored(handle))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
    ) -> Result<Option<StoredDocument>, DocumentStoreError> {
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).and_then(|data| data.stored(handle)))
    }

    async fn set_field(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        value: Value,
    ) -> Result<(), DocumentStoreError> {
        let mut guard = self.collections.write().await;
        let data = guard
            .get_mut(&collection)
            .ok_or_else(|| DocumentStoreError::missing(handle.as_str()))?;
        let previous = data.body_mut(handle)?.get(field).map(unique_key_text);

        let indexed = data
            .unique
            .iter()
            .any(|((indexed_field, _), owner)| indexed_field == field && owner == handle);
        if indexed {
            let key = (field.to_owned(), unique_key_text(&value));
            match data.unique.get(&key) {
                Some(owner) if owner != handle => {
                    return Err(DocumentStoreError::conflict(field));
                }
                _ => {}
            }
            if let Some(previous) = previous {
                data.unique.remove(&(field.to_owned(), previous));
            }
            data.unique.insert(key, handle.clone());
        }

        data.body_mut(handle)?.insert(field.to_owned(), value);
        Ok(())
    }

    async fn array_union(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        element: &str,
    ) -> Result<(), DocumentStoreError> {
        let mut guard = self.collections.write().await;
        let body = guard
            .get_mut(&collection)
            .ok_or_else(|| DocumentStoreError::missing(handle.as_str()))?
            .body_mut(handle)?;
        let mut items = string_set(body, field)?;
        if !items.iter().any(|item| item.as_str() == Some(element)) {
            items.push(Value::String(element.to_owned()));
        }
        body.insert(field.to_owned(), Value::Array(items));
        Ok(())
    }

    async fn array_remove(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        element: &str,
    ) -> Result<(), DocumentStoreError> {
        let mut guard = self.collections.write().await;
        let body = guard
            .get_mut(&collection)
            .ok_or_else(|| DocumentStoreError::missing(handle.as_str()))?
            .body_mut(handle)?;
        let mut items = string_set(body, field)?;
        items.retain(|item| item.as_str() != Some(element));
        body.insert(field.to_owned(), Value::Array(items));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::new()
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn find_eq_preserves_insertion_order_and_limit(store: InMemoryDocumentStore) {
        for n in 0..3 {
            store
                .insert(Collection::Posts, doc(json!({"author_id": "a", "n": n})))
                .await
                .expect("insert");
        }
        store
            .insert(Collection::Posts, doc(json!({"author_id": "b", "n": 9})))
            .await
            .expect("insert");

        let all = store
            .find_eq(Collection::Posts, "author_id", &json!("a"), None)
            .await
            .expect("find");
        let ns: Vec<_> = all.iter().map(|d| d.body["n"].clone()).collect();
        assert_eq!(ns, vec![json!(0), json!(1), json!(2)]);

        let first = store
            .find_eq(Collection::Posts, "author_id", &json!("a"), Some(1))
            .await
            .expect("find");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].body["n"], json!(0));
        assert_eq!(store.list(Collection::Posts).await.expect("list").len(), 4);
        assert!(store.list(Collection::Users).await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn unique_insert_rejects_duplicates(store: InMemoryDocumentStore) {
        store
            .insert_unique(Collection::Users, "email", doc(json!({"email": "a@x.io"})))
            .await
            .expect("first insert");
        let err = store
            .insert_unique(Collection::Users, "email", doc(json!({"email": "a@x.io"})))
            .await
            .expect_err("duplicate");
        assert_eq!(err, DocumentStoreError::conflict("email"));
        assert_eq!(store.list(Collection::Users).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn concurrent_unique_inserts_admit_one_winner() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_unique(Collection::Users, "email", doc(json!({"email": "same@x.io"})))
                        .await
                })
            })
            .collect();
        let mut wins = 0;
        for task in tasks {
            if task.await.expect("join").is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn set_field_moves_the_unique_key(store: InMemoryDocumentStore) {
        let a = store
            .insert_unique(Collection::Users, "email", doc(json!({"email": "a@x.io"})))
            .await
            .expect("insert a");
        let b = store
            .insert_unique(Collection::Users, "email", doc(json!({"email": "b@x.io"})))
            .await
            .expect("insert b");

        let err = store
            .set_field(Collection::Users, &b, "email", json!("a@x.io"))
            .await
            .expect_err("taken");
        assert_eq!(err, DocumentStoreError::conflict("email"));

        store
            .set_field(Collection::Users, &a, "email", json!("c@x.io"))
            .await
            .expect("rename a");
        store
            .set_field(Collection::Users, &b, "email", json!("a@x.io"))
            .await
            .expect("old value is free again");
        store
            .set_field(Collection::Users, &b, "email", json!("a@x.io"))
            .await
            .expect("rewriting own value");
        let stored = store.get(Collection::Users, &b).await.expect("get");
        assert_eq!(stored.expect("exists").body["email"], json!("a@x.io"));
    }

    #[rstest]
    #[tokio::test]
    async fn array_operations_are_idempotent(store: InMemoryDocumentStore) {
        let handle = store
            .insert(Collection::Users, doc(json!({"name": "ada"})))
            .await
            .expect("insert");
        for _ in 0..2 {
            store
                .array_union(Collection::Users, &handle, "following", "h1")
                .await
                .expect("union");
        }
        store
            .array_union(Collection::Users, &handle, "following", "h2")
            .await
            .expect("union");
        let body = store
            .get(Collection::Users, &handle)
            .await
            .expect("get")
            .expect("exists")
            .body;
        assert_eq!(body["following"], json!(["h1", "h2"]));

        for _ in 0..2 {
            store
                .array_remove(Collection::Users, &handle, "following", "h1")
                .await
                .expect("remove");
        }
        let body = store
            .get(Collection::Users, &handle)
            .await
            .expect("get")
            .expect("exists")
            .body;
        assert_eq!(body["following"], json!(["h2"]));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_handles_are_missing(store: InMemoryDocumentStore) {
        let ghost = DocumentHandle::new("ghost");
        assert_eq!(store.get(Collection::Users, &ghost).await.expect("get"), None);
        let err = store
            .array_union(Collection::Users, &ghost, "following", "h1")
            .await
            .expect_err("missing");
        assert_eq!(err, DocumentStoreError::missing("ghost"));
        let err = store
            .set_field(Collection::Users, &ghost, "email", json!("x"))
            .await
            .expect_err("missing");
        assert_eq!(err, DocumentStoreError::missing("ghost"));
    }

    #[rstest]
    #[tokio::test]
    async fn non_array_fields_are_malformed(store: InMemoryDocumentStore) {
        let handle = store
            .insert(Collection::Users, doc(json!({"following": "oops"})))
            .await
            .expect("insert");
        let err = store
            .array_union(Collection::Users, &handle, "following", "h1")
            .await
            .expect_err("malformed");
        assert!(matches!(err, DocumentStoreError::Malformed { .. }));
        let body = store
            .get(Collection::Users, &handle)
            .await
            .expect("get")
            .expect("exists")
            .body;
        assert_eq!(body["following"], json!("oops"));
    }
}
