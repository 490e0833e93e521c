//! PostgreSQL-backed [`DocumentStore`].
//!
//! Records live in one `documents` table as JSONB bodies. Unique fields are
//! enforced by `document_unique_keys`, written in the same transaction as the
//! document. Array set operations are single `UPDATE` statements, so the row
//! lock serialises concurrent writers to the same record.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Jsonb, Nullable, Text};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    Collection, Document, DocumentHandle, DocumentStore, DocumentStoreError, StoredDocument,
};

use super::diesel_helpers::{ErrorContext, map_diesel_error, map_pool_error};
use super::models::{DocumentRow, NewDocumentRow, NewUniqueKeyRow};
use super::pool::DbPool;
use super::schema::{document_unique_keys, documents};
use super::unique_key_text;

const SCHEMA_SQL: &str =
    include_str!("../../../migrations/2025-06-01-000000_create_documents/up.sql");

const FIND_EQ_SQL: &str = r#"
SELECT handle, body FROM documents
WHERE collection = $1 AND body @> jsonb_build_object($2::text, $3::jsonb)
ORDER BY seq
LIMIT $4
"#;

const SET_FIELD_SQL: &str = r#"
UPDATE documents
SET body = jsonb_set(body, ARRAY[$3::text], $4::jsonb, true)
WHERE collection = $1 AND handle = $2
"#;

const ARRAY_UNION_SQL: &str = r#"
UPDATE documents
SET body = jsonb_set(
    body,
    ARRAY[$3::text],
    CASE
        WHEN COALESCE(body -> $3::text, '[]'::jsonb) @> jsonb_build_array($4::text)
            THEN COALESCE(body -> $3::text, '[]'::jsonb)
        ELSE COALESCE(body -> $3::text, '[]'::jsonb) || jsonb_build_array($4::text)
    END,
    true
)
WHERE collection = $1 AND handle = $2
"#;

const ARRAY_REMOVE_SQL: &str = r#"
UPDATE documents
SET body = jsonb_set(body, ARRAY[$3::text], COALESCE(body -> $3::text, '[]'::jsonb) - $4::text, true)
WHERE collection = $1 AND handle = $2
"#;

/// Diesel-backed document store.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the tables and indexes if they do not exist yet.
    ///
    /// # Errors
    /// Connection or query errors from the database.
    pub async fn ensure_schema(&self) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.batch_execute(SCHEMA_SQL)
            .await
            .map_err(|err| map_diesel_error(err, ErrorContext::default()))?;
        info!("document schema ready");
        Ok(())
    }

    async fn update_by_handle(
        &self,
        sql: &'static str,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        element: &str,
    ) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let context = ErrorContext::default().handle(handle.as_str());
        let updated = sql_query(sql)
            .bind::<Text, _>(collection.as_str())
            .bind::<Text, _>(handle.as_str())
            .bind::<Text, _>(field)
            .bind::<Text, _>(element)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, context))?;
        if updated == 0 {
            return Err(DocumentStoreError::missing(handle.as_str()));
        }
        Ok(())
    }
}

fn new_handle() -> String {
    Uuid::new_v4().simple().to_string()
}

fn into_stored(rows: Vec<DocumentRow>) -> Result<Vec<StoredDocument>, DocumentStoreError> {
    rows.into_iter().map(StoredDocument::try_from).collect()
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn insert(
        &self,
        collection: Collection,
        body: Document,
    ) -> Result<DocumentHandle, DocumentStoreError> {
        let handle = new_handle();
        let body = Value::Object(body);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(documents::table)
            .values(&NewDocumentRow {
                handle: &handle,
                collection: collection.as_str(),
                body: &body,
            })
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, ErrorContext::default()))?;
        Ok(DocumentHandle::new(handle))
    }

    async fn insert_unique(
        &self,
        collection: Collection,
        unique_field: &str,
        body: Document,
    ) -> Result<DocumentHandle, DocumentStoreError> {
        let key = body.get(unique_field).map(unique_key_text).ok_or_else(|| {
            DocumentStoreError::query(format!("unique field `{unique_field}` is absent"))
        })?;
        let handle = new_handle();
        let body = Value::Object(body);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            let handle = handle.as_str();
            let body = &body;
            let key = key.as_str();
            async move {
                diesel::insert_into(documents::table)
                    .values(&NewDocumentRow {
                        handle,
                        collection: collection.as_str(),
                        body,
                    })
                    .execute(conn)
                    .await?;
                diesel::insert_into(document_unique_keys::table)
                    .values(&NewUniqueKeyRow {
                        collection: collection.as_str(),
                        field: unique_field,
                        value: key,
                        handle,
                    })
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, ErrorContext::unique(unique_field)))?;

        Ok(DocumentHandle::new(handle.clone()))
    }

    async fn find_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, DocumentStoreError> {
        let limit = limit.map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DocumentRow> = sql_query(FIND_EQ_SQL)
            .bind::<Text, _>(collection.as_str())
            .bind::<Text, _>(field)
            .bind::<Jsonb, _>(value)
            .bind::<Nullable<BigInt>, _>(limit)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, ErrorContext::default()))?;
        into_stored(rows)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<StoredDocument>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DocumentRow> = documents::table
            .filter(documents::collection.eq(collection.as_str()))
            .order(documents::seq.asc())
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, ErrorContext::default()))?;
        into_stored(rows)
    }

    async fn get(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
    ) -> Result<Option<StoredDocument>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DocumentRow> = documents::table
            .filter(documents::collection.eq(collection.as_str()))
            .filter(documents::handle.eq(handle.as_str()))
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, ErrorContext::default()))?;
        row.map(StoredDocument::try_from).transpose()
    }

    async fn set_field(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        value: Value,
    ) -> Result<(), DocumentStoreError> {
        let key = unique_key_text(&value);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            let value = &value;
            let key = key.as_str();
            async move {
                let updated = sql_query(SET_FIELD_SQL)
                    .bind::<Text, _>(collection.as_str())
                    .bind::<Text, _>(handle.as_str())
                    .bind::<Text, _>(field)
                    .bind::<Jsonb, _>(value)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Err(diesel::result::Error::NotFound);
                }
                diesel::update(
                    document_unique_keys::table
                        .filter(document_unique_keys::collection.eq(collection.as_str()))
                        .filter(document_unique_keys::field.eq(field))
                        .filter(document_unique_keys::handle.eq(handle.as_str())),
                )
                .set(document_unique_keys::value.eq(key))
                .execute(conn)
                .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, ErrorContext::unique(field).handle(handle.as_str())))
    }

    async fn array_union(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        element: &str,
    ) -> Result<(), DocumentStoreError> {
        self.update_by_handle(ARRAY_UNION_SQL, collection, handle, field, element)
            .await
    }

    async fn array_remove(
        &self,
        collection: Collection,
        handle: &DocumentHandle,
        field: &str,
        element: &str,
    ) -> Result<(), DocumentStoreError> {
        self.update_by_handle(ARRAY_REMOVE_SQL, collection, handle, field, element)
            .await
    }
}
