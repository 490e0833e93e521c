//! Internal Diesel row structs. Never exposed to the domain.

use diesel::prelude::*;
use serde_json::Value;

use super::schema::{document_unique_keys, documents};
use crate::domain::ports::{Document, DocumentHandle, DocumentStoreError, StoredDocument};

/// Row read from `documents`, either through the query builder or raw SQL.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentRow {
    pub handle: String,
    pub body: Value,
}

impl TryFrom<DocumentRow> for StoredDocument {
    type Error = DocumentStoreError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let body: Document = match row.body {
            Value::Object(map) => map,
            other => {
                return Err(DocumentStoreError::malformed(format!(
                    "document `{}` body is {other}, expected an object",
                    row.handle
                )));
            }
        };
        Ok(Self {
            handle: DocumentHandle::new(row.handle),
            body,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub handle: &'a str,
    pub collection: &'a str,
    pub body: &'a Value,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document_unique_keys)]
pub(crate) struct NewUniqueKeyRow<'a> {
    pub collection: &'a str,
    pub field: &'a str,
    pub value: &'a str,
    pub handle: &'a str,
}
