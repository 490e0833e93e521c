//! Error mapping shared by the Diesel adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::DocumentStoreError;

use super::pool::PoolError;

/// Map pool errors to store connection errors.
pub fn map_pool_error(error: PoolError) -> DocumentStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DocumentStoreError::connection(message)
        }
    }
}

/// What a failed statement was touching, used to give unique violations and
/// empty updates their domain meaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorContext<'a> {
    pub unique_field: Option<&'a str>,
    pub handle: Option<&'a str>,
}

impl<'a> ErrorContext<'a> {
    pub fn unique(field: &'a str) -> Self {
        Self {
            unique_field: Some(field),
            handle: None,
        }
    }

    pub fn handle(mut self, handle: &'a str) -> Self {
        self.handle = Some(handle);
        self
    }
}

/// Map Diesel errors to store errors.
///
/// `NotFound` becomes [`DocumentStoreError::Missing`] when the context names
/// a handle; a unique violation becomes [`DocumentStoreError::Conflict`] when
/// it names a unique field.
pub fn map_diesel_error(error: DieselError, context: ErrorContext<'_>) -> DocumentStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => match context.handle {
            Some(handle) => DocumentStoreError::missing(handle),
            None => DocumentStoreError::query("record not found"),
        },
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match context.unique_field {
                Some(field) => DocumentStoreError::conflict(field),
                None => DocumentStoreError::query(info.message().to_owned()),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DocumentStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) => DocumentStoreError::query(info.message().to_owned()),
        DieselError::DeserializationError(err) => DocumentStoreError::malformed(err.to_string()),
        _ => DocumentStoreError::query("database error"),
    }
}
