//! Failures raised by the social core services.

use thiserror::Error;
use tracing::error;

use super::Error;
use super::ports::DocumentStoreError;

/// Typed failure of an identity, account, follow-graph or post operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocialError {
    /// The addressed user (or other entity) does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    /// A record with the same unique key already exists.
    #[error("{entity} already exists")]
    AlreadyExists { entity: &'static str },
    /// A user tried to follow or unfollow themselves.
    #[error("users cannot follow themselves")]
    SelfFollowRejected,
    /// Exactly one side of a two-sided edge write failed; the other stayed.
    #[error("edge update applied to one side only: {message}")]
    PartialMutationFailure { message: String },
    /// The store could not be reached. Retrying may succeed.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },
    /// The store rejected a query or returned data that could not be decoded.
    #[error("store failure: {message}")]
    Store { message: String },
}

impl SocialError {
    /// `NotFound` for a user.
    pub const fn user_not_found() -> Self {
        Self::NotFound { entity: "user" }
    }

    /// Whether retrying the same call may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

impl From<DocumentStoreError> for SocialError {
    fn from(err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::Connection { message } => Self::StoreUnavailable { message },
            DocumentStoreError::Missing { .. } => Self::user_not_found(),
            DocumentStoreError::Conflict { .. } => Self::AlreadyExists { entity: "user" },
            other @ (DocumentStoreError::Query { .. } | DocumentStoreError::Malformed { .. }) => {
                Self::Store {
                    message: other.to_string(),
                }
            }
        }
    }
}

impl From<SocialError> for Error {
    fn from(err: SocialError) -> Self {
        match &err {
            SocialError::NotFound { .. } => Error::not_found(err.to_string()),
            SocialError::AlreadyExists { .. } => Error::conflict(err.to_string()),
            SocialError::SelfFollowRejected => Error::invalid_request(err.to_string()),
            SocialError::StoreUnavailable { message } => {
                error!(error = %message, "document store unavailable");
                Error::service_unavailable("store temporarily unavailable")
            }
            SocialError::PartialMutationFailure { .. } | SocialError::Store { .. } => {
                error!(error = %err, "social operation failed");
                Error::internal(err.to_string())
            }
        }
    }
}
