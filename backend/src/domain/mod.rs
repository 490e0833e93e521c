//! Domain model and the social core.
//!
//! Purpose: define strongly typed entities and the services that keep the
//! follow graph, accounts and posts consistent on top of a document store.
//! Services depend only on the ports in [`ports`]; adapters live in
//! `outbound` and `inbound`.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic API error payload.
//! - SocialError: typed failures of the core services.
//! - IdentityResolver, AccountStore, FollowGraph, PostStore: core components.
//! - AccountService, PostService: driving port implementations.

pub mod account_service;
pub mod account_store;
pub mod auth;
pub mod error;
pub mod follow_graph;
pub mod identity_resolver;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod post_store;
pub mod social_error;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::account_service::AccountService;
pub use self::account_store::AccountStore;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN_LEN, SignupDetails, SignupInput,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::follow_graph::FollowGraph;
pub use self::identity_resolver::IdentityResolver;
pub use self::post::{Post, PostContent, PostValidationError};
pub use self::post_service::PostService;
pub use self::post_store::PostStore;
pub use self::social_error::SocialError;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Account, AccountField, EmailAddress, PasswordHash, PersonName, Profile, UserId,
    UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use postboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::unauthorized("login required"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
