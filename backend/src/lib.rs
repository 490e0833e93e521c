//! postboard: accounts, follows and posts over a document store.
//!
//! Layout follows ports and adapters:
//! - [`domain`]: types, core services and the ports they depend on.
//! - [`inbound`]: the HTTP adapter (Actix Web).
//! - [`outbound`]: document stores, the profile cache and password hashing.
//! - [`settings`]: layered server settings.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// OpenAPI document used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
