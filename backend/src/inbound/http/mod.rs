//! HTTP inbound adapter: JSON endpoints under `/api/v1`, health probes and
//! the cookie session plumbing they share.

pub mod accounts;
pub mod error;
pub mod health;
pub mod posts;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;

pub use error::json_error_handler;
