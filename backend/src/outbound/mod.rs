//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: document stores (in-memory and PostgreSQL via Diesel)
//! - **cache**: `moka` profile cache
//! - **security**: argon2 password hashing
//!
//! Adapters translate between infrastructure types and domain types and hold
//! no business rules.

pub mod cache;
pub mod persistence;
pub mod security;
