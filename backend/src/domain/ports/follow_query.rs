//! Driving port for follow-edge membership.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// Domain use-case port for reading follow edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowQuery: Send + Sync {
    /// Whether `follower` follows `followee`.
    async fn is_following(&self, follower: &UserId, followee: &UserId) -> Result<bool, Error>;
}
