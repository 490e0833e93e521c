//! Driving port for follow and unfollow.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// Domain use-case port for mutating follow edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowCommand: Send + Sync {
    /// `follower` starts following `followee`. Idempotent.
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<(), Error>;

    /// `follower` stops following `followee`. Idempotent.
    async fn unfollow(&self, follower: &UserId, followee: &UserId) -> Result<(), Error>;
}
