//! Driving port for reading posts.

use async_trait::async_trait;

use crate::domain::{Error, Post, UserId};

/// Domain use-case port for listing posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostsQuery: Send + Sync {
    /// Every post, oldest first.
    async fn all_posts(&self) -> Result<Vec<Post>, Error>;

    /// Posts by `author`, oldest first. Fails `not_found` for unknown authors.
    async fn posts_by(&self, author: &UserId) -> Result<Vec<Post>, Error>;
}
