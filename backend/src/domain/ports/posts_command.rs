//! Driving port for publishing posts.

use async_trait::async_trait;

use crate::domain::{Error, Post, PostContent, UserId};

/// Domain use-case port for writing posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostsCommand: Send + Sync {
    /// Publish `content` as `author`. The author's current display name is
    /// stamped onto the post.
    async fn publish(&self, author: &UserId, content: PostContent) -> Result<Post, Error>;
}
