//! Post use-cases behind [`PostsCommand`] and [`PostsQuery`].

use async_trait::async_trait;

use super::identity_resolver::IdentityResolver;
use super::ports::{PostsCommand, PostsQuery};
use super::post_store::PostStore;
use super::{Error, Post, PostContent, UserId};

/// Publishes posts under the author's current name and lists them.
#[derive(Clone)]
pub struct PostService {
    posts: PostStore,
    resolver: IdentityResolver,
}

impl PostService {
    pub fn new(posts: PostStore, resolver: IdentityResolver) -> Self {
        Self { posts, resolver }
    }
}

#[async_trait]
impl PostsCommand for PostService {
    async fn publish(&self, author: &UserId, content: PostContent) -> Result<Post, Error> {
        let entry = self.resolver.resolve_profile(author).await?;
        let post = self
            .posts
            .create(content, entry.profile.display_name(), author)
            .await?;
        Ok(post)
    }
}

#[async_trait]
impl PostsQuery for PostService {
    async fn all_posts(&self) -> Result<Vec<Post>, Error> {
        Ok(self.posts.list_all().await?)
    }

    async fn posts_by(&self, author: &UserId) -> Result<Vec<Post>, Error> {
        if !self.resolver.exists(author).await? {
            return Err(Error::not_found("user not found"));
        }
        Ok(self.posts.list_by_author(author).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::test_support::seed_account;
    use crate::outbound::persistence::InMemoryDocumentStore;

    #[tokio::test]
    async fn publish_stamps_the_author_name() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let author = seed_account(store.as_ref(), "ada@example.com").await;
        let resolver = IdentityResolver::new(store.clone());
        let service = PostService::new(PostStore::new(store), resolver);

        let post = service
            .publish(&author.id, PostContent::new("hello").expect("content"))
            .await
            .expect("publish");
        assert_eq!(post.author, "ada Seeded");
        assert_eq!(post.author_id, author.id);
        assert_eq!(service.posts_by(&author.id).await.expect("list"), vec![post]);
    }

    #[tokio::test]
    async fn unknown_authors_cannot_publish_or_be_listed() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let resolver = IdentityResolver::new(store.clone());
        let service = PostService::new(PostStore::new(store), resolver);
        let ghost = UserId::random();

        let err = service
            .publish(&ghost, PostContent::new("boo").expect("content"))
            .await
            .expect_err("unknown author");
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err = service.posts_by(&ghost).await.expect_err("unknown author");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(service.all_posts().await.expect("list").is_empty());
    }
}
