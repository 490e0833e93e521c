//! Append-only post storage in the `posts` collection.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::ports::{Collection, DocumentStore, StoredDocument, decode_document, encode_document};
use super::{Post, PostContent, SocialError, UserId};

const AUTHOR_ID_FIELD: &str = "author_id";

/// Creates and lists posts.
#[derive(Clone)]
pub struct PostStore {
    store: Arc<dyn DocumentStore>,
}

impl PostStore {
    /// Build a post store over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append a post. There is no deduplication.
    pub async fn create(
        &self,
        content: PostContent,
        author_display_name: impl Into<String>,
        author_id: &UserId,
    ) -> Result<Post, SocialError> {
        let post = Post {
            author: author_display_name.into(),
            author_id: author_id.clone(),
            content,
        };
        let handle = self
            .store
            .insert(Collection::Posts, encode_document(&post)?)
            .await?;
        info!(author_id = %author_id, %handle, "post created");
        Ok(post)
    }

    /// Every post, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Post>, SocialError> {
        let stored = self.store.list(Collection::Posts).await?;
        decode_posts(&stored)
    }

    /// Posts written by `author_id`, oldest first.
    pub async fn list_by_author(&self, author_id: &UserId) -> Result<Vec<Post>, SocialError> {
        let key = Value::String(author_id.as_ref().to_owned());
        let stored = self
            .store
            .find_eq(Collection::Posts, AUTHOR_ID_FIELD, &key, None)
            .await?;
        decode_posts(&stored)
    }
}

fn decode_posts(stored: &[StoredDocument]) -> Result<Vec<Post>, SocialError> {
    stored
        .iter()
        .map(|doc| decode_document::<Post>(&doc.body).map_err(SocialError::from))
        .collect()
}
