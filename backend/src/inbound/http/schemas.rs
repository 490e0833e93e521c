//! Response shapes shared by several handler modules.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Post;

/// A post as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Author display name when the post was written.
    #[schema(example = "Ada Lovelace")]
    pub author: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub author_id: String,
    #[schema(example = "Hello, world")]
    pub content: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            author: post.author,
            author_id: post.author_id.to_string(),
            content: post.content.into(),
        }
    }
}

/// Acknowledgement body for follow and unfollow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "success")]
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_owned(),
        }
    }
}
