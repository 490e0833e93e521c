//! Post model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UserId;

/// Validation errors for post content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyContent,
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "post content must not be empty"),
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Body text of a post. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostContent(String);

impl PostContent {
    /// Validate post text. Surrounding whitespace is preserved.
    pub fn new(content: impl Into<String>) -> Result<Self, PostValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        Ok(Self(content))
    }
}

impl AsRef<str> for PostContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PostContent> for String {
    fn from(value: PostContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostContent {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// An append-only post.
///
/// `author` is the author's display name at the time of writing; it is not
/// updated when the author later edits their name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub author: String,
    pub author_id: UserId,
    pub content: PostContent,
}
