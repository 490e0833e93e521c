//! Driving port for profile lookups.

use async_trait::async_trait;

use crate::domain::{Error, Profile, UserId};

/// Profile page as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub id: UserId,
    pub name: String,
    /// The viewer is looking at their own profile.
    pub is_me: bool,
    /// The viewer follows this user. Always false on one's own profile.
    pub is_following: bool,
}

/// Domain use-case port for reading profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Public profile of `id`.
    async fn profile(&self, id: &UserId) -> Result<Profile, Error>;

    /// Profile of `target` annotated for `viewer`.
    async fn view_profile(&self, viewer: &UserId, target: &UserId) -> Result<ProfileView, Error>;
}
