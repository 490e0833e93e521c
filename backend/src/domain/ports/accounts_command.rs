//! Driving port for account use-cases: signup, login and profile edits.

use async_trait::async_trait;

use crate::domain::{
    EmailAddress, Error, LoginCredentials, PersonName, Profile, SignupDetails, UserId,
};

/// Field overwrites requested by the account owner. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<EmailAddress>,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
}

impl ProfileUpdate {
    /// Whether no field is being changed.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

/// Domain use-case port for account lifecycle operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Register a new account and return its opaque id.
    async fn signup(&self, details: &SignupDetails) -> Result<UserId, Error>;

    /// Check credentials and return the caller's profile.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Profile, Error>;

    /// Apply `update` to the account `id` and return the refreshed profile.
    async fn update_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<Profile, Error>;
}
