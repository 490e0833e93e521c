//! Validated signup and login payloads.
//!
//! Handlers parse raw JSON into these types before calling a service, so
//! services only ever see well-formed input. Passwords live in
//! [`Zeroizing`] buffers and are wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, PersonName, UserValidationError};

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Why a signup or login payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email missing or not shaped like an address.
    InvalidEmail,
    /// Password was empty.
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN_LEN`].
    PasswordTooShort { min: usize },
    /// Password and confirmation differ.
    PasswordMismatch,
    /// First or last name blank.
    EmptyName { field: &'static str },
}

impl CredentialsValidationError {
    /// Payload field the error refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "email",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
            Self::PasswordMismatch => "confirmPassword",
            Self::EmptyName { field } => *field,
        }
    }

    /// Stable machine-readable code for the failure.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "invalid_email",
            Self::EmptyPassword => "empty_password",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordMismatch => "password_mismatch",
            Self::EmptyName { .. } => "empty_name",
        }
    }
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must look like name@domain"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::EmptyName { field } => write!(f, "{field} must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(err: UserValidationError) -> Self {
        match err {
            UserValidationError::EmptyName { field } => Self::EmptyName { field },
            UserValidationError::InvalidEmail
            | UserValidationError::EmptyId
            | UserValidationError::InvalidId => Self::InvalidEmail,
        }
    }
}

/// Email and password presented at login.
///
/// # Examples
/// ```
/// use postboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com", "hunter22").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "hunter22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw login input. Only presence is checked for the password.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised login email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password exactly as supplied.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw signup input, borrowed from the request body.
#[derive(Debug, Clone, Copy)]
pub struct SignupInput<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Validated signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDetails {
    email: EmailAddress,
    password: Zeroizing<String>,
    first_name: PersonName,
    last_name: PersonName,
}

impl SignupDetails {
    /// Validate signup input: a well-formed email, a password of at least
    /// [`PASSWORD_MIN_LEN`] characters matching its confirmation, and
    /// non-blank names.
    pub fn parse(input: SignupInput<'_>) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(input.email)?;
        if input.password != input.confirm_password {
            return Err(CredentialsValidationError::PasswordMismatch);
        }
        if input.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(CredentialsValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        let first_name = PersonName::parse(input.first_name, "firstName")?;
        let last_name = PersonName::parse(input.last_name, "lastName")?;
        Ok(Self {
            email,
            password: Zeroizing::new(input.password.to_owned()),
            first_name,
            last_name,
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }
}
