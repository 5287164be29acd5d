//! Domain service for authentication and registration.
//!
//! Produces the [`Principal`] that every other service takes explicitly.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Principal, UserId};
use crate::models::user::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage conflict: {0}")]
    StorageConflict(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageConflict(err.to_string())
    }
}

/// Registration form fields, as submitted.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Public profile of the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the caller's principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or a
    /// wrong password; the two cases are indistinguishable to the caller.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError>;

    /// Creates a regular (non-privileged) account and signs it in.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for empty fields or a malformed email
    /// - [`AuthError::PasswordMismatch`] when the confirmation differs
    /// - [`AuthError::DuplicateUsername`] / [`AuthError::DuplicateEmail`]
    async fn register(&self, registration: Registration) -> Result<Principal, AuthError>;

    /// Creates a privileged account. Used by the `create-admin` command.
    async fn register_admin(&self, registration: Registration) -> Result<Principal, AuthError>;

    /// Rebuilds a principal from the current user row, or `None` if the user
    /// no longer exists.
    async fn principal_for(&self, user_id: UserId) -> Result<Option<Principal>, AuthError>;

    async fn get_user_info(&self, user_id: UserId) -> Result<UserInfo, AuthError>;
}
