//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{Store, UniqueField, unique_violation};
use crate::db::repositories::user::hash_password;
use crate::domain::{Principal, UserId};
use crate::models::user::NewUser;
use crate::services::auth_service::{AuthError, AuthService, Registration, UserInfo};
use crate::services::validation;
use async_trait::async_trait;
use tokio::task;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn create_account(
        &self,
        registration: Registration,
        is_admin: bool,
    ) -> Result<Principal, AuthError> {
        let name = validation::require("Name", &registration.name).map_err(AuthError::Validation)?;
        let username =
            validation::require("Username", &registration.username).map_err(AuthError::Validation)?;
        let email = validation::validate_email(&registration.email).map_err(AuthError::Validation)?;
        validation::validate_password(&registration.password, self.security.min_password_length)
            .map_err(AuthError::Validation)?;

        if registration.password != registration.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        if self.store.get_user_by_username(&username).await?.is_some() {
            return Err(AuthError::DuplicateUsername);
        }
        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password = registration.password;
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AuthError::StorageConflict(format!("Hashing task failed: {e}")))??;

        let user = self
            .store
            .create_user(NewUser {
                name,
                email,
                username,
                password_hash,
                is_admin,
            })
            .await
            .map_err(|err| match unique_violation(&err) {
                Some(UniqueField::Username) => AuthError::DuplicateUsername,
                Some(UniqueField::Email) => AuthError::DuplicateEmail,
                _ => AuthError::from(err),
            })?;

        info!(user_id = %user.id, is_admin, "Registered user");
        Ok(user.principal())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let user = self
            .store
            .verify_credentials(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(user.principal())
    }

    async fn register(&self, registration: Registration) -> Result<Principal, AuthError> {
        self.create_account(registration, false).await
    }

    async fn register_admin(&self, registration: Registration) -> Result<Principal, AuthError> {
        self.create_account(registration, true).await
    }

    async fn principal_for(&self, user_id: UserId) -> Result<Option<Principal>, AuthError> {
        let user = self.store.get_user(user_id.value()).await?;
        Ok(user.map(|u| u.principal()))
    }

    async fn get_user_info(&self, user_id: UserId) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user(user_id.value())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo::from(user))
    }
}
