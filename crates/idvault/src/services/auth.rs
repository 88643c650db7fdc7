use std::collections::BTreeSet;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;

use crate::{
    AppError, FieldError, InboundUser, LoginError, MIN_PASSWORD_LEN, MemStore, NewUser,
    RegistrationError, User, hash_password, is_valid_username,
};

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register_user(&self, inbound: InboundUser) -> Result<User, RegistrationError>;
    async fn login(&self, username: &str, password: &str) -> Result<User, LoginError>;
    async fn get_user_info(&self, user_id: u64) -> Result<Option<User>, AppError>;
    /// Create a user holding the admin role. Only reachable from process startup.
    async fn create_admin(&self, username: &str, password: &str)
    -> Result<User, RegistrationError>;
}

#[async_trait]
impl AuthService for MemStore {
    #[tracing::instrument(skip(self, inbound), fields(username = %inbound.username))]
    async fn register_user(&self, inbound: InboundUser) -> Result<User, RegistrationError> {
        let new_user = tokio::task::spawn_blocking(move || NewUser::try_from(inbound))
            .await
            .map_err(AppError::from)??;

        let user = self
            .insert_user(new_user)
            .await
            .ok_or(RegistrationError::UsernameExists)?;

        tracing::info!(user_id = user.id, "registered user");
        Ok(user)
    }

    #[tracing::instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<User, LoginError> {
        tracing::info!("logging in user");
        let user = self
            .get_user_by_username(username.trim())
            .await
            .ok_or(LoginError::NoSuchUser)?;

        let stored = user.password.clone();
        let password = password.to_string();
        let is_correct = tokio::task::spawn_blocking(move || {
            let password_hash =
                PasswordHash::new(&stored).map_err(|e| AppError::ArgonError(e.to_string()))?;
            Ok::<_, AppError>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &password_hash)
                    .is_ok(),
            )
        })
        .await
        .map_err(AppError::from)??;

        if is_correct {
            Ok(user)
        } else {
            Err(LoginError::InvalidPassword)
        }
    }

    async fn get_user_info(&self, user_id: u64) -> Result<Option<User>, AppError> {
        Ok(self.get_user(user_id).await)
    }

    #[tracing::instrument(skip(self, password))]
    async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, RegistrationError> {
        let mut fields = Vec::new();
        if !is_valid_username(username) {
            fields.push(FieldError::new("username", "Username is required"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            fields.push(FieldError::new(
                "password",
                "Password must be at least 8 characters",
            ));
        }
        if !fields.is_empty() {
            return Err(RegistrationError::Invalid(fields));
        }

        let password = password.to_string();
        let password = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(AppError::from)??;

        let new_user = NewUser {
            username: username.trim().to_string(),
            password,
            is_admin: true,
            full_name: "Administrator".to_string(),
            date_of_birth: String::new(),
            nationality: String::new(),
            languages: BTreeSet::new(),
        };

        let user = self
            .insert_user(new_user)
            .await
            .ok_or(RegistrationError::UsernameExists)?;

        tracing::info!(user_id = user.id, "created admin");
        Ok(user)
    }
}
