//! User service.

use common::{NewUser, User, UserChanges, UserId};
use store::{Page, Store};

use crate::error::DomainError;

use super::{CreateUser, ListUsers, Login, UpdateUser};

/// Service for managing users and verifying credentials.
///
/// Hashing runs on the blocking thread pool.
#[derive(Clone)]
pub struct UserService<S: Store> {
    store: S,
    bcrypt_cost: u32,
}

impl<S: Store> UserService<S> {
    /// Creates a service hashing with [`bcrypt::DEFAULT_COST`].
    pub fn new(store: S) -> Self {
        Self::with_cost(store, bcrypt::DEFAULT_COST)
    }

    /// Creates a service with an explicit bcrypt cost.
    pub fn with_cost(store: S, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let cost = self.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, DomainError> {
        Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, query: ListUsers) -> Result<Page<User>, DomainError> {
        Ok(self.store.find_all_users(&query.0).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<User, DomainError> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    #[tracing::instrument(skip(self, cmd), fields(username = %cmd.username))]
    pub async fn create(&self, cmd: CreateUser) -> Result<User, DomainError> {
        let password_hash = self.hash_password(cmd.password).await?;
        let user = self
            .store
            .create_user(NewUser {
                username: cmd.username,
                email: cmd.email,
                password_hash,
                full_name: cmd.full_name,
                role: cmd.role,
            })
            .await?;

        metrics::counter!("users_created_total").increment(1);
        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[tracing::instrument(skip(self, cmd))]
    pub async fn update(&self, id: UserId, cmd: UpdateUser) -> Result<User, DomainError> {
        let password_hash = match cmd.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };
        let changes = UserChanges {
            username: cmd.username,
            email: cmd.email,
            password_hash,
            full_name: cmd.full_name,
            role: cmd.role,
        };

        let user = self
            .store
            .update_user(id, changes)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;
        metrics::counter!("users_updated_total").increment(1);
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        if !self.store.delete_user(id).await? {
            return Err(DomainError::not_found("User", id));
        }
        metrics::counter!("users_deleted_total").increment(1);
        Ok(())
    }

    /// Verifies credentials and stamps `last_login_at`.
    ///
    /// Unknown email, wrong password and inactive account all fail with
    /// [`DomainError::InvalidCredentials`].
    #[tracing::instrument(skip(self, cmd), fields(email = %cmd.email))]
    pub async fn login(&self, cmd: Login) -> Result<User, DomainError> {
        let Some(user) = self.store.find_user_by_email(&cmd.email).await? else {
            metrics::counter!("user_logins_total", "outcome" => "failure").increment(1);
            return Err(DomainError::InvalidCredentials);
        };

        let valid = user.is_active
            && self
                .verify_password(cmd.password, user.password_hash.clone())
                .await?;
        if !valid {
            metrics::counter!("user_logins_total", "outcome" => "failure").increment(1);
            tracing::warn!(user_id = %user.id, "login rejected");
            return Err(DomainError::InvalidCredentials);
        }

        let user = self
            .store
            .record_login(user.id)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;
        metrics::counter!("user_logins_total", "outcome" => "success").increment(1);
        Ok(user)
    }
}
