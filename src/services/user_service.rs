//! Profile management for `/me` and the admin user panel.

use thiserror::Error;

use crate::db::{User, UserChanges};
use crate::domain::{Actor, Forbidden};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(#[from] Forbidden),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<User, UserError>;

    /// All accounts, newest first.
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Applies profile changes. Changing the role requires ADMIN.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Conflict`] if the new email belongs to another user.
    async fn update_user(
        &self,
        actor: &Actor,
        id: &str,
        changes: UserChanges,
    ) -> Result<User, UserError>;

    /// Only the account holder may change their own password.
    async fn change_password(
        &self,
        actor: &Actor,
        id: &str,
        change: PasswordChange,
    ) -> Result<(), UserError>;

    async fn delete_user(&self, actor: &Actor, id: &str) -> Result<(), UserError>;
}
