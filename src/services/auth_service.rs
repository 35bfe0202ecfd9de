//! Domain service for registration, login and the refresh-token lifecycle.

use serde::Serialize;
use thiserror::Error;

use crate::db::{NewUser, User};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired refresh token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Token pair returned by a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub tokens: TokenPair,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedAccessToken {
    pub access_token: String,
    pub access_token_expires_in: i64,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a USER account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the login id or email is taken.
    async fn register(&self, new_user: NewUser) -> Result<User, AuthError>;

    /// Verifies credentials, records the login and issues both tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, login_id: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Mints a new access token from a stored, unrevoked refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccessToken, AuthError>;

    /// Revokes one of the caller's refresh tokens.
    async fn logout(&self, user_id: &str, refresh_token: &str) -> Result<(), AuthError>;

    async fn profile(&self, user_id: &str) -> Result<User, AuthError>;
}
