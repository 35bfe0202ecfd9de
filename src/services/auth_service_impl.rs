//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::SecondsFormat;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::user::{hash_secret, verify_secret};
use crate::db::{NewUser, Store, User};
use crate::entities::refresh_tokens;
use crate::services::auth_service::{
    AuthError, AuthService, LoginResult, RefreshedAccessToken, TokenPair,
};
use crate::services::tokens::{TokenError, TokenIssuer, TokenKind};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenIssuer>,
    security: SecurityConfig,
    /// Hash with the configured params, checked when the login id is unknown
    /// so that path costs the same as a real password check.
    dummy_hash: OnceCell<String>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenIssuer>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
            dummy_hash: OnceCell::const_new(),
        }
    }

    async fn dummy_hash(&self) -> Result<&str, AuthError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| hash_secret(uuid::Uuid::new_v4().to_string(), &self.security))
            .await?;
        Ok(hash)
    }

    /// Linear scan of the user's active tokens for one whose hash matches.
    async fn find_stored_token(
        &self,
        user_id: &str,
        presented: &str,
    ) -> Result<Option<refresh_tokens::Model>, AuthError> {
        let candidates = self.store.refresh_token_repo().list_active(user_id).await?;

        for candidate in candidates {
            if verify_secret(presented.to_string(), candidate.token_hash.clone()).await? {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::WrongKind { .. } => Self::InvalidToken,
            TokenError::Signing(msg) => Self::Internal(msg),
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        let repo = self.store.user_repo();

        if repo.login_id_exists(&new_user.login_id).await? {
            return Err(AuthError::Conflict("Login id is already in use".to_string()));
        }
        if repo.find_id_by_email(&new_user.email).await?.is_some() {
            return Err(AuthError::Conflict("Email is already in use".to_string()));
        }

        let user = repo.create(new_user, &self.security).await?;
        info!(user_id = %user.id, login_id = %user.login_id, "User registered");
        Ok(user)
    }

    async fn login(&self, login_id: &str, password: &str) -> Result<LoginResult, AuthError> {
        let credentials = self.store.user_repo().get_credentials(login_id).await?;

        let Some((user, password_hash)) = credentials else {
            let dummy = self.dummy_hash().await?.to_string();
            verify_secret(password.to_string(), dummy).await?;
            warn!(login_id = %login_id, "Login failed: unknown login id");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_secret(password.to_string(), password_hash).await? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access(&user)?;
        let refresh = self.tokens.issue_refresh(&user)?;

        let token_repo = self.store.refresh_token_repo();
        let pruned = token_repo.delete_expired(&user.id).await?;
        if pruned > 0 {
            debug!(user_id = %user.id, pruned, "Expired refresh tokens removed");
        }

        let token_hash = hash_secret(refresh.token.clone(), &self.security).await?;
        token_repo
            .store(
                &user.id,
                token_hash,
                refresh
                    .expires_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            )
            .await?;

        self.store.user_repo().record_login(&user.id).await?;

        // Reload so `last_login_at` reflects this login
        let user = self
            .store
            .get_user(&user.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginResult {
            tokens: TokenPair {
                access_token,
                refresh_token: refresh.token,
                access_token_expires_in: self.tokens.access_ttl(),
            },
            user,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccessToken, AuthError> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;

        let stored = self
            .find_stored_token(&claims.sub, refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        debug!(user_id = %claims.sub, token_id = stored.id, "Refresh token matched");

        // Current name and role, not the ones captured at login
        let user = self
            .store
            .get_user(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let access_token = self.tokens.issue_access(&user)?;

        Ok(RefreshedAccessToken {
            access_token,
            access_token_expires_in: self.tokens.access_ttl(),
        })
    }

    async fn logout(&self, user_id: &str, refresh_token: &str) -> Result<(), AuthError> {
        let stored = self
            .find_stored_token(user_id, refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        self.store.refresh_token_repo().revoke(stored.id).await?;
        info!(user_id = %user_id, token_id = stored.id, "Refresh token revoked");
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    #[tokio::test]
    async fn dummy_hash_uses_configured_params() {
        let db_path =
            std::env::temp_dir().join(format!("recipebox-auth-{}.db", uuid::Uuid::new_v4()));
        let store = Store::with_pool_options(&format!("sqlite:{}", db_path.display()), 1, 1)
            .await
            .unwrap();
        let tokens = Arc::new(TokenIssuer::new(&AuthConfig {
            jwt_secret: "x".repeat(40),
            ..AuthConfig::default()
        }));
        let security = SecurityConfig {
            argon2_memory_cost_kib: 64,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        let service = SeaOrmAuthService::new(store, tokens, security);

        let first = service.dummy_hash().await.unwrap().to_string();
        assert!(first.contains("m=64,t=1,p=1"), "{first}");
        assert_eq!(service.dummy_hash().await.unwrap(), first);
    }
}
