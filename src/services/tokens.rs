//! Signs and verifies the HS256 access and refresh tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AuthConfig;
use crate::db::User;
use crate::domain::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub typ: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    Invalid,

    #[error("Expected a {expected:?} token")]
    WrongKind { expected: TokenKind },

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// A refresh token together with the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    audience: Option<String>,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: config.access_token_ttl_seconds,
            refresh_ttl: config.refresh_token_ttl_seconds,
        }
    }

    /// Access token lifetime in seconds.
    #[must_use]
    pub const fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub fn issue_access(&self, user: &User) -> Result<String, TokenError> {
        let (token, _) = self.sign(user, TokenKind::Access, self.access_ttl)?;
        Ok(token)
    }

    pub fn issue_refresh(&self, user: &User) -> Result<IssuedRefreshToken, TokenError> {
        let (token, expires_at) = self.sign(user, TokenKind::Refresh, self.refresh_ttl)?;
        Ok(IssuedRefreshToken { token, expires_at })
    }

    fn sign(
        &self,
        user: &User,
        kind: TokenKind,
        ttl_seconds: i64,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(ttl_seconds);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            typ: kind,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        debug!(user_id = %user.id, kind = ?kind, "Signing token");

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok((token, expires_at))
    }

    /// Checks signature, expiry, issuer, audience and the token kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(audience) = &self.audience {
            validation.set_audience(&[audience]);
        } else {
            validation.validate_aud = false;
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                TokenError::Invalid
            })?
            .claims;

        if claims.typ != expected {
            return Err(TokenError::WrongKind { expected });
        }

        Ok(claims)
    }
}
