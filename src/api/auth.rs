use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{validate_display_name, validate_email, validate_login_id, validate_password};
use super::{ApiError, ApiJson, AppState, UserDto};
use crate::db::NewUser;
use crate::domain::Actor;
use crate::services::{RefreshedAccessToken, TokenKind, TokenPair};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    /// Login name
    pub user_id: String,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserDto,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <access token>` for an account that still
/// exists. The caller is attached to the request as an [`Actor`] built from the
/// stored row, and to the response so outer layers can see who made the request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let claims = state
        .tokens()
        .verify(&token, TokenKind::Access)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let user = state
        .store()
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    let actor = Actor::new(user.id, user.username, user.role);
    tracing::Span::current().record("user_id", actor.user_id.as_str());

    request.extensions_mut().insert(actor.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(actor);

    Ok(response)
}

/// Must run inside [`auth_middleware`].
pub async fn require_admin(
    Extension(actor): Extension<Actor>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    actor.ensure_admin("access the admin panel")?;
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_user = NewUser {
        login_id: validate_login_id(&payload.user_id)?.to_string(),
        username: validate_display_name("Username", &payload.username)?.to_string(),
        nickname: validate_display_name("Nickname", &payload.nickname)?.to_string(),
        email: validate_email(&payload.email)?.to_string(),
        password: validate_password(&payload.password)?.to_string(),
    };

    let user = state.auth_service().register(new_user).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// POST /auth/login
/// Returns an access token, a refresh token and the account
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(ApiError::validation("User id is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(payload.user_id.trim(), &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        tokens: result.tokens,
        user: result.user.into(),
    }))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RefreshTokenRequest>,
) -> Result<Json<RefreshedAccessToken>, ApiError> {
    if payload.refresh_token.trim().is_empty() {
        return Err(ApiError::validation("Refresh token is required"));
    }

    let refreshed = state
        .auth_service()
        .refresh(payload.refresh_token.trim())
        .await?;
    Ok(Json(refreshed))
}

/// POST /auth/logout
/// Revokes the given refresh token
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<RefreshTokenRequest>,
) -> Result<StatusCode, ApiError> {
    if payload.refresh_token.trim().is_empty() {
        return Err(ApiError::validation("Refresh token is required"));
    }

    state
        .auth_service()
        .logout(&actor.user_id, payload.refresh_token.trim())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.auth_service().profile(&actor.user_id).await?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_none());
    }
}
