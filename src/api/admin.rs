//! ADMIN-only user management. Mounted behind [`super::auth::require_admin`].

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::me::UpdateProfileRequest;
use super::{ApiError, ApiJson, ApiPath, AppState, UserDto};
use crate::domain::{Actor, Role};

#[derive(Deserialize)]
pub struct AdminUpdateUserRequest {
    #[serde(flatten)]
    pub profile: UpdateProfileRequest,
    pub role: Option<Role>,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.user_service().list_users().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// GET /admin/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.user_service().get_user(&id).await?;
    Ok(Json(user.into()))
}

/// PUT /admin/users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<String>,
    ApiJson(payload): ApiJson<AdminUpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let mut changes = payload.profile.into_changes()?;
    changes.role = payload.role;

    let user = state.user_service().update_user(&actor, &id, changes).await?;
    Ok(Json(user.into()))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    state.user_service().delete_user(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
