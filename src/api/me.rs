use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_display_name, validate_email, validate_password};
use super::{ApiError, ApiJson, AppState, UserDto};
use crate::db::UserChanges;
use crate::domain::Actor;
use crate::services::PasswordChange;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub(super) fn into_changes(self) -> Result<UserChanges, ApiError> {
        Ok(UserChanges {
            username: self
                .username
                .as_deref()
                .map(|v| validate_display_name("Username", v).map(str::to_string))
                .transpose()?,
            nickname: self
                .nickname
                .as_deref()
                .map(|v| validate_display_name("Nickname", v).map(str::to_string))
                .transpose()?,
            email: self
                .email
                .as_deref()
                .map(|v| validate_email(v).map(str::to_string))
                .transpose()?,
            role: None,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// GET /me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.user_service().get_user(&actor.user_id).await?;
    Ok(Json(user.into()))
}

/// PATCH /me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let changes = payload.into_changes()?;
    let user = state
        .user_service()
        .update_user(&actor, &actor.user_id, changes)
        .await?;
    Ok(Json(user.into()))
}

/// PUT /me/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if payload.current_password.is_empty() {
        return Err(ApiError::validation("Current password is required"));
    }
    validate_password(&payload.new_password)?;

    state
        .user_service()
        .change_password(
            &actor,
            &actor.user_id,
            PasswordChange {
                current_password: payload.current_password,
                new_password: payload.new_password,
                confirm_password: payload.confirm_password,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /me
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service()
        .delete_user(&actor, &actor.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
