use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_id, validate_post_content, validate_prefix, validate_title};
use super::{ApiError, ApiJson, ApiPath, AppState, PostDto};
use crate::db::PostChanges;
use crate::domain::{Actor, PostPrefix};
use crate::services::PostDraft;

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub prefix: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub prefix: Option<String>,
    pub is_pinned: Option<bool>,
}

/// GET /boards
pub async fn list_posts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PostDto>>, ApiError> {
    let posts = state.board_service().list_posts().await?;
    Ok(Json(posts.into_iter().map(PostDto::from).collect()))
}

/// GET /boards/{id}
/// Counts as a view
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<PostDto>, ApiError> {
    let id = validate_id(id)?;
    let post = state.board_service().get_post(id).await?;
    Ok(Json(post.into()))
}

/// POST /boards
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let prefix = payload
        .prefix
        .as_deref()
        .map(validate_prefix)
        .transpose()?
        .unwrap_or(PostPrefix::General);

    let draft = PostDraft {
        title: validate_title(&payload.title)?.to_string(),
        content: validate_post_content(&payload.content)?.to_string(),
        prefix,
    };

    let post = state.board_service().create_post(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

/// PATCH /boards/{id}
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdatePostRequest>,
) -> Result<Json<PostDto>, ApiError> {
    let id = validate_id(id)?;

    let changes = PostChanges {
        title: payload
            .title
            .as_deref()
            .map(|t| validate_title(t).map(str::to_string))
            .transpose()?,
        content: payload
            .content
            .as_deref()
            .map(|c| validate_post_content(c).map(str::to_string))
            .transpose()?,
        prefix: payload.prefix.as_deref().map(validate_prefix).transpose()?,
        is_pinned: payload.is_pinned,
    };

    let post = state.board_service().update_post(&actor, id, changes).await?;
    Ok(Json(post.into()))
}

/// DELETE /boards/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id(id)?;
    state.board_service().delete_post(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
