use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_comment, validate_id};
use super::{ApiError, ApiJson, ApiPath, AppState};
use crate::domain::Actor;
use crate::services::CommentNode;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// GET /boards/{id}/comments
/// Returns the comment tree
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<Json<Vec<CommentNode>>, ApiError> {
    let post_id = validate_id(post_id)?;
    let comments = state.comment_service().list_comments(post_id).await?;
    Ok(Json(comments))
}

/// POST /boards/{id}/comments
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath(post_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = validate_id(post_id)?;
    let content = validate_comment(&payload.content)?.to_string();
    let parent_id = payload.parent_id.map(validate_id).transpose()?;

    let comment = state
        .comment_service()
        .create_comment(&actor, post_id, content, parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /boards/{id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath((post_id, comment_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<UpdateCommentRequest>,
) -> Result<Json<CommentNode>, ApiError> {
    let content = validate_comment(&payload.content)?.to_string();

    let comment = state
        .comment_service()
        .update_comment(&actor, validate_id(post_id)?, validate_id(comment_id)?, content)
        .await?;
    Ok(Json(comment))
}

/// DELETE /boards/{id}/comments/{comment_id}
/// Replies to the deleted comment move to the top level
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath((post_id, comment_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state
        .comment_service()
        .delete_comment(&actor, validate_id(post_id)?, validate_id(comment_id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
