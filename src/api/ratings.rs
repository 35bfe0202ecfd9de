use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_id, validate_score};
use super::{
    ApiError, ApiJson, ApiPath, AppState, RatingDto, RatingSummaryDto, RatingWriteResponse,
};
use crate::domain::Actor;
use crate::services::{MyRating, RatingInput};

#[derive(Deserialize)]
pub struct RatingRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

impl RatingRequest {
    fn into_input(self) -> Result<RatingInput, ApiError> {
        Ok(RatingInput {
            score: validate_score(self.rating)?,
            comment: self
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }
}

/// POST /boards/{id}/rating
/// Creates or replaces the caller's rating
pub async fn rate_post(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath(post_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<RatingRequest>,
) -> Result<Json<RatingWriteResponse>, ApiError> {
    let post_id = validate_id(post_id)?;
    let input = payload.into_input()?;

    let (rating, summary) = state
        .rating_service()
        .rate_post(&actor, post_id, input)
        .await?;

    Ok(Json(RatingWriteResponse {
        rating: RatingDto::new(rating, Some(actor.username)),
        average_rating: summary.average,
        rating_count: summary.count,
    }))
}

/// GET /boards/{id}/rating
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<Json<RatingSummaryDto>, ApiError> {
    let summary = state
        .rating_service()
        .get_summary(validate_id(post_id)?)
        .await?;
    Ok(Json(summary.into()))
}

/// GET /boards/{id}/rating/all
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<Json<Vec<RatingDto>>, ApiError> {
    let ratings = state
        .rating_service()
        .list_ratings(validate_id(post_id)?)
        .await?;
    Ok(Json(ratings.into_iter().map(RatingDto::from).collect()))
}

/// GET /boards/{id}/rating/my
pub async fn get_my_rating(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<Json<MyRating>, ApiError> {
    let mine = state
        .rating_service()
        .get_my_rating(&actor, validate_id(post_id)?)
        .await?;
    Ok(Json(mine))
}

/// DELETE /boards/{id}/rating
pub async fn delete_my_rating(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state
        .rating_service()
        .delete_my_rating(&actor, validate_id(post_id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /boards/{id}/ratings/{rating_id}
pub async fn update_rating(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath((post_id, rating_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<RatingRequest>,
) -> Result<Json<RatingWriteResponse>, ApiError> {
    let input = payload.into_input()?;

    let (record, summary) = state
        .rating_service()
        .update_rating(&actor, validate_id(post_id)?, validate_id(rating_id)?, input)
        .await?;

    Ok(Json(RatingWriteResponse {
        rating: record.into(),
        average_rating: summary.average,
        rating_count: summary.count,
    }))
}

/// DELETE /boards/{id}/ratings/{rating_id}
pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ApiPath((post_id, rating_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state
        .rating_service()
        .delete_rating(&actor, validate_id(post_id)?, validate_id(rating_id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
