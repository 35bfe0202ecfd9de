use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::request::Parts,
};
use serde::Serialize;

use super::ApiError;
use crate::db::{PostRecord, RatingRecord, RatingSummary, User};
use crate::domain::Role;
use crate::entities::post_ratings;

/// `Json` extractor whose rejections use the API error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Path` extractor whose rejections use the API error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: String,
    /// Login name
    pub user_id: String,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub role: Role,
    pub llm_count: i32,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_id: user.login_id,
            username: user.username,
            nickname: user.nickname,
            email: user.email,
            role: user.role,
            llm_count: user.llm_count,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub prefix: String,
    pub is_pinned: bool,
    pub views: i32,
    pub comment_count: i32,
    pub average_rating: f64,
    pub rating_count: i32,
    pub author_id: String,
    pub author_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PostRecord> for PostDto {
    fn from(record: PostRecord) -> Self {
        let p = record.post;
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            prefix: p.prefix,
            is_pinned: p.is_pinned,
            views: p.views,
            comment_count: p.comment_count,
            average_rating: p.average_rating,
            rating_count: p.rating_count,
            author_id: p.author_id,
            author_name: record.author_name,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummaryDto {
    pub average_rating: f64,
    pub rating_count: i32,
}

impl From<RatingSummary> for RatingSummaryDto {
    fn from(summary: RatingSummary) -> Self {
        Self {
            average_rating: summary.average,
            rating_count: summary.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDto {
    pub id: i32,
    pub post_id: i32,
    pub user_id: String,
    pub username: Option<String>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl RatingDto {
    #[must_use]
    pub fn new(rating: post_ratings::Model, username: Option<String>) -> Self {
        Self {
            id: rating.id,
            post_id: rating.post_id,
            user_id: rating.user_id,
            username,
            rating: rating.score,
            comment: rating.comment,
            created_at: rating.created_at,
            updated_at: rating.updated_at,
        }
    }
}

impl From<RatingRecord> for RatingDto {
    fn from(record: RatingRecord) -> Self {
        Self::new(record.rating, record.username)
    }
}

/// A written rating and the post summary after the write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingWriteResponse {
    pub rating: RatingDto,
    pub average_rating: f64,
    pub rating_count: i32,
}
