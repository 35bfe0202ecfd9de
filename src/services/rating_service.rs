//! Star ratings. Each (post, user) pair holds at most one rating.

use serde::Serialize;

use crate::db::{RatingRecord, RatingSummary};
use crate::domain::Actor;
use crate::entities::post_ratings;
use crate::services::board_service::BoardError;

/// The caller's own rating; both fields are null when they have not rated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MyRating {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RatingInput {
    pub score: i32,
    pub comment: Option<String>,
}

#[async_trait::async_trait]
pub trait RatingService: Send + Sync {
    /// Creates or replaces the caller's rating.
    async fn rate_post(
        &self,
        actor: &Actor,
        post_id: i32,
        input: RatingInput,
    ) -> Result<(post_ratings::Model, RatingSummary), BoardError>;

    async fn get_summary(&self, post_id: i32) -> Result<RatingSummary, BoardError>;

    /// Newest first.
    async fn list_ratings(&self, post_id: i32) -> Result<Vec<RatingRecord>, BoardError>;

    async fn get_my_rating(&self, actor: &Actor, post_id: i32) -> Result<MyRating, BoardError>;

    async fn delete_my_rating(
        &self,
        actor: &Actor,
        post_id: i32,
    ) -> Result<RatingSummary, BoardError>;

    async fn update_rating(
        &self,
        actor: &Actor,
        post_id: i32,
        rating_id: i32,
        input: RatingInput,
    ) -> Result<(RatingRecord, RatingSummary), BoardError>;

    async fn delete_rating(
        &self,
        actor: &Actor,
        post_id: i32,
        rating_id: i32,
    ) -> Result<RatingSummary, BoardError>;
}
