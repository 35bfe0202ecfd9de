//! `SeaORM` implementation of the `RatingService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{RatingRecord, RatingSummary, Store};
use crate::domain::Actor;
use crate::entities::{post_ratings, posts};
use crate::services::board_service::BoardError;
use crate::services::rating_service::{MyRating, RatingInput, RatingService};

pub struct SeaOrmRatingService {
    store: Store,
}

impl SeaOrmRatingService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn require_post(&self, post_id: i32) -> Result<posts::Model, BoardError> {
        self.store
            .post_repo()
            .get(post_id)
            .await?
            .ok_or(BoardError::PostNotFound(post_id))
    }

    async fn require_rating(
        &self,
        post_id: i32,
        rating_id: i32,
    ) -> Result<post_ratings::Model, BoardError> {
        self.store
            .rating_repo()
            .get(rating_id)
            .await?
            .filter(|r| r.post_id == post_id)
            .ok_or(BoardError::RatingNotFound)
    }
}

#[async_trait]
impl RatingService for SeaOrmRatingService {
    async fn rate_post(
        &self,
        actor: &Actor,
        post_id: i32,
        input: RatingInput,
    ) -> Result<(post_ratings::Model, RatingSummary), BoardError> {
        self.require_post(post_id).await?;

        let (rating, summary) = self
            .store
            .rating_repo()
            .upsert(post_id, &actor.user_id, input.score, input.comment)
            .await?;

        info!(
            post_id,
            user_id = %actor.user_id,
            score = rating.score,
            average = summary.average,
            count = summary.count,
            "Post rated"
        );

        Ok((rating, summary))
    }

    async fn get_summary(&self, post_id: i32) -> Result<RatingSummary, BoardError> {
        let post = self.require_post(post_id).await?;
        Ok(RatingSummary {
            average: post.average_rating,
            count: post.rating_count,
        })
    }

    async fn list_ratings(&self, post_id: i32) -> Result<Vec<RatingRecord>, BoardError> {
        self.require_post(post_id).await?;
        Ok(self.store.rating_repo().list_for_post(post_id).await?)
    }

    async fn get_my_rating(&self, actor: &Actor, post_id: i32) -> Result<MyRating, BoardError> {
        self.require_post(post_id).await?;

        let mine = self
            .store
            .rating_repo()
            .find_for_user(post_id, &actor.user_id)
            .await?;

        Ok(mine.map_or_else(MyRating::default, |r| MyRating {
            rating: Some(r.score),
            comment: r.comment,
        }))
    }

    async fn delete_my_rating(
        &self,
        actor: &Actor,
        post_id: i32,
    ) -> Result<RatingSummary, BoardError> {
        self.require_post(post_id).await?;

        let mine = self
            .store
            .rating_repo()
            .find_for_user(post_id, &actor.user_id)
            .await?
            .ok_or(BoardError::RatingNotFound)?;

        let summary = self.store.rating_repo().delete(&mine).await?;
        info!(post_id, user_id = %actor.user_id, "Rating removed");
        Ok(summary)
    }

    async fn update_rating(
        &self,
        actor: &Actor,
        post_id: i32,
        rating_id: i32,
        input: RatingInput,
    ) -> Result<(RatingRecord, RatingSummary), BoardError> {
        let rating = self.require_rating(post_id, rating_id).await?;
        actor.ensure_can_modify(&rating.user_id, "edit this rating")?;

        Ok(self
            .store
            .rating_repo()
            .update(rating, input.score, input.comment)
            .await?)
    }

    async fn delete_rating(
        &self,
        actor: &Actor,
        post_id: i32,
        rating_id: i32,
    ) -> Result<RatingSummary, BoardError> {
        let rating = self.require_rating(post_id, rating_id).await?;
        actor.ensure_can_modify(&rating.user_id, "delete this rating")?;

        let summary = self.store.rating_repo().delete(&rating).await?;
        info!(post_id, rating_id, by = %actor.user_id, "Rating deleted");
        Ok(summary)
    }
}
