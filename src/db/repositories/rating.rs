use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::aggregates::{self, RatingSummary};
use crate::db::now_timestamp;
use crate::entities::{post_ratings, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRecord {
    pub rating: post_ratings::Model,
    pub username: Option<String>,
}

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<post_ratings::Model>> {
        PostRatings::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query rating")
    }

    pub async fn find_for_user(
        &self,
        post_id: i32,
        user_id: &str,
    ) -> Result<Option<post_ratings::Model>> {
        PostRatings::find()
            .filter(post_ratings::Column::PostId.eq(post_id))
            .filter(post_ratings::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query rating")
    }

    /// Ratings of a post, newest first, with the rater's display name.
    pub async fn list_for_post(&self, post_id: i32) -> Result<Vec<RatingRecord>> {
        let rows = PostRatings::find()
            .find_also_related(Users)
            .filter(post_ratings::Column::PostId.eq(post_id))
            .order_by_desc(post_ratings::Column::CreatedAt)
            .order_by_desc(post_ratings::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list ratings")?;

        Ok(rows
            .into_iter()
            .map(|(rating, user)| RatingRecord {
                rating,
                username: user.map(|u| u.username),
            })
            .collect())
    }

    /// Creates or replaces the caller's rating of a post and refreshes the
    /// post's summary in the same transaction. The upsert is the first
    /// statement so the transaction holds the write lock from the start.
    pub async fn upsert(
        &self,
        post_id: i32,
        user_id: &str,
        score: i32,
        comment: Option<String>,
    ) -> Result<(post_ratings::Model, RatingSummary)> {
        let now = now_timestamp();
        let txn = self.conn.begin().await?;

        let active = post_ratings::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id.to_string()),
            score: Set(score),
            comment: Set(comment),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = PostRatings::insert(active)
            .on_conflict(
                OnConflict::columns([post_ratings::Column::PostId, post_ratings::Column::UserId])
                    .update_columns([
                        post_ratings::Column::Score,
                        post_ratings::Column::Comment,
                        post_ratings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&txn)
            .await
            .context("Failed to upsert rating")?;

        let summary = aggregates::refresh_rating_summary(&txn, post_id).await?;

        txn.commit().await.context("Failed to commit rating")?;
        Ok((model, summary))
    }

    pub async fn update(
        &self,
        rating: post_ratings::Model,
        score: i32,
        comment: Option<String>,
    ) -> Result<(RatingRecord, RatingSummary)> {
        let post_id = rating.post_id;
        let txn = self.conn.begin().await?;

        let mut active: post_ratings::ActiveModel = rating.into();
        active.score = Set(score);
        active.comment = Set(comment);
        active.updated_at = Set(now_timestamp());
        let model = active.update(&txn).await?;

        let summary = aggregates::refresh_rating_summary(&txn, post_id).await?;
        let username = Users::find_by_id(model.user_id.clone())
            .one(&txn)
            .await?
            .map(|u| u.username);

        txn.commit().await.context("Failed to commit rating update")?;
        Ok((
            RatingRecord {
                rating: model,
                username,
            },
            summary,
        ))
    }

    pub async fn delete(&self, rating: &post_ratings::Model) -> Result<RatingSummary> {
        let txn = self.conn.begin().await?;

        PostRatings::delete_by_id(rating.id).exec(&txn).await?;
        let summary = aggregates::refresh_rating_summary(&txn, rating.post_id).await?;

        txn.commit().await.context("Failed to commit rating deletion")?;
        Ok(summary)
    }
}
