//! Recomputes the cached counters on `posts` from the rows they summarize.
//!
//! Every helper takes a generic connection so it can run inside the
//! transaction of the write that changed the underlying rows.

use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::entities::{post_comments, post_ratings, posts, prelude::*};

/// Mean and count of the scores currently stored for a post.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i32,
}

impl RatingSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_scores(scores: &[i32]) -> Self {
        if scores.is_empty() {
            return Self {
                average: 0.0,
                count: 0,
            };
        }

        let total: i64 = scores.iter().map(|s| i64::from(*s)).sum();
        Self {
            average: total as f64 / scores.len() as f64,
            count: i32::try_from(scores.len()).unwrap_or(i32::MAX),
        }
    }
}

pub async fn refresh_comment_count<C: ConnectionTrait>(db: &C, post_id: i32) -> Result<i32> {
    let count = PostComments::find()
        .filter(post_comments::Column::PostId.eq(post_id))
        .count(db)
        .await
        .context("Failed to count comments")?;
    let count = i32::try_from(count).unwrap_or(i32::MAX);

    Posts::update_many()
        .col_expr(posts::Column::CommentCount, Expr::value(count))
        .filter(posts::Column::Id.eq(post_id))
        .exec(db)
        .await
        .context("Failed to store comment count")?;

    Ok(count)
}

pub async fn refresh_rating_summary<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
) -> Result<RatingSummary> {
    let scores: Vec<i32> = PostRatings::find()
        .select_only()
        .column(post_ratings::Column::Score)
        .filter(post_ratings::Column::PostId.eq(post_id))
        .into_tuple()
        .all(db)
        .await
        .context("Failed to load rating scores")?;

    let summary = RatingSummary::from_scores(&scores);

    Posts::update_many()
        .col_expr(posts::Column::AverageRating, Expr::value(summary.average))
        .col_expr(posts::Column::RatingCount, Expr::value(summary.count))
        .filter(posts::Column::Id.eq(post_id))
        .exec(db)
        .await
        .context("Failed to store rating summary")?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scores_reset_to_zero() {
        let summary = RatingSummary::from_scores(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.average.abs() < f64::EPSILON);
    }

    #[test]
    fn average_is_exact_mean() {
        let summary = RatingSummary::from_scores(&[5, 4, 4]);
        assert_eq!(summary.count, 3);
        assert!((summary.average - 13.0 / 3.0).abs() < 1e-9);
    }
}
