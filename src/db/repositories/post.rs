use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::db::now_timestamp;
use crate::domain::PostPrefix;
use crate::entities::{post_comments, post_ratings, posts, prelude::*};

/// A post joined with its author's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub post: posts::Model,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub prefix: PostPrefix,
}

#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub prefix: Option<PostPrefix>,
    pub is_pinned: Option<bool>,
}

impl PostChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.prefix.is_none()
            && self.is_pinned.is_none()
    }
}

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_post: NewPost) -> Result<posts::Model> {
        let now = now_timestamp();
        let active = posts::ActiveModel {
            author_id: Set(new_post.author_id),
            title: Set(new_post.title),
            content: Set(new_post.content),
            prefix: Set(new_post.prefix.as_str().to_string()),
            is_pinned: Set(false),
            views: Set(0),
            comment_count: Set(0),
            average_rating: Set(0.0),
            rating_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert post")
    }

    pub async fn get(&self, id: i32) -> Result<Option<posts::Model>> {
        Posts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post")
    }

    pub async fn get_with_author(&self, id: i32) -> Result<Option<PostRecord>> {
        let row = Posts::find_by_id(id)
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query post")?;

        Ok(row.map(|(post, author)| PostRecord {
            post,
            author_name: author.map(|a| a.username),
        }))
    }

    /// Pinned posts first, then newest first.
    pub async fn list(&self) -> Result<Vec<PostRecord>> {
        let rows = Posts::find()
            .find_also_related(Users)
            .order_by_desc(posts::Column::IsPinned)
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list posts")?;

        Ok(rows
            .into_iter()
            .map(|(post, author)| PostRecord {
                post,
                author_name: author.map(|a| a.username),
            })
            .collect())
    }

    /// Increments the view counter. Returns false when the post does not exist.
    pub async fn increment_views(&self, id: i32) -> Result<bool> {
        let result = Posts::update_many()
            .col_expr(posts::Column::Views, Expr::col(posts::Column::Views).add(1))
            .filter(posts::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to increment views")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update(&self, post: posts::Model, changes: PostChanges) -> Result<posts::Model> {
        let mut active: posts::ActiveModel = post.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }
        if let Some(prefix) = changes.prefix {
            active.prefix = Set(prefix.as_str().to_string());
        }
        if let Some(is_pinned) = changes.is_pinned {
            active.is_pinned = Set(is_pinned);
        }
        active.updated_at = Set(now_timestamp());

        active
            .update(&self.conn)
            .await
            .context("Failed to update post")
    }

    /// Deletes the post with its comments and ratings.
    pub async fn delete_cascade(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        PostComments::delete_many()
            .filter(post_comments::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        PostRatings::delete_many()
            .filter(post_ratings::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        let result = Posts::delete_by_id(id).exec(&txn).await?;

        txn.commit().await.context("Failed to commit post deletion")?;
        Ok(result.rows_affected > 0)
    }
}
