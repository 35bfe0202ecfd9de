use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::aggregates;
use crate::db::now_timestamp;
use crate::entities::{post_comments, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub comment: post_comments::Model,
    pub author_name: Option<String>,
}

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<post_comments::Model>> {
        PostComments::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query comment")
    }

    /// All comments of a post, oldest first.
    pub async fn list_for_post(&self, post_id: i32) -> Result<Vec<CommentRecord>> {
        let rows = PostComments::find()
            .find_also_related(Users)
            .filter(post_comments::Column::PostId.eq(post_id))
            .order_by_asc(post_comments::Column::CreatedAt)
            .order_by_asc(post_comments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list comments")?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentRecord {
                comment,
                author_name: author.map(|a| a.username),
            })
            .collect())
    }

    /// Inserts the comment and refreshes the post's comment count in one transaction.
    pub async fn create(
        &self,
        post_id: i32,
        author_id: &str,
        content: String,
        parent_id: Option<i32>,
    ) -> Result<post_comments::Model> {
        let now = now_timestamp();
        let txn = self.conn.begin().await?;

        let model = post_comments::ActiveModel {
            post_id: Set(post_id),
            author_id: Set(author_id.to_string()),
            content: Set(content),
            parent_id: Set(parent_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert comment")?;

        aggregates::refresh_comment_count(&txn, post_id).await?;

        txn.commit().await.context("Failed to commit comment")?;
        Ok(model)
    }

    pub async fn update_content(
        &self,
        comment: post_comments::Model,
        content: String,
    ) -> Result<post_comments::Model> {
        let mut active: post_comments::ActiveModel = comment.into();
        active.content = Set(content);
        active.updated_at = Set(now_timestamp());

        active
            .update(&self.conn)
            .await
            .context("Failed to update comment")
    }

    /// Deletes the comment, lifts its replies to the top level and refreshes
    /// the post's comment count. Returns the new count.
    pub async fn delete(&self, comment: &post_comments::Model) -> Result<i32> {
        let txn = self.conn.begin().await?;

        PostComments::update_many()
            .col_expr(
                post_comments::Column::ParentId,
                Expr::value(Option::<i32>::None),
            )
            .filter(post_comments::Column::ParentId.eq(comment.id))
            .exec(&txn)
            .await?;

        PostComments::delete_by_id(comment.id).exec(&txn).await?;

        let count = aggregates::refresh_comment_count(&txn, comment.post_id).await?;

        txn.commit().await.context("Failed to commit comment deletion")?;
        Ok(count)
    }
}
