//! `SeaORM` implementation of the `CommentService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{CommentRecord, Store};
use crate::domain::Actor;
use crate::entities::post_comments;
use crate::services::board_service::BoardError;
use crate::services::comment_service::{CommentNode, CommentService, build_comment_tree};

pub struct SeaOrmCommentService {
    store: Store,
}

impl SeaOrmCommentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn require_post(&self, post_id: i32) -> Result<(), BoardError> {
        self.store
            .post_repo()
            .get(post_id)
            .await?
            .map(|_| ())
            .ok_or(BoardError::PostNotFound(post_id))
    }

    /// The comment must exist and belong to `post_id`.
    async fn require_comment(
        &self,
        post_id: i32,
        comment_id: i32,
    ) -> Result<post_comments::Model, BoardError> {
        self.store
            .comment_repo()
            .get(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or(BoardError::CommentNotFound(comment_id))
    }
}

#[async_trait]
impl CommentService for SeaOrmCommentService {
    async fn create_comment(
        &self,
        actor: &Actor,
        post_id: i32,
        content: String,
        parent_id: Option<i32>,
    ) -> Result<CommentNode, BoardError> {
        self.require_post(post_id).await?;

        if let Some(parent_id) = parent_id {
            self.require_comment(post_id, parent_id).await?;
        }

        let comment = self
            .store
            .comment_repo()
            .create(post_id, &actor.user_id, content, parent_id)
            .await?;

        info!(post_id, comment_id = comment.id, author_id = %actor.user_id, "Comment added");

        Ok(CommentNode::from(CommentRecord {
            comment,
            author_name: Some(actor.username.clone()),
        }))
    }

    async fn list_comments(&self, post_id: i32) -> Result<Vec<CommentNode>, BoardError> {
        self.require_post(post_id).await?;
        let records = self.store.comment_repo().list_for_post(post_id).await?;
        Ok(build_comment_tree(records))
    }

    async fn update_comment(
        &self,
        actor: &Actor,
        post_id: i32,
        comment_id: i32,
        content: String,
    ) -> Result<CommentNode, BoardError> {
        let comment = self.require_comment(post_id, comment_id).await?;
        actor.ensure_can_modify(&comment.author_id, "edit this comment")?;

        let author_name = self
            .store
            .get_user(&comment.author_id)
            .await?
            .map(|u| u.username);

        let comment = self
            .store
            .comment_repo()
            .update_content(comment, content)
            .await?;

        Ok(CommentNode::from(CommentRecord {
            comment,
            author_name,
        }))
    }

    async fn delete_comment(
        &self,
        actor: &Actor,
        post_id: i32,
        comment_id: i32,
    ) -> Result<(), BoardError> {
        let comment = self.require_comment(post_id, comment_id).await?;
        actor.ensure_can_modify(&comment.author_id, "delete this comment")?;

        let remaining = self.store.comment_repo().delete(&comment).await?;
        info!(post_id, comment_id, remaining, by = %actor.user_id, "Comment deleted");
        Ok(())
    }
}
