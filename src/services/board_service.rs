//! Community board: posts, plus the error type shared with the comment and
//! rating services.

use thiserror::Error;

use crate::db::{PostChanges, PostRecord};
use crate::domain::{Actor, Forbidden, PostPrefix};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Post not found: {0}")]
    PostNotFound(i32),

    #[error("Comment not found: {0}")]
    CommentNotFound(i32),

    #[error("Rating not found")]
    RatingNotFound,

    #[error("{0}")]
    Forbidden(#[from] Forbidden),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for BoardError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BoardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub prefix: PostPrefix,
}

#[async_trait::async_trait]
pub trait BoardService: Send + Sync {
    async fn create_post(&self, actor: &Actor, draft: PostDraft) -> Result<PostRecord, BoardError>;

    /// Pinned first, then newest first.
    async fn list_posts(&self) -> Result<Vec<PostRecord>, BoardError>;

    /// Counts a view and returns the post with the incremented counter.
    async fn get_post(&self, id: i32) -> Result<PostRecord, BoardError>;

    /// Owner or ADMIN; only ADMIN may change the pinned flag.
    async fn update_post(
        &self,
        actor: &Actor,
        id: i32,
        changes: PostChanges,
    ) -> Result<PostRecord, BoardError>;

    /// Removes the post together with its comments and ratings.
    async fn delete_post(&self, actor: &Actor, id: i32) -> Result<(), BoardError>;
}
