//! `SeaORM` implementation of the `BoardService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{NewPost, PostChanges, PostRecord, Store};
use crate::domain::Actor;
use crate::entities::posts;
use crate::services::board_service::{BoardError, BoardService, PostDraft};

pub struct SeaOrmBoardService {
    store: Store,
}

impl SeaOrmBoardService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn require_post(&self, id: i32) -> Result<posts::Model, BoardError> {
        self.store
            .post_repo()
            .get(id)
            .await?
            .ok_or(BoardError::PostNotFound(id))
    }

    async fn load_record(&self, id: i32) -> Result<PostRecord, BoardError> {
        self.store
            .post_repo()
            .get_with_author(id)
            .await?
            .ok_or(BoardError::PostNotFound(id))
    }
}

#[async_trait]
impl BoardService for SeaOrmBoardService {
    async fn create_post(&self, actor: &Actor, draft: PostDraft) -> Result<PostRecord, BoardError> {
        let post = self
            .store
            .post_repo()
            .create(NewPost {
                author_id: actor.user_id.clone(),
                title: draft.title,
                content: draft.content,
                prefix: draft.prefix,
            })
            .await?;

        info!(post_id = post.id, author_id = %actor.user_id, "Post created");

        Ok(PostRecord {
            post,
            author_name: Some(actor.username.clone()),
        })
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>, BoardError> {
        Ok(self.store.post_repo().list().await?)
    }

    async fn get_post(&self, id: i32) -> Result<PostRecord, BoardError> {
        if !self.store.post_repo().increment_views(id).await? {
            return Err(BoardError::PostNotFound(id));
        }

        self.load_record(id).await
    }

    async fn update_post(
        &self,
        actor: &Actor,
        id: i32,
        changes: PostChanges,
    ) -> Result<PostRecord, BoardError> {
        let post = self.require_post(id).await?;
        actor.ensure_can_modify(&post.author_id, "edit this post")?;

        if changes.is_pinned.is_some() {
            actor.ensure_admin("pin or unpin posts")?;
        }

        if !changes.is_empty() {
            self.store.post_repo().update(post, changes).await?;
            info!(post_id = id, by = %actor.user_id, "Post updated");
        }

        self.load_record(id).await
    }

    async fn delete_post(&self, actor: &Actor, id: i32) -> Result<(), BoardError> {
        let post = self.require_post(id).await?;
        actor.ensure_can_modify(&post.author_id, "delete this post")?;

        if !self.store.post_repo().delete_cascade(id).await? {
            return Err(BoardError::PostNotFound(id));
        }

        info!(post_id = id, by = %actor.user_id, "Post deleted");
        Ok(())
    }
}
