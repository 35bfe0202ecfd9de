use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::BTreeSet;
use tokio::task;

use super::aggregates;
use crate::config::SecurityConfig;
use crate::db::now_timestamp;
use crate::domain::Role;
use crate::entities::{post_comments, post_ratings, posts, prelude::*, refresh_tokens, users};

/// User data returned from repository (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub login_id: String,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub role: Role,
    pub llm_count: i32,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            login_id: model.login_id,
            username: model.username,
            nickname: model.nickname,
            email: model.email,
            role: model.role.parse().unwrap_or_default(),
            llm_count: model.llm_count,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub login_id: String,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub password: String,
}

/// Profile fields to change; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_user: NewUser, security: &SecurityConfig) -> Result<User> {
        let password_hash = hash_secret(new_user.password, security).await?;
        let now = now_timestamp();

        let active = users::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            login_id: Set(new_user.login_id),
            username: Set(new_user.username),
            nickname: Set(new_user.nickname),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            role: Set(Role::User.as_str().to_string()),
            llm_count: Set(0),
            last_login_at: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = Users::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn login_id_exists(&self, login_id: &str) -> Result<bool> {
        let user = Users::find()
            .filter(users::Column::LoginId.eq(login_id))
            .one(&self.conn)
            .await
            .context("Failed to query user by login id")?;

        Ok(user.is_some())
    }

    /// Returns the id of the user owning `email`, if any.
    pub async fn find_id_by_email(&self, email: &str) -> Result<Option<String>> {
        let id: Option<String> = Users::find()
            .select_only()
            .column(users::Column::Id)
            .filter(users::Column::Email.eq(email))
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(id)
    }

    /// Get user by login id together with the password hash (for login)
    pub async fn get_credentials(&self, login_id: &str) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::LoginId.eq(login_id))
            .one(&self.conn)
            .await
            .context("Failed to query user credentials")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn get_password_hash(&self, id: &str) -> Result<Option<String>> {
        let hash: Option<String> = Users::find_by_id(id.to_string())
            .select_only()
            .column(users::Column::PasswordHash)
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to query password hash")?;

        Ok(hash)
    }

    pub async fn record_login(&self, id: &str) -> Result<()> {
        Users::update_many()
            .col_expr(users::Column::LastLoginAt, Expr::value(now_timestamp()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to record login")?;

        Ok(())
    }

    /// Newest accounts first
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn update(&self, id: &str, changes: UserChanges) -> Result<Option<User>> {
        let Some(model) = Users::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(nickname) = changes.nickname {
            active.nickname = Set(nickname);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.as_str().to_string());
        }
        active.updated_at = Set(now_timestamp());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(User::from(model)))
    }

    pub async fn update_password(
        &self,
        id: &str,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        let new_hash = hash_secret(new_password.to_string(), security).await?;

        Users::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(new_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update password")?;

        Ok(())
    }

    /// Sets the role of the account with the given login id. Returns false when
    /// no such account exists.
    pub async fn set_role_by_login_id(&self, login_id: &str, role: Role) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(users::Column::Role, Expr::value(role.as_str()))
            .col_expr(users::Column::UpdatedAt, Expr::value(now_timestamp()))
            .filter(users::Column::LoginId.eq(login_id))
            .exec(&self.conn)
            .await
            .context("Failed to update role")?;

        Ok(result.rows_affected > 0)
    }

    /// Removes the account and everything it owns, then recomputes the cached
    /// aggregates of the remaining posts it had commented on or rated.
    pub async fn delete_cascade(&self, id: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        // A write first, so the transaction never has to upgrade a read lock
        RefreshTokens::delete_many()
            .filter(refresh_tokens::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        if Users::find_by_id(id.to_string()).one(&txn).await?.is_none() {
            return Ok(false);
        }

        let own_posts: Vec<i32> = Posts::find()
            .select_only()
            .column(posts::Column::Id)
            .filter(posts::Column::AuthorId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        let rated: Vec<i32> = PostRatings::find()
            .select_only()
            .column(post_ratings::Column::PostId)
            .filter(post_ratings::Column::UserId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        let commented: Vec<i32> = PostComments::find()
            .select_only()
            .column(post_comments::Column::PostId)
            .filter(post_comments::Column::AuthorId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        let own_comment_ids: Vec<i32> = PostComments::find()
            .select_only()
            .column(post_comments::Column::Id)
            .filter(post_comments::Column::AuthorId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        PostRatings::delete_many()
            .filter(post_ratings::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        // Replies by other users move to the top level
        if !own_comment_ids.is_empty() {
            PostComments::update_many()
                .col_expr(post_comments::Column::ParentId, Expr::value(Option::<i32>::None))
                .filter(post_comments::Column::ParentId.is_in(own_comment_ids))
                .exec(&txn)
                .await?;
        }

        PostComments::delete_many()
            .filter(post_comments::Column::AuthorId.eq(id))
            .exec(&txn)
            .await?;

        if !own_posts.is_empty() {
            PostComments::delete_many()
                .filter(post_comments::Column::PostId.is_in(own_posts.clone()))
                .exec(&txn)
                .await?;
            PostRatings::delete_many()
                .filter(post_ratings::Column::PostId.is_in(own_posts.clone()))
                .exec(&txn)
                .await?;
            Posts::delete_many()
                .filter(posts::Column::Id.is_in(own_posts.clone()))
                .exec(&txn)
                .await?;
        }

        Users::delete_by_id(id.to_string()).exec(&txn).await?;

        let touched: BTreeSet<i32> = rated
            .into_iter()
            .chain(commented)
            .filter(|post_id| !own_posts.contains(post_id))
            .collect();

        for post_id in touched {
            aggregates::refresh_comment_count(&txn, post_id).await?;
            aggregates::refresh_rating_summary(&txn, post_id).await?;
        }

        txn.commit().await.context("Failed to commit user deletion")?;
        Ok(true)
    }
}

fn argon2_for(security: &SecurityConfig) -> Result<Argon2<'static>> {
    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None, // output length (use default)
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password or token using Argon2id with the configured params.
pub fn hash_password(password: &str, security: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2_for(security)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Argon2 is CPU-intensive, so hashing runs on the blocking pool.
pub async fn hash_secret(secret: String, security: &SecurityConfig) -> Result<String> {
    let security = security.clone();
    task::spawn_blocking(move || hash_password(&secret, &security))
        .await
        .context("Password hashing task panicked")?
}

/// Verifies `secret` against a stored PHC hash on the blocking pool.
pub async fn verify_secret(secret: String, stored_hash: String) -> Result<bool> {
    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&stored_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        // Params are read from the PHC string
        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(secret.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}
