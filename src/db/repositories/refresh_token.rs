use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::now_timestamp;
use crate::entities::{prelude::*, refresh_tokens};

pub struct RefreshTokenRepository {
    conn: DatabaseConnection,
}

impl RefreshTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn store(&self, user_id: &str, token_hash: String, expires_at: String) -> Result<()> {
        let active = refresh_tokens::ActiveModel {
            user_id: Set(user_id.to_string()),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at),
            revoked: Set(false),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        RefreshTokens::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to store refresh token")?;

        Ok(())
    }

    /// Unrevoked, unexpired tokens of a user, newest first.
    pub async fn list_active(&self, user_id: &str) -> Result<Vec<refresh_tokens::Model>> {
        let rows = RefreshTokens::find()
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::Revoked.eq(false))
            .filter(refresh_tokens::Column::ExpiresAt.gt(now_timestamp()))
            .order_by_desc(refresh_tokens::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load refresh tokens")?;

        Ok(rows)
    }

    /// Drops the user's expired rows. Returns how many were removed.
    pub async fn delete_expired(&self, user_id: &str) -> Result<u64> {
        let result = RefreshTokens::delete_many()
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::ExpiresAt.lte(now_timestamp()))
            .exec(&self.conn)
            .await
            .context("Failed to prune refresh tokens")?;

        Ok(result.rows_affected)
    }

    pub async fn revoke(&self, id: i32) -> Result<()> {
        RefreshTokens::update_many()
            .col_expr(refresh_tokens::Column::Revoked, Expr::value(true))
            .filter(refresh_tokens::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to revoke refresh token")?;

        Ok(())
    }
}
