use crate::entities::{error_logs, prelude::*};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

/// Fields recorded for one unexpected failure.
#[derive(Debug, Clone, Default)]
pub struct NewErrorLog {
    pub level: String,
    pub source: String,
    pub message: String,
    pub method: Option<String>,
    pub path: Option<String>,
    pub user_id: Option<String>,
    pub context: Option<String>,
}

pub struct ErrorLogRepository {
    conn: DatabaseConnection,
}

impl ErrorLogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, entry: NewErrorLog) -> Result<()> {
        let active_model = error_logs::ActiveModel {
            level: Set(entry.level),
            source: Set(entry.source),
            message: Set(entry.message),
            method: Set(entry.method),
            path: Set(entry.path),
            user_id: Set(entry.user_id),
            context: Set(entry.context),
            created_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        };

        ErrorLogs::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn latest(&self, limit: u64) -> Result<Vec<error_logs::Model>> {
        let rows = ErrorLogs::find()
            .order_by_desc(error_logs::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
