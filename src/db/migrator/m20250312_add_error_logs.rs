use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ErrorLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ErrorLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ErrorLogs::Level).string().not_null())
                    .col(ColumnDef::new(ErrorLogs::Source).string().not_null())
                    .col(ColumnDef::new(ErrorLogs::Message).text().not_null())
                    .col(ColumnDef::new(ErrorLogs::Method).string().null())
                    .col(ColumnDef::new(ErrorLogs::Path).string().null())
                    .col(ColumnDef::new(ErrorLogs::UserId).string().null())
                    .col(ColumnDef::new(ErrorLogs::Context).text().null())
                    .col(ColumnDef::new(ErrorLogs::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_error_logs_created_at")
                    .table(ErrorLogs::Table)
                    .col(ErrorLogs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ErrorLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ErrorLogs {
    Table,
    Id,
    Level,
    Source,
    Message,
    Method,
    Path,
    UserId,
    Context,
    CreatedAt,
}
