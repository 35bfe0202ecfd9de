use crate::entities::{post_ratings, prelude::*};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create_from_entity<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await?;

    for mut index in schema.create_index_from_entity(entity) {
        manager.create_index(index.if_not_exists().to_owned()).await?;
    }

    Ok(())
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Referenced tables first
        create_from_entity(manager, &schema, Users).await?;
        create_from_entity(manager, &schema, RefreshTokens).await?;
        create_from_entity(manager, &schema, Posts).await?;
        create_from_entity(manager, &schema, PostComments).await?;
        create_from_entity(manager, &schema, PostRatings).await?;

        // One rating per (post, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_ratings_post_user")
                    .table(PostRatings)
                    .col(post_ratings::Column::PostId)
                    .col(post_ratings::Column::UserId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostRatings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostComments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RefreshTokens).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await
    }
}
