use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub author_id: String,

    pub title: String,

    /// Markdown body
    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub prefix: String,

    pub is_pinned: bool,

    pub views: i32,

    /// Cached number of comment rows
    pub comment_count: i32,

    /// Cached mean of rating scores, 0 when unrated
    pub average_rating: f64,

    /// Cached number of rating rows
    pub rating_count: i32,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
