use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// UUID v4 string
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Login name
    #[sea_orm(unique)]
    pub login_id: String,

    /// Display name carried in token claims
    pub username: String,

    pub nickname: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// `USER` or `ADMIN`
    pub role: String,

    /// Recipe-assistant questions asked. Logging in does not touch it.
    pub llm_count: i32,

    pub last_login_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
