pub use super::error_logs::Entity as ErrorLogs;
pub use super::post_comments::Entity as PostComments;
pub use super::post_ratings::Entity as PostRatings;
pub use super::posts::Entity as Posts;
pub use super::refresh_tokens::Entity as RefreshTokens;
pub use super::users::Entity as Users;
