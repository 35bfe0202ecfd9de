pub mod prelude;

pub mod error_logs;
pub mod post_comments;
pub mod post_ratings;
pub mod posts;
pub mod refresh_tokens;
pub mod users;
