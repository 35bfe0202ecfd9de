pub mod aggregates;
pub mod comment;
pub mod error_log;
pub mod post;
pub mod rating;
pub mod refresh_token;
pub mod user;
