pub mod auth_service;
pub use auth_service::{AuthError, AuthService, LoginResult, RefreshedAccessToken, TokenPair};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub use user_service::{PasswordChange, UserError, UserService};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;

pub mod board_service;
pub use board_service::{BoardError, BoardService, PostDraft};

pub mod board_service_impl;
pub use board_service_impl::SeaOrmBoardService;

pub mod comment_service;
pub use comment_service::{CommentNode, CommentService, build_comment_tree};

pub mod comment_service_impl;
pub use comment_service_impl::SeaOrmCommentService;

pub mod rating_service;
pub use rating_service::{MyRating, RatingInput, RatingService};

pub mod rating_service_impl;
pub use rating_service_impl::SeaOrmRatingService;

pub mod error_log;
pub use error_log::ErrorLogService;

pub mod tokens;
pub use tokens::{Claims, TokenError, TokenIssuer, TokenKind};
