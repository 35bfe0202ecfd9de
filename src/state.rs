use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, BoardService, CommentService, ErrorLogService, RatingService, SeaOrmAuthService,
    SeaOrmBoardService, SeaOrmCommentService, SeaOrmRatingService, SeaOrmUserService,
    TokenIssuer, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenIssuer>,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub board_service: Arc<dyn BoardService>,

    pub comment_service: Arc<dyn CommentService>,

    pub rating_service: Arc<dyn RatingService>,

    pub error_logs: Arc<ErrorLogService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        config.validate().context("Invalid configuration")?;

        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let tokens = Arc::new(TokenIssuer::new(&config.auth));
        let security = config.security.clone();

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens.clone(),
            security.clone(),
        ));
        let user_service: Arc<dyn UserService> =
            Arc::new(SeaOrmUserService::new(store.clone(), security));
        let board_service: Arc<dyn BoardService> =
            Arc::new(SeaOrmBoardService::new(store.clone()));
        let comment_service: Arc<dyn CommentService> =
            Arc::new(SeaOrmCommentService::new(store.clone()));
        let rating_service: Arc<dyn RatingService> =
            Arc::new(SeaOrmRatingService::new(store.clone()));
        let error_logs = Arc::new(ErrorLogService::new(store.clone()));

        info!("Services initialized");

        Self {
            config: Arc::new(config),
            store,
            tokens,
            auth_service,
            user_service,
            board_service,
            comment_service,
            rating_service,
            error_logs,
        }
    }
}
