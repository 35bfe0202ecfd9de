use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{
    AuthService, BoardService, CommentService, ErrorLogService, RatingService, TokenIssuer,
    UserService,
};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod boards;
mod comments;
mod error;
mod me;
mod observability;
mod ratings;
mod types;
pub mod validation;

pub use error::{ApiError, ErrorBody, InternalFailure};
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.shared.tokens
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn board_service(&self) -> &Arc<dyn BoardService> {
        &self.shared.board_service
    }

    #[must_use]
    pub fn comment_service(&self) -> &Arc<dyn CommentService> {
        &self.shared.comment_service
    }

    #[must_use]
    pub fn rating_service(&self) -> &Arc<dyn RatingService> {
        &self.shared.rating_service
    }

    #[must_use]
    pub fn error_logs(&self) -> &Arc<ErrorLogService> {
        &self.shared.error_logs
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .merge(create_public_router())
        .merge(create_protected_router(state.clone()))
        .merge(create_admin_router(state.clone()))
        .fallback(|| async { ApiError::NotFound("Route not found".to_string()) })
        .with_state(state.clone());

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api/v1", api_router)
        .layer(middleware::from_fn_with_state(
            state,
            observability::error_log_middleware,
        ))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        // Innermost of the two so the auth layer records into the `request` span
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/boards", get(boards::list_posts))
        .route("/boards/{id}", get(boards::get_post))
        .route("/boards/{id}/comments", get(comments::list_comments))
        .route("/boards/{id}/rating", get(ratings::get_summary))
        .route("/boards/{id}/rating/all", get(ratings::list_ratings))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route(
            "/me",
            get(me::get_me).patch(me::update_me).delete(me::delete_me),
        )
        .route("/me/password", put(me::change_password))
        .route("/boards", post(boards::create_post))
        .route(
            "/boards/{id}",
            patch(boards::update_post).delete(boards::delete_post),
        )
        .route("/boards/{id}/comments", post(comments::create_comment))
        .route(
            "/boards/{id}/comments/{comment_id}",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .route(
            "/boards/{id}/rating",
            post(ratings::rate_post).delete(ratings::delete_my_rating),
        )
        .route("/boards/{id}/rating/my", get(ratings::get_my_rating))
        .route(
            "/boards/{id}/ratings/{rating_id}",
            patch(ratings::update_rating).delete(ratings::delete_rating),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state.store().ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "uptimeSeconds": state.start_time.elapsed().as_secs(),
    })))
}
