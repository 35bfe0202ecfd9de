#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use recipebox::api::AppState;
use recipebox::config::{Config, SecurityConfig};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "Secret1!";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
}

pub async fn spawn_app() -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("recipebox-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.auth.jwt_secret = "integration-test-secret-0123456789abcdef".to_string();
    // Cheap hashing keeps the suite fast
    config.security = SecurityConfig {
        argon2_memory_cost_kib: 64,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };

    let state = recipebox::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    let router = recipebox::api::router(state.clone());

    TestApp { state, router }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Registers `login_id` with `<login_id>@example.com` and returns the user body.
    pub async fn register(&self, login_id: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({
                    "user_id": login_id,
                    "username": format!("{login_id} name"),
                    "nickname": format!("{login_id} nick"),
                    "email": format!("{login_id}@example.com"),
                    "password": PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body
    }

    /// Logs in and returns `(access_token, refresh_token)`.
    pub async fn login(&self, login_id: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "user_id": login_id, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        (
            body["accessToken"].as_str().unwrap().to_string(),
            body["refreshToken"].as_str().unwrap().to_string(),
        )
    }

    /// Registers and logs in, returning the access token.
    pub async fn user_token(&self, login_id: &str) -> String {
        self.register(login_id).await;
        self.login(login_id).await.0
    }

    /// Registers, promotes to ADMIN and logs in, returning the access token.
    pub async fn admin_token(&self, login_id: &str) -> String {
        self.register(login_id).await;
        assert!(self.state.store().promote_user(login_id).await.unwrap());
        self.login(login_id).await.0
    }

    pub async fn create_post(&self, token: &str, title: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/boards",
                Some(token),
                json!({ "title": title, "content": "Mix and bake.", "prefix": "Recipe" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create post failed: {body}");
        body
    }
}
