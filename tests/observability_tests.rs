//! Request span fields.

mod common;

use axum::http::StatusCode;
use common::spawn_app;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

#[derive(Clone, Default)]
struct RecordedUserIds(Arc<Mutex<Vec<String>>>);

struct UserIdVisitor<'a>(&'a mut Option<String>);

impl Visit for UserIdVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "user_id" {
            *self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "user_id" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S> Layer<S> for RecordedUserIds
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if span.metadata().name() != "request" {
            return;
        }
        let mut user_id = None;
        values.record(&mut UserIdVisitor(&mut user_id));
        if let Some(user_id) = user_id {
            self.0.lock().unwrap().push(user_id);
        }
    }
}

#[tokio::test]
async fn test_authenticated_request_records_user_id_on_request_span() {
    let recorded = RecordedUserIds::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(recorded.clone()));

    let app = spawn_app().await;
    let token = app.user_token("alice").await;
    let (status, me) = app.get("/api/v1/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let user_id = me["id"].as_str().unwrap().to_string();
    let seen = recorded.0.lock().unwrap().clone();
    assert_eq!(seen, vec![user_id]);
}

#[tokio::test]
async fn test_anonymous_request_leaves_user_id_empty() {
    let recorded = RecordedUserIds::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(recorded.clone()));

    let app = spawn_app().await;
    let (status, _) = app.get("/api/v1/boards", None).await;
    assert_eq!(status, StatusCode::OK);

    assert!(recorded.0.lock().unwrap().is_empty());
}
