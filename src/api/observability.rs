use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use super::error::InternalFailure;
use super::{ApiError, AppState};
use crate::db::NewErrorLog;
use crate::domain::Actor;

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state
        .prometheus_handle
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .ok_or_else(|| ApiError::NotFound("Metrics are not enabled".to_string()))
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri,
        route = matched_path.clone(),
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let status = response.status().as_u16();

        let outcome = if status >= 500 {
            "error"
        } else if status >= 400 {
            "client_error"
        } else {
            "success"
        };

        // Matched route rather than raw path keeps label cardinality bounded
        let metrics_path = matched_path.as_deref().unwrap_or(&uri);

        let labels = [
            ("method", method.clone()),
            ("path", metrics_path.to_string()),
            ("status", status.to_string()),
        ];

        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = duration_ms,
            status_code = status,
            outcome = %outcome,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Writes an `error_logs` row for every response carrying an [`InternalFailure`].
pub async fn error_log_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if let Some(failure) = response.extensions().get::<InternalFailure>() {
        let user_id = response
            .extensions()
            .get::<Actor>()
            .map(|a| a.user_id.clone());
        let status = response.status().as_u16();

        tracing::error!(
            status,
            method = %method,
            path = %path,
            source = failure.source,
            cause = %failure.detail,
            "Unhandled request failure"
        );

        let context = serde_json::json!({ "status": status }).to_string();
        state
            .error_logs()
            .record(NewErrorLog {
                level: "error".to_string(),
                source: failure.source.to_string(),
                message: failure.detail.clone(),
                method: Some(method),
                path: Some(path),
                user_id,
                context: Some(context),
            })
            .await;
    }

    response
}
