use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::domain::Forbidden;
use crate::services::{AuthError, BoardError, UserError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

/// Error body: `{"statusCode": 404, "message": "..."}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
}

/// Detailed cause of a 500, attached to the response for the error-log layer.
/// Never serialized to the client.
#[derive(Debug, Clone)]
pub struct InternalFailure {
    pub source: &'static str,
    pub detail: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, failure) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                    Some(InternalFailure {
                        source: "database",
                        detail: msg,
                    }),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    Some(InternalFailure {
                        source: "internal",
                        detail: msg,
                    }),
                )
            }
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            message,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(failure) = failure {
            response.extensions_mut().insert(failure);
        }
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<Forbidden> for ApiError {
    fn from(err: Forbidden) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Unauthorized("Invalid login id or password".to_string())
            }
            AuthError::InvalidToken => Self::Unauthorized(err.to_string()),
            AuthError::UserNotFound => Self::Unauthorized("Account no longer exists".to_string()),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::Conflict(msg) => Self::Conflict(msg),
            UserError::Forbidden(f) => f.into(),
            UserError::Validation(msg) => Self::ValidationError(msg),
            UserError::WrongPassword => Self::Unauthorized(err.to_string()),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::PostNotFound(_)
            | BoardError::CommentNotFound(_)
            | BoardError::RatingNotFound => Self::NotFound(err.to_string()),
            BoardError::Forbidden(f) => f.into(),
            BoardError::Validation(msg) => Self::ValidationError(msg),
            BoardError::Database(msg) => Self::DatabaseError(msg),
            BoardError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_details_but_keep_them_in_extensions() {
        let response = ApiError::InternalError("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let failure = response.extensions().get::<InternalFailure>().unwrap();
        assert_eq!(failure.detail, "disk on fire");
    }

    #[test]
    fn client_errors_carry_no_failure() {
        let response = ApiError::Conflict("taken".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.extensions().get::<InternalFailure>().is_none());
    }

    #[test]
    fn board_errors_map_to_status() {
        let forbidden: ApiError = BoardError::Forbidden(Forbidden {
            action: "edit this post",
        })
        .into();
        assert!(matches!(forbidden, ApiError::Forbidden(_)));

        let missing: ApiError = BoardError::PostNotFound(7).into();
        assert!(matches!(missing, ApiError::NotFound(m) if m.contains('7')));
    }
}
