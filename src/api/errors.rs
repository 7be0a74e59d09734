use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{BookingError, DocumentError, EmailError, SuggestionError};

/// API-boundary error. Service errors convert into it and surface as a
/// JSON body with a matching status code; nothing is retried.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Upstream service unavailable: {0}")]
    Upstream(String),
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "Upstream service unavailable"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            ApiError::Conflict("a record with this value already exists".to_string())
        } else {
            ApiError::Database(err)
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sqlx::Error>() {
            Ok(db) => db.into(),
            Err(err) => ApiError::Internal(err),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound => ApiError::NotFound("booking"),
            BookingError::Validation(msg) => ApiError::Validation(msg),
            BookingError::Conflict(msg) => ApiError::Conflict(msg),
            BookingError::IllegalTransition { from, to } => {
                ApiError::Conflict(format!("Cannot move booking from {from} to {to}"))
            }
            BookingError::Database(db) => db.into(),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound => ApiError::NotFound("document"),
            DocumentError::Validation(msg) => ApiError::Validation(msg),
            DocumentError::Io(e) => ApiError::Internal(e.into()),
            DocumentError::Database(db) => db.into(),
        }
    }
}

impl From<SuggestionError> for ApiError {
    fn from(err: SuggestionError) -> Self {
        match err {
            SuggestionError::NotConfigured => {
                ApiError::Upstream("suggestion endpoint not configured".to_string())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
