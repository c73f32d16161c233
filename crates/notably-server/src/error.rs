use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notably::errors::{NoteError, RelayError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can answer with, rendered as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Note(#[from] NoteError),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("{}", .0.body_text())]
    Json(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Relay(RelayError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Relay(RelayError::Upstream { .. } | RelayError::Connection(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Note(NoteError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Note(NoteError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Note(NoteError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Note(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Json(rejection) => rejection.status(),
            ApiError::Query(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
