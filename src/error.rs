/*
 * Responsibility
 * - AppError shared by middleware, extractors and handlers
 * - IntoResponse (HTTP status / JSON error body)
 * - Authentication failures all collapse into one opaque `Unauthorized`
 * - Transport failures (timeout, layer errors) use the same `{"error": ...}` shape
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    // No detail on purpose: callers must not learn which check failed.
    #[error("unauthorized")]
    Unauthorized,
    #[error("request timeout")]
    RequestTimeout,
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::RequestTimeout => (StatusCode::REQUEST_TIMEOUT, "Request Timeout"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
