//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from haul-state to HTTP status codes: rejected
//! transition shapes and unsatisfied proof-of-delivery gates are client
//! errors (400), authorization failures are 403, missing records are 404,
//! and optimistic-concurrency failures are 409. Returns JSON error bodies
//! with a machine-readable code and message. Never exposes internal error
//! details in responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use haul_state::{LoadError, TripError};

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "INVALID_TRANSITION").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed, or the requested transition was
    /// rejected by the lifecycle rules (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure — missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure — the principal lacks authority over the
    /// record (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The record's committed state no longer matches what the caller
    /// observed; re-fetch and resubmit (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned
    /// to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Trip-machine rejections are client errors: the caller asked for a
/// transition the lifecycle rules forbid.
impl From<TripError> for AppError {
    fn from(err: TripError) -> Self {
        match &err {
            TripError::InvalidTransition { .. } | TripError::PodNotSatisfied { .. } => {
                Self::BadRequest(err.to_string())
            }
        }
    }
}

/// Load-machine rejections are likewise client errors.
impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        match &err {
            LoadError::InvalidTransition { .. }
            | LoadError::Terminal { .. }
            | LoadError::PodNotSubmittable { .. }
            | LoadError::PodNotSubmitted => Self::BadRequest(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haul_state::{LoadStatus, TripStatus};

    #[test]
    fn not_found_status_code() {
        let err = AppError::NotFound("missing trip".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn validation_status_code() {
        let err = AppError::Validation("bad field".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn bad_request_status_code() {
        let err = AppError::BadRequest("malformed JSON".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn forbidden_status_code() {
        let err = AppError::Forbidden("wrong organization".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "FORBIDDEN");
    }

    #[test]
    fn conflict_status_code() {
        let err = AppError::Conflict("status changed".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONFLICT");
    }

    #[test]
    fn trip_errors_map_to_bad_request() {
        let err = AppError::from(TripError::InvalidTransition {
            from: TripStatus::Delivered,
            to: TripStatus::InTransit,
        });
        let (status, _) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("DELIVERED"));

        let err = AppError::from(TripError::PodNotSatisfied {
            submitted: true,
            verified: false,
        });
        let (status, _) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("proof of delivery"));
    }

    #[test]
    fn load_errors_map_to_bad_request() {
        let err = AppError::from(LoadError::InvalidTransition {
            from: LoadStatus::Draft,
            to: LoadStatus::Assigned,
        });
        let (status, _) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    /// Extract status and parsed body from a response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, body) = response_parts(AppError::NotFound("trip 123".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert!(body.error.message.contains("trip 123"));
    }

    #[tokio::test]
    async fn into_response_conflict() {
        let (status, body) =
            response_parts(AppError::Conflict("expected ASSIGNED, found CANCELLED".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.code, "CONFLICT");
        assert!(body.error.message.contains("CANCELLED"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("lock poisoned".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(
            !body.error.message.contains("lock poisoned"),
            "internal error details must not leak: {}",
            body.error.message
        );
        assert_eq!(body.error.message, "An internal error occurred");
    }
}
