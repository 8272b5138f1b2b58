//! API error types and responses.
//!
//! This module defines the standard error format for all API responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use syllabusdb_auth::AuthError;
use syllabusdb_moderation::ControlError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller failed the admin gate and is sent elsewhere.
    #[error("redirect to {0}")]
    Redirect(String),

    /// The caller is not allowed to do this.
    #[error("forbidden")]
    Forbidden,

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request body or parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An outbound service failed.
    #[error("upstream error: {0}")]
    BadGateway(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Redirect(_) => StatusCode::SEE_OTHER,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Redirect(_) => "redirect",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::BadGateway(_) => "bad_gateway",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Redirect(url) = &self {
            return Redirect::to(url).into_response();
        }

        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        tracing::error!(error = %err, "Auth internal error");
        Self::Internal("authentication service error".to_string())
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Unauthorized => Self::Forbidden,
            ControlError::NotFound(path) => Self::NotFound(path),
            ControlError::SagaFailed {
                saga,
                step,
                source,
                rolled_back,
                unrepaired,
            } => {
                tracing::error!(
                    saga,
                    step,
                    error = %source,
                    rolled_back = ?rolled_back,
                    unrepaired = ?unrepaired,
                    "Moderation action failed"
                );
                Self::Internal("the action could not be completed".to_string())
            }
            ControlError::Outbound(msg) => {
                tracing::warn!(error = %msg, "Outbound service error");
                Self::BadGateway(msg)
            }
            ControlError::Store(e) => {
                tracing::error!(error = %e, "Store error");
                Self::Internal("storage error".to_string())
            }
            ControlError::Blob(e) => {
                tracing::error!(error = %e, "Blob store error");
                Self::Internal("storage error".to_string())
            }
            ControlError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Self::Internal(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            ApiError::Redirect("/".into()).status_code(),
            StatusCode::SEE_OTHER
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadGateway("test".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn redirect_sets_location() {
        let response = ApiError::Redirect("https://syllabusdb.com".into()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "https://syllabusdb.com"
        );
    }

    #[test]
    fn saga_failure_hides_details() {
        let err = ControlError::SagaFailed {
            saga: "approve-syllabus",
            step: "college-total",
            source: Box::new(ControlError::Internal("disk full".into())),
            rolled_back: vec!["course-approval"],
            unrepaired: vec![],
        };

        let api = ApiError::from(err);
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.to_string().contains("disk full"));
    }
}
