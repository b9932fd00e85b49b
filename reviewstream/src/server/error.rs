//! HTTP error bodies.

use crate::errors::{ErrorResponse, ReviewError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

/// Errors returned by the JSON endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// A review ended with an error.
    Review(ReviewError),
    /// The request itself was rejected.
    Http {
        /// Response status.
        status: StatusCode,
        /// Cause.
        message: String,
    },
}

impl ApiError {
    fn into_body(self) -> ErrorResponse {
        match self {
            Self::Review(ReviewError::Validation(failure)) => ErrorResponse::new(
                StatusCode::BAD_REQUEST.as_u16(),
                failure.feedback.clone(),
                "VALIDATION_ERROR",
            )
            .with_feedback(failure.feedback),
            Self::Review(other) => ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                other.to_string(),
                other.error_type(),
            ),
            Self::Http { status, message } => ErrorResponse::new(status.as_u16(), message, "HTTP_ERROR"),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        Self::Review(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Http {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.into_body();
        let status = StatusCode::from_u16(body.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(status = body.status_code, error_type = %body.error_type, message = %body.message, "Request failed");
        } else {
            warn!(status = body.status_code, error_type = %body.error_type, message = %body.message, "Request rejected");
        }
        (status, Json(body)).into_response()
    }
}
