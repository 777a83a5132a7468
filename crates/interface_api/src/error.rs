//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_lifecycle::LifecycleError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0:?}")]
    Validation(Vec<String>),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

fn lifecycle_status(err: &LifecycleError) -> StatusCode {
    match err {
        LifecycleError::NotFound { .. } => StatusCode::NOT_FOUND,
        LifecycleError::Validation(_) | LifecycleError::BelowMinimum { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LifecycleError::Unauthorized(_) => StatusCode::FORBIDDEN,
        LifecycleError::InvalidAmount(_) | LifecycleError::InvalidInterval(_) => {
            StatusCode::BAD_REQUEST
        }
        LifecycleError::AlreadyInTerminalState(_) | LifecycleError::Conflict(_) => {
            StatusCode::CONFLICT
        }
        LifecycleError::PaymentNotCaptured(_) => StatusCode::PAYMENT_REQUIRED,
        LifecycleError::Port(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::Validation(problems) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(problems),
            ),
            ApiError::Lifecycle(err) => {
                let status = lifecycle_status(&err);
                if status.is_server_error() {
                    error!(error = %err, "Engine call failed");
                    (status, err.kind(), "Internal server error".to_string(), None)
                } else {
                    (status, err.kind(), err.to_string(), None)
                }
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden(msg) => ApiError::Forbidden(msg),
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::InvalidSubject => {
                ApiError::Unauthorized
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let problems = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        ApiError::Validation(problems)
    }
}
