//! HTTP error responses for the OAuth endpoints.
//!
//! Browser-facing endpoints answer in plain text. `/token` answers with the
//! JSON error object OAuth clients expect.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid request")]
    InvalidRequest,

    #[error("invalid state")]
    InvalidState,

    #[error("missing authorization code")]
    MissingCode,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unauthorized")]
    Unauthorized,

    /// Token exchange or identity fetch failed upstream.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// `/token` failure, rendered as `{"error": code, "error_description": ...}`.
    #[error("{error}: {description}")]
    OAuth {
        error: &'static str,
        description: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn invalid_grant<E: std::fmt::Display>(err: E) -> Self {
        Self::OAuth {
            error: "invalid_grant",
            description: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest => (StatusCode::BAD_REQUEST, "Invalid request"),
            AppError::InvalidState => (StatusCode::BAD_REQUEST, "Invalid state"),
            AppError::MissingCode => (StatusCode::BAD_REQUEST, "Missing code"),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            AppError::Unauthorized => {
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    "Unauthorized",
                )
                    .into_response();
            }
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream identity provider failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to authenticate with upstream provider")
            }
            AppError::OAuth { error, description } => {
                return (
                    StatusCode::BAD_REQUEST,
                    [(header::CACHE_CONTROL, "no-store")],
                    Json(json!({ "error": error, "error_description": description })),
                )
                    .into_response();
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}

impl From<crate::auth::upstream::UpstreamError> for AppError {
    fn from(value: crate::auth::upstream::UpstreamError) -> Self {
        AppError::Upstream(value.to_string())
    }
}
