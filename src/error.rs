// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Geodesignhub API error: {0}")]
    Geodesignhub(String),

    #[error("Feature service error: {0}")]
    FeatureService(String),

    #[error("Geodesignhub project not ready: {0}")]
    ProjectNotReady(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message sent back by Geodesignhub for a rejected API token.
    pub const GDH_TOKEN_ERROR: &'static str =
        "Problem with your API token, please verify by going to https://www.geodesignhub.com/api/token/";

    /// Message sent back by Geodesignhub for an unknown or inaccessible project.
    pub const GDH_PROJECT_ERROR: &'static str =
        "Please verify the Project ID, it does not exist or you dont have access to it";
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Geodesignhub(msg) => {
                tracing::warn!(error = %msg, "Geodesignhub request failed");
                (StatusCode::BAD_GATEWAY, "geodesignhub_error", Some(msg.clone()))
            }
            AppError::FeatureService(msg) => {
                tracing::warn!(error = %msg, "Feature service request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "feature_service_error",
                    Some(msg.clone()),
                )
            }
            AppError::ProjectNotReady(msg) => {
                (StatusCode::CONFLICT, "project_not_ready", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
