//! Unified error handling for the HTTP layer
//!
//! [`AppError`] maps domain failures onto HTTP responses with stable string
//! codes; [`AppResponse`] is the uniform success/error envelope.
//!
//! | Code  | Meaning              | Status |
//! |-------|----------------------|--------|
//! | 0000  | success              | 200    |
//! | E0002 | validation failed    | 400    |
//! | E0003 | resource not found   | 404    |
//! | E0004 | state conflict       | 409    |
//! | E0005 | business rule        | 422    |
//! | E9001 | internal error       | 500    |
//!
//! Conflict and business-rule responses carry structured `data` so callers
//! can resolve the failure without guessing: a conflict names the record's
//! actual current state, an insufficient-stock failure itemizes every
//! shortfall.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Uniform API response envelope
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (0000 means success)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> AppResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: "0000".to_string(),
            message: "success".to_string(),
            data: Some(data),
        }
    }

}

impl AppResponse<()> {
    pub fn ok() -> Self {
        Self {
            code: "0000".to_string(),
            message: "success".to_string(),
            data: None,
        }
    }
}

/// Application error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Resource does not exist (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Malformed or unknown input (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Requested transition lost against actual state (409)
    #[error("State conflict: {message}")]
    Conflict {
        message: String,
        /// The record's actual current state, so the caller can re-fetch and retry
        details: Option<serde_json::Value>,
    },

    /// Business rule blocked the operation (422)
    #[error("Business rule violation: {message}")]
    BusinessRule {
        message: String,
        /// Structured failure data (e.g. itemized stock shortfalls)
        details: Option<serde_json::Value>,
    },

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        AppError::Conflict {
            message: msg.into(),
            details,
        }
    }

    pub fn business_rule(msg: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        AppError::BusinessRule {
            message: msg.into(),
            details,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg, None),
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "E0004", message, details)
            }
            AppError::BusinessRule { message, details } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", message, details)
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = AppResponse::<serde_json::Value> {
            code: code.to_string(),
            message,
            data: details,
        };
        (status, Json(body)).into_response()
    }
}

/// Handler result alias
pub type AppResult<T> = Result<T, AppError>;
