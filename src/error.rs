use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const INVALID_CREDENTIALS: &str = "invalid email or password";
pub const TASK_NOT_FOUND: &str = "task not found or access denied";

/// Every failure an RPC procedure can report to its caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },
    #[error("{field} already exists")]
    Conflict { field: &'static str },
    #[error("{0}")]
    Authentication(&'static str),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict { .. } => "CONFLICT",
            Self::Authentication(_) => "AUTHENTICATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Authentication(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let body = match &self {
            Self::Validation { field, message } => json!({
                "error": { "code": code, "message": message, "field": field }
            }),
            Self::Conflict { field } => json!({
                "error": { "code": code, "message": self.to_string(), "field": field }
            }),
            Self::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                json!({ "error": { "code": code, "message": "internal server error" } })
            }
            _ => json!({ "error": { "code": code, "message": self.to_string() } }),
        };
        (status, Json(body)).into_response()
    }
}
