//! HTTP error mapping.
//!
//! Every failure body has the same shape as a success body with
//! `success: false`, which is what the web client expects.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// An error response: a status code and a message for the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Build an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 — the request body failed validation.
    pub fn invalid_input() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid input")
    }

    /// 403 — the caller's identity exists but is not verified.
    pub fn unverified() -> Self {
        Self::new(StatusCode::FORBIDDEN, "User email not verified.")
    }

    /// 404 — nothing matched; pagination uses this as "no more pages".
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 — an unexpected internal failure (already logged).
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!("internal error: {e:?}");
        Self::internal()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
