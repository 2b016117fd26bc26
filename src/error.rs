// src/error.rs
//! Caller-visible error taxonomy for the HTTP surface.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input.
    #[error("{0}")]
    BadRequest(String),

    /// Lookup miss on an id-keyed operation.
    #[error("{0}")]
    NotFound(String),

    /// Anything unexpected; the message is what the caller sees.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Used for poisoned locks: the store stays as it was, the request fails.
    pub(crate) fn poisoned(what: &str) -> Self {
        tracing::error!(lock = what, "lock poisoned");
        ApiError::Internal(format!("{what} unavailable"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rej: JsonRejection) -> Self {
        ApiError::BadRequest(rej.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
