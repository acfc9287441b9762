//! Errors raised while handling an intake request.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body returned for every failed intake request.
pub const ERROR_BODY: &str = r#"{"status": "error"}"#;

/// Everything that can fail an intake request.
///
/// Callers always see the same 500 response; the variant and its cause only
/// show up in the error log.
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("missing Content-Length header")]
    MissingContentLength,

    #[error("invalid Content-Length header: {0:?}")]
    InvalidContentLength(String),

    #[error("declared body of {declared} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { declared: u64, limit: usize },

    #[error("failed to read request body: {0}")]
    BodyRead(#[from] axum::Error),

    #[error("body is {actual} bytes but Content-Length declared {declared}")]
    LengthMismatch { declared: u64, actual: usize },

    #[error("request body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("top-level JSON value must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("malformed alert envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    #[error("handler '{handler}' failed for category '{category}': {cause:#}")]
    Handler {
        category: String,
        handler: String,
        cause: anyhow::Error,
    },
}

impl IngressError {
    /// Whether the fault came from the request itself rather than a handler.
    pub fn is_malformed_request(&self) -> bool {
        !matches!(self, IngressError::Handler { .. })
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "application/json")],
            ERROR_BODY,
        )
            .into_response()
    }
}
