//! # Intake Server
//!
//! The `axum` router for the webhook receiver:
//!
//! - `GET /health` returns a fixed JSON status.
//! - `POST` on any path is an intake request whose category is the final
//!   path segment.
//! - Any other `GET` is a 404 and any other method (`HEAD` included) a 501,
//!   both with an empty body.

use crate::core::Category;
use crate::error::IngressError;
use crate::intake::{parse_envelope, process_envelope, read_body};
use crate::notification::HandlerTable;
use crate::sink::AlertSink;
use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, instrument, trace};

/// Body returned by the health check.
pub const HEALTH_BODY: &str = r#"{"status": "healthy", "service": "webhook-receiver"}"#;
/// Body returned for a successful intake request.
pub const OK_BODY: &str = r#"{"status": "ok"}"#;

/// Shared, read-only state for all requests.
#[derive(Clone)]
pub struct IngressState {
    pub handlers: Arc<HandlerTable>,
    pub sink: Arc<dyn AlertSink>,
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for IngressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngressState")
            .field("handlers", &self.handlers)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

/// Builds the intake router.
pub fn router(state: IngressState) -> Router {
    Router::new()
        .route(
            "/health",
            get(health)
                .head(not_implemented)
                .post(intake)
                .fallback(not_implemented),
        )
        .fallback(fallback)
        .with_state(state)
}

async fn health() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        HEALTH_BODY,
    )
        .into_response()
}

async fn fallback(state: State<IngressState>, request: Request) -> Response {
    let method = request.method().clone();
    if method == Method::POST {
        intake(state, request).await
    } else if method == Method::GET {
        StatusCode::NOT_FOUND.into_response()
    } else {
        not_implemented().await
    }
}

async fn not_implemented() -> Response {
    StatusCode::NOT_IMPLEMENTED.into_response()
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
async fn intake(state: State<IngressState>, request: Request) -> Response {
    let start = Instant::now();
    let category = Category::from_path(request.uri().path());

    let response = match handle_intake(&state, &category, request).await {
        Ok(count) => {
            trace!(category = %category, count, "Intake request processed");
            metrics::counter!("webhook_requests_total", "outcome" => "ok").increment(1);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                OK_BODY,
            )
                .into_response()
        }
        Err(e) => {
            error!(
                category = %category,
                malformed = e.is_malformed_request(),
                error = %e,
                "Error processing webhook"
            );
            metrics::counter!("webhook_requests_total", "outcome" => "error").increment(1);
            if let IngressError::Handler { .. } = &e {
                metrics::counter!("handler_failures_total", "category" => category.to_string())
                    .increment(1);
            }
            e.into_response()
        }
    };

    metrics::histogram!("webhook_request_duration_seconds").record(start.elapsed().as_secs_f64());
    response
}

async fn handle_intake(
    state: &IngressState,
    category: &Category,
    request: Request,
) -> Result<usize, IngressError> {
    let (parts, body) = request.into_parts();
    let body = read_body(&parts.headers, body, state.max_body_bytes).await?;
    let envelope = parse_envelope(&body)?;
    process_envelope(category, &envelope, &state.handlers, state.sink.as_ref()).await
}
