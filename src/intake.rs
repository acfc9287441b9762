//! Validation and processing of intake requests.
//!
//! An intake request goes through three steps: the declared body length is
//! checked and the body read, the body is decoded into an [`AlertEnvelope`],
//! and every alert in the envelope is logged and dispatched to the handler of
//! the request's category.

use crate::core::{text_or, AlertEnvelope, Category};
use crate::error::IngressError;
use crate::notification::HandlerTable;
use crate::sink::AlertSink;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap};
use serde_json::Value;
use tracing::{debug, Level};

/// Reads the `Content-Length` header as a byte count.
pub fn declared_length(headers: &HeaderMap) -> Result<u64, IngressError> {
    let value = headers
        .get(header::CONTENT_LENGTH)
        .ok_or(IngressError::MissingContentLength)?;
    let text = value
        .to_str()
        .map_err(|_| IngressError::InvalidContentLength(format!("{:?}", value)))?;
    text.trim()
        .parse::<u64>()
        .map_err(|_| IngressError::InvalidContentLength(text.to_string()))
}

/// Reads exactly the declared number of bytes from `body`.
///
/// Declared lengths above `limit` are rejected without reading.
pub async fn read_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Vec<u8>, IngressError> {
    let declared = declared_length(headers)?;
    if declared > limit as u64 {
        return Err(IngressError::PayloadTooLarge { declared, limit });
    }

    let bytes = to_bytes(body, limit).await?;
    let declared = declared as usize;
    if bytes.len() < declared {
        return Err(IngressError::LengthMismatch {
            declared: declared as u64,
            actual: bytes.len(),
        });
    }
    Ok(bytes[..declared].to_vec())
}

/// Decodes a request body into an envelope.
///
/// The body must be UTF-8 holding a single JSON object.
pub fn parse_envelope(body: &[u8]) -> Result<AlertEnvelope, IngressError> {
    let text = std::str::from_utf8(body)?;
    let value: Value = serde_json::from_str(text).map_err(IngressError::InvalidJson)?;
    if !value.is_object() {
        return Err(IngressError::NotAnObject(json_kind(&value)));
    }
    serde_json::from_value(value).map_err(IngressError::InvalidEnvelope)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Logs and dispatches every alert in `envelope`.
///
/// Alerts are handled one at a time, in order. The first handler failure
/// stops processing; lines already emitted for earlier alerts stay.
/// Returns the number of alerts processed.
pub async fn process_envelope(
    category: &Category,
    envelope: &AlertEnvelope,
    handlers: &HandlerTable,
    sink: &dyn AlertSink,
) -> Result<usize, IngressError> {
    let name = category.as_str();
    sink.emit(Level::INFO, name, &format!("Received {} alert", category));

    if envelope.receiver.is_some() {
        debug!(
            category = name,
            receiver = text_or(envelope.receiver.as_ref(), ""),
            group_key = text_or(envelope.group_key.as_ref(), ""),
            alerts = envelope.alerts.len(),
            "Envelope metadata"
        );
    }

    let handler = handlers.resolve(category);
    debug!(
        category = name,
        handler = handler.name(),
        registered = handlers.is_registered(name),
        "Resolved category handler"
    );
    let status = envelope.status();

    for (processed, record) in envelope.alerts.iter().enumerate() {
        let summary = record.summarize(&status);
        for line in summary.log_lines() {
            sink.emit(Level::INFO, name, &line);
        }
        debug!(
            category = name,
            fingerprint = text_or(record.fingerprint.as_ref(), ""),
            starts_at = text_or(record.starts_at.as_ref(), ""),
            ends_at = text_or(record.ends_at.as_ref(), ""),
            alert_status = text_or(record.status.as_ref(), ""),
            generator_url = text_or(record.generator_url.as_ref(), ""),
            "Alert metadata"
        );

        handler
            .handle(category, &summary, sink)
            .await
            .map_err(|cause| IngressError::Handler {
                category: name.to_string(),
                handler: handler.name().to_string(),
                cause,
            })?;
        metrics::counter!("alerts_received_total", "category" => name.to_string()).increment(1);
        debug!(category = name, index = processed, "Alert dispatched");
    }

    Ok(envelope.alerts.len())
}
