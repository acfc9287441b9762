//! Core domain types for the webhook receiver
//!
//! This module defines the Alertmanager-shaped payload accepted by the intake
//! endpoint, the defaults-applied view of each alert, and the routing
//! category derived from the request path.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Placeholder used for every missing label except `alertname`.
pub const UNKNOWN: &str = "unknown";
/// Placeholder used when the `alertname` label is missing.
pub const UNKNOWN_ALERT_NAME: &str = "Unknown";
pub const NO_SUMMARY: &str = "No summary available";
pub const NO_DESCRIPTION: &str = "No description available";

/// The top-level body of an alert notification.
///
/// Every field other than `alerts` is kept as raw JSON, so a sender that
/// puts a number or an object where a string is expected is still accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlertEnvelope {
    /// Group status, usually "firing" or "resolved".
    #[serde(default)]
    pub status: Option<Value>,
    /// The individual alerts, in delivery order.
    #[serde(default)]
    pub alerts: Vec<AlertRecord>,
    #[serde(default)]
    pub receiver: Option<Value>,
    #[serde(default)]
    pub group_key: Option<Value>,
    #[serde(default, rename = "externalURL")]
    pub external_url: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub truncated_alerts: Option<Value>,
}

impl AlertEnvelope {
    /// The envelope status, or `"unknown"` when absent or null.
    pub fn status(&self) -> String {
        text_or(self.status.as_ref(), UNKNOWN)
    }
}

/// A single alert inside an envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    #[serde(default)]
    pub labels: HashMap<String, Value>,
    #[serde(default)]
    pub annotations: HashMap<String, Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub starts_at: Option<Value>,
    #[serde(default)]
    pub ends_at: Option<Value>,
    #[serde(default, rename = "generatorURL")]
    pub generator_url: Option<Value>,
    #[serde(default)]
    pub fingerprint: Option<Value>,
}

/// Renders a JSON value as log text.
///
/// Strings are taken as-is, `null` counts as missing, and anything else is
/// written as compact JSON (`3`, `true`, `["a"]`).
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Like [`value_text`], with `default` for a missing or null value.
pub fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(value_text)
        .unwrap_or_else(|| default.to_string())
}

impl AlertRecord {
    fn label_or(&self, key: &str, default: &str) -> String {
        text_or(self.labels.get(key), default)
    }

    fn annotation_or(&self, key: &str, default: &str) -> String {
        text_or(self.annotations.get(key), default)
    }

    /// Builds the summary that gets logged and handed to a category handler.
    ///
    /// `status` is the envelope status; the per-record status is not used for
    /// the summary.
    pub fn summarize(&self, status: &str) -> AlertSummary {
        AlertSummary {
            alert_name: self.label_or("alertname", UNKNOWN_ALERT_NAME),
            status: status.to_string(),
            severity: self.label_or("severity", UNKNOWN),
            service: self.label_or("service", UNKNOWN),
            instance: self.label_or("instance", UNKNOWN),
            summary: self.annotation_or("summary", NO_SUMMARY),
            description: self.annotation_or("description", NO_DESCRIPTION),
        }
    }
}

/// The defaults-applied view of an [`AlertRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertSummary {
    pub alert_name: String,
    pub status: String,
    pub severity: String,
    pub service: String,
    pub instance: String,
    pub summary: String,
    pub description: String,
}

impl AlertSummary {
    /// The log lines for this alert, in emission order, including the
    /// trailing separator.
    pub fn log_lines(&self) -> [String; 8] {
        [
            format!("Alert: {}", self.alert_name),
            format!("Status: {}", self.status),
            format!("Severity: {}", self.severity),
            format!("Service: {}", self.service),
            format!("Instance: {}", self.instance),
            format!("Summary: {}", self.summary),
            format!("Description: {}", self.description),
            SEPARATOR.to_string(),
        ]
    }
}

/// Visual separator logged after each alert.
pub const SEPARATOR: &str = "--------------------------------------------------";

/// The routing key for an intake request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Sentinel category for paths without a usable final segment.
    pub const DEFAULT: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derives the category from a request path.
    ///
    /// The category is whatever follows the last `/`. A path without any `/`
    /// or with an empty final segment yields `"default"`.
    pub fn from_path(path: &str) -> Self {
        match path.rsplit_once('/') {
            Some((_, last)) if !last.is_empty() => Self(last.to_string()),
            _ => Self(Self::DEFAULT.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
