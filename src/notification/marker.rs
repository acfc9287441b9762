//! Category handlers that only emit a marker line.
//!
//! These stand in for real notifiers (paging, chat, ticketing). Each one
//! writes a single line to the sink for every alert routed to it.

use super::CategoryHandler;
use crate::core::{AlertSummary, Category};
use crate::sink::AlertSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::Level;

/// The level a marker line is emitted at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarkerLevel {
    #[default]
    Info,
    Warn,
    Error,
}

impl From<MarkerLevel> for Level {
    fn from(level: MarkerLevel) -> Self {
        match level {
            MarkerLevel::Info => Level::INFO,
            MarkerLevel::Warn => Level::WARN,
            MarkerLevel::Error => Level::ERROR,
        }
    }
}

/// A handler that logs a fixed message for each alert it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMarkerHandler {
    level: MarkerLevel,
    message: String,
}

impl LogMarkerHandler {
    pub fn new(level: MarkerLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn critical() -> Self {
        Self::new(
            MarkerLevel::Warn,
            "CRITICAL ALERT — immediate attention required",
        )
    }

    pub fn database() -> Self {
        Self::new(MarkerLevel::Info, "Database alert — notifying database team")
    }

    pub fn security() -> Self {
        Self::new(MarkerLevel::Warn, "Security alert — notifying security team")
    }

    pub fn development() -> Self {
        Self::new(MarkerLevel::Info, "Development alert — notifying dev team")
    }

    pub fn operations() -> Self {
        Self::new(MarkerLevel::Info, "Operations alert — notifying ops team")
    }

    /// The fallback for categories without a registered handler.
    pub fn general() -> Self {
        Self::new(MarkerLevel::Info, "General alert — default handling")
    }
}

#[async_trait]
impl CategoryHandler for LogMarkerHandler {
    fn name(&self) -> &str {
        "log_marker"
    }

    async fn handle(
        &self,
        category: &Category,
        _alert: &AlertSummary,
        sink: &dyn AlertSink,
    ) -> anyhow::Result<()> {
        sink.emit(self.level.into(), category.as_str(), &self.message);
        Ok(())
    }
}
