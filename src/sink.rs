//! The logging handle used by request processing.
//!
//! Alert lines are never written through the global `tracing` macros from
//! request code directly. Instead an [`AlertSink`] is injected into the
//! server state, which keeps the per-alert output observable in tests.

use tracing::Level;

/// Receives every alert line emitted while processing an intake request.
pub trait AlertSink: Send + Sync {
    /// Emits one line at the given level, tagged with the request category.
    fn emit(&self, level: Level, category: &str, message: &str);
}

/// An [`AlertSink`] that forwards lines to `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl AlertSink for TracingSink {
    fn emit(&self, level: Level, category: &str, message: &str) {
        match level {
            Level::ERROR => {
                tracing::error!(target: "webhook_receiver::alerts", category, "{}", message)
            }
            Level::WARN => {
                tracing::warn!(target: "webhook_receiver::alerts", category, "{}", message)
            }
            Level::INFO => {
                tracing::info!(target: "webhook_receiver::alerts", category, "{}", message)
            }
            Level::DEBUG => {
                tracing::debug!(target: "webhook_receiver::alerts", category, "{}", message)
            }
            Level::TRACE => {
                tracing::trace!(target: "webhook_receiver::alerts", category, "{}", message)
            }
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::{MemorySink, SinkLine};

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use super::AlertSink;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    /// A captured sink line.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SinkLine {
        pub level: Level,
        pub category: String,
        pub message: String,
    }

    /// An in-memory sink that records every line for later inspection.
    #[derive(Debug, Clone, Default)]
    pub struct MemorySink {
        lines: Arc<Mutex<Vec<SinkLine>>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns a snapshot of all lines recorded so far.
        pub fn lines(&self) -> Vec<SinkLine> {
            self.lines.lock().unwrap().clone()
        }

        /// Returns only the messages, in emission order.
        pub fn messages(&self) -> Vec<String> {
            self.lines().into_iter().map(|l| l.message).collect()
        }

        pub fn contains(&self, message: &str) -> bool {
            self.lines().iter().any(|l| l.message == message)
        }
    }

    impl AlertSink for MemorySink {
        fn emit(&self, level: Level, category: &str, message: &str) {
            self.lines.lock().unwrap().push(SinkLine {
                level,
                category: category.to_string(),
                message: message.to_string(),
            });
        }
    }
}
