//! Routes alerts to per-category handlers.
//!
//! Every intake request carries a category taken from its URL. The
//! [`HandlerTable`] maps category names to [`CategoryHandler`]s and falls
//! back to a default handler for anything it does not know. All alerts of a
//! single request go to the same handler.

pub mod marker;

pub use marker::{LogMarkerHandler, MarkerLevel};

use crate::config::CategoryRoute;
use crate::core::{AlertSummary, Category};
use crate::sink::AlertSink;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A handler invoked once for every alert routed to a category.
#[async_trait]
pub trait CategoryHandler: Send + Sync {
    /// A short name for diagnostics.
    fn name(&self) -> &str;

    /// Handles one alert. An error fails the whole intake request.
    async fn handle(
        &self,
        category: &Category,
        alert: &AlertSummary,
        sink: &dyn AlertSink,
    ) -> anyhow::Result<()>;
}

/// Maps category names to handlers, with a fallback for unknown categories.
#[derive(Clone)]
pub struct HandlerTable {
    handlers: HashMap<String, Arc<dyn CategoryHandler>>,
    fallback: Arc<dyn CategoryHandler>,
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut categories: Vec<&String> = self.handlers.keys().collect();
        categories.sort();
        f.debug_struct("HandlerTable")
            .field("categories", &categories)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HandlerTable {
    /// Creates an empty table that routes everything to `fallback`.
    pub fn new(fallback: Arc<dyn CategoryHandler>) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback,
        }
    }

    /// The standard table with the five known categories.
    pub fn builtin() -> Self {
        let mut table = Self::new(Arc::new(LogMarkerHandler::general()));
        table.register("critical", Arc::new(LogMarkerHandler::critical()));
        table.register("database", Arc::new(LogMarkerHandler::database()));
        table.register("security", Arc::new(LogMarkerHandler::security()));
        table.register("development", Arc::new(LogMarkerHandler::development()));
        table.register("operations", Arc::new(LogMarkerHandler::operations()));
        table
    }

    /// The builtin table extended with marker routes from configuration.
    ///
    /// A configured route with the name of an existing category replaces it.
    pub fn from_routes(routes: &[CategoryRoute]) -> Self {
        let mut table = Self::builtin();
        for route in routes {
            debug!(category = %route.name, level = ?route.level, "Registering configured category route");
            table.register(
                route.name.clone(),
                Arc::new(LogMarkerHandler::new(route.level, route.message.clone())),
            );
        }
        table
    }

    /// Registers `handler` for `category`, returning the handler it replaced.
    pub fn register(
        &mut self,
        category: impl Into<String>,
        handler: Arc<dyn CategoryHandler>,
    ) -> Option<Arc<dyn CategoryHandler>> {
        self.handlers.insert(category.into(), handler)
    }

    /// Replaces the fallback handler.
    pub fn set_fallback(&mut self, handler: Arc<dyn CategoryHandler>) {
        self.fallback = handler;
    }

    /// Returns the handler for `category`, or the fallback.
    pub fn resolve(&self, category: &Category) -> &Arc<dyn CategoryHandler> {
        self.handlers.get(category.as_str()).unwrap_or(&self.fallback)
    }

    /// Whether `category` has its own handler.
    pub fn is_registered(&self, category: &str) -> bool {
        self.handlers.contains_key(category)
    }

    /// Registered category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
