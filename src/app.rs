//! The main application logic, decoupled from the entry point.

use crate::{
    config::Config,
    internal_metrics::MetricsBuilder,
    notification::HandlerTable,
    server::{router, IngressState},
    sink::{AlertSink, TracingSink},
};
use anyhow::{Context, Result};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::watch, task::JoinHandle};
use tracing::{error, info, instrument};

/// Endpoints advertised in the startup log.
pub const ENDPOINTS: [&str; 6] = [
    "POST /webhook/critical - Critical alerts",
    "POST /webhook/database - Database alerts",
    "POST /webhook/security - Security alerts",
    "POST /webhook/development - Development alerts",
    "POST /webhook/operations - Operations alerts",
    "GET /health - Health check",
];

/// A bound, ready-to-serve receiver.
pub struct App {
    listener: TcpListener,
    state: IngressState,
    local_addr: SocketAddr,
    metrics_addr: Option<SocketAddr>,
    metrics_task: Option<JoinHandle<()>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// The address the intake server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_addr
    }

    /// Serves requests until the shutdown signal fires, then closes the
    /// listener.
    pub async fn run(self) -> Result<()> {
        let mut shutdown_rx = self.shutdown_rx.clone();
        let app = router(self.state);

        axum::serve(self.listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
                info!("Shutting down webhook receiver...");
            })
            .await
            .context("intake server failed")?;

        if let Some(handle) = self.metrics_task {
            if let Err(e) = handle.await {
                error!("Metrics task panicked: {:?}", e);
            }
        }

        info!("Webhook receiver stopped.");
        Ok(())
    }
}

/// Builder for the main application.
///
/// Components can be overridden for testing.
pub struct AppBuilder {
    config: Config,
    sink_override: Option<Arc<dyn AlertSink>>,
    handlers_override: Option<HandlerTable>,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sink_override: None,
            handlers_override: None,
        }
    }

    /// Overrides the alert sink.
    pub fn sink_override(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink_override = Some(sink);
        self
    }

    /// Overrides the handler table built from configuration.
    pub fn handlers_override(mut self, handlers: HandlerTable) -> Self {
        self.handlers_override = Some(handlers);
        self
    }

    /// Binds the intake listener, and the metrics listener when enabled.
    #[instrument(skip_all)]
    pub async fn build(self, shutdown_rx: watch::Receiver<bool>) -> Result<App> {
        let config = self.config;

        let (metrics_addr, metrics_task) =
            match MetricsBuilder::new(config.metrics.clone()).build(shutdown_rx.clone()).await? {
                Some((server, addr)) => {
                    info!("Metrics available at http://{}/metrics", addr);
                    (Some(addr), Some(tokio::spawn(server.run())))
                }
                None => (None, None),
            };

        let handlers = self
            .handlers_override
            .unwrap_or_else(|| HandlerTable::from_routes(&config.categories));
        let sink = self
            .sink_override
            .unwrap_or_else(|| Arc::new(TracingSink) as Arc<dyn AlertSink>);

        let bind_address = config.server.bind_address();
        let listener = TcpListener::bind(&bind_address)
            .await
            .with_context(|| format!("failed to bind webhook receiver to {}", bind_address))?;
        let local_addr = listener.local_addr()?;

        info!("Starting webhook receiver on port {}...", local_addr.port());
        info!("Available endpoints:");
        for endpoint in ENDPOINTS {
            info!("  {}", endpoint);
        }
        for category in handlers.categories() {
            if !is_advertised(category) {
                info!("  POST /webhook/{} - Configured category", category);
            }
        }

        Ok(App {
            listener,
            state: IngressState {
                handlers: Arc::new(handlers),
                sink,
                max_body_bytes: config.server.max_body_bytes,
            },
            local_addr,
            metrics_addr,
            metrics_task,
            shutdown_rx,
        })
    }
}

fn is_advertised(category: &str) -> bool {
    let path = format!("/webhook/{} ", category);
    ENDPOINTS.iter().any(|e| e.contains(&path))
}
