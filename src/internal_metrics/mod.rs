//! # Internal Metrics
//!
//! Installs a Prometheus recorder and prepares the [`MetricsServer`] when
//! metrics are enabled. Call sites use the `metrics` macros directly; with no
//! recorder installed those are no-ops.
//!
//! Recorded series:
//!
//! - `webhook_requests_total{outcome}`
//! - `alerts_received_total{category}`
//! - `handler_failures_total{category}`
//! - `webhook_request_duration_seconds`

pub mod server;

pub use server::MetricsServer;

use crate::config::MetricsConfig;
use anyhow::{Context, Result};
use metrics::Unit;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Registers descriptions for every series the receiver records.
pub fn describe() {
    metrics::describe_counter!(
        "webhook_requests_total",
        Unit::Count,
        "Total number of intake requests, labeled by outcome."
    );
    metrics::describe_counter!(
        "alerts_received_total",
        Unit::Count,
        "Total number of alerts dispatched to a category handler."
    );
    metrics::describe_counter!(
        "handler_failures_total",
        Unit::Count,
        "Total number of intake requests failed by a category handler."
    );
    metrics::describe_histogram!(
        "webhook_request_duration_seconds",
        Unit::Seconds,
        "Time spent handling an intake request."
    );
}

/// Builder for the metrics system.
pub struct MetricsBuilder {
    config: MetricsConfig,
}

impl MetricsBuilder {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Binds the metrics listener and installs the global recorder.
    ///
    /// Returns `None` when metrics are disabled.
    pub async fn build(
        self,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<Option<(MetricsServer, SocketAddr)>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0],
            )?
            .build_recorder();
        let handle = recorder.handle();

        // Bind first so a busy port fails startup before the recorder is installed.
        let listener = TcpListener::bind(self.config.listen_address)
            .await
            .with_context(|| {
                format!(
                    "failed to bind metrics listener to {}",
                    self.config.listen_address
                )
            })?;
        let addr = listener.local_addr()?;

        metrics::set_global_recorder(recorder)
            .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;
        describe();

        Ok(Some((MetricsServer::new(listener, handle, shutdown_rx), addr)))
    }
}
