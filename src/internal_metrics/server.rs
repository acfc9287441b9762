//! The `/metrics` listener.
//!
//! Runs on its own address so the intake port keeps answering 404 for every
//! GET other than `/health`.

use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::future::Future;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, trace};

/// Serves the Prometheus exposition format until shutdown.
pub struct MetricsServer {
    listener: TcpListener,
    prom_handle: PrometheusHandle,
    shutdown_rx: watch::Receiver<bool>,
}

impl MetricsServer {
    /// Creates a new `MetricsServer` on an already bound listener.
    pub fn new(
        listener: TcpListener,
        prom_handle: PrometheusHandle,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            listener,
            prom_handle,
            shutdown_rx,
        }
    }

    /// Returns a future that serves `/metrics` until the shutdown signal fires.
    pub fn run(mut self) -> impl Future<Output = ()> {
        let handle = self.prom_handle.clone();
        let app = Router::new().route("/metrics", get(move || async move { handle.render() }));

        async move {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => {
                    trace!("Metrics server received shutdown signal.");
                }
                result = axum::serve(self.listener, app.into_make_service()) => {
                    if let Err(e) = result {
                        error!("Metrics server error: {}", e);
                    }
                }
            }
            trace!("Metrics server task finished.");
        }
    }
}
