//! Webhook Receiver - Alertmanager notification relay
//!
//! Binds the intake server and serves until Ctrl-C.

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use webhook_receiver::{app::App, cli::Cli, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            tracing_subscriber::fmt().init();
            error!("Failed to load configuration: {:#}", err);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Listen Address: {}", config.server.bind_address());
    info!("Max Body Size: {} bytes", config.server.max_body_bytes);
    info!(
        "Metrics: {}",
        if config.metrics.enabled {
            config.metrics.listen_address.to_string()
        } else {
            "Disabled".to_string()
        }
    );
    info!("Configured Categories: {}", config.categories.len());
    info!("-------------------------------------------------------");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let app = App::builder(config).build(shutdown_rx).await?;
    let mut server = tokio::spawn(app.run());

    tokio::select! {
        biased;
        result = &mut server => {
            // The server only returns on its own when serving failed.
            match result {
                Ok(Ok(())) => warn!("Webhook receiver stopped without a shutdown signal."),
                Ok(Err(e)) => {
                    error!("Webhook receiver failed: {:#}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Webhook receiver task panicked: {:?}", e);
                    return Err(e.into());
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received.");
            // Receivers may already be gone if the server exited on its own.
            let _ = shutdown_tx.send(true);
            server.await??;
        }
    }

    Ok(())
}
