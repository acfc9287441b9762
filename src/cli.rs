//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using
//! the `clap` crate. The parsed [`Cli`] is also a `figment` provider, so the
//! flags become the highest-priority configuration layer.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Receives Alertmanager webhooks and routes them by category.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Interface to bind the intake server to.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port for the intake server.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Log level filter (e.g. "info", "debug").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Largest accepted request body in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_body_bytes: Option<usize>,

    /// Enable the Prometheus metrics listener.
    #[arg(long)]
    pub metrics: bool,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        let mut server = Dict::new();

        if let Some(host) = &self.host {
            server.insert("host".into(), Value::from(host.clone()));
        }
        if let Some(port) = self.port {
            server.insert("port".into(), Value::from(port));
        }
        if let Some(limit) = self.max_body_bytes {
            server.insert("max_body_bytes".into(), Value::from(limit));
        }
        if !server.is_empty() {
            dict.insert("server".into(), Value::from(server));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        // Only an explicit flag turns metrics on; absence leaves lower layers alone.
        if self.metrics {
            let mut metrics = Dict::new();
            metrics.insert("enabled".into(), Value::from(true));
            dict.insert("metrics".into(), Value::from(metrics));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
