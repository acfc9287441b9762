//! Configuration management for the webhook receiver
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to layer built-in defaults, an optional TOML file,
//! `WEBHOOK_RECEIVER_` environment variables and command-line flags.

use crate::cli::Cli;
use crate::notification::MarkerLevel;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Configuration for the intake HTTP server.
    pub server: ServerConfig,
    /// Configuration for the Prometheus exporter.
    pub metrics: MetricsConfig,
    /// Additional category routes.
    #[serde(default)]
    pub categories: Vec<CategoryRoute>,
}

/// Configuration for the intake HTTP server.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind. `0` picks a free port.
    pub port: u16,
    /// Largest accepted `Content-Length` for an intake request.
    pub max_body_bytes: usize,
}

/// Configuration for the Prometheus exporter.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Address of the separate `/metrics` listener.
    pub listen_address: SocketAddr,
}

/// A marker route registered from configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CategoryRoute {
    /// Category name as it appears in the final URL segment.
    pub name: String,
    /// The line logged for every alert in this category.
    pub message: String,
    #[serde(default)]
    pub level: MarkerLevel,
}

impl ServerConfig {
    /// The `host:port` string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Loads the configuration, with CLI flags taking precedence over the
    /// environment, the environment over the file, and the file over the
    /// defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // e.g. WEBHOOK_RECEIVER_SERVER__PORT=8080
            .merge(Env::prefixed("WEBHOOK_RECEIVER_").split("__"))
            .merge(cli)
            .extract()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
                max_body_bytes: 1024 * 1024,
            },
            metrics: MetricsConfig {
                enabled: false,
                listen_address: SocketAddr::from(([127, 0, 0, 1], 9101)),
            },
            categories: Vec::new(),
        }
    }
}
