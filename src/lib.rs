//! Webhook Receiver - an Alertmanager webhook relay
//!
//! Accepts alert notifications over HTTP, logs every alert, and routes each
//! one to a handler chosen by the final segment of the request path.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod intake;
pub mod internal_metrics;
pub mod notification;
pub mod server;
pub mod sink;

// Re-export core types for convenience
pub use crate::core::*;
pub use error::IngressError;
