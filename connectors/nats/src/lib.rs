//! NATS client configuration for envkit
//!
//! Resolves a [`NatsConfig`] from `NATS_*` environment variables (or a TOML
//! file) and renders the server list and auth mode for the client.

mod config;

pub use config::{NatsAuth, NatsConfig};
