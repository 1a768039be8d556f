//! Kafka client configuration for envkit
//!
//! Resolves a [`KafkaConfig`] from `KAFKA_*` environment variables (or a TOML
//! file) and renders it as a client property map.

mod config;

pub use config::{KafkaConfig, OffsetReset, SecurityProtocol};
