//! Redis client configuration for envkit
//!
//! Resolves a [`RedisConfig`] from `REDIS_*` environment variables (or a TOML
//! file). [`RedisDatabases`] partitions one configuration across logical
//! databases addressed by index or by name.

mod config;
mod databases;

pub use config::RedisConfig;
pub use databases::RedisDatabases;
