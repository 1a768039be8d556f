//! Configuration for the NATS client

use envkit_core::config_file::read_toml;
use envkit_core::{EnvError, EnvResult, Resolver};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// NATS connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    /// Server addresses; scheme-less entries are treated as `nats://`
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    /// Connection name reported to the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Token authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// User/password authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Wait between reconnect attempts in milliseconds
    #[serde(default = "default_reconnect_wait")]
    pub reconnect_wait_ms: u64,

    /// Reconnect attempts before giving up, `None` for unlimited
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: Option<u32>,

    /// Ping interval in seconds
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,

    /// Request/reply timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

/// Authentication mode derived from the configured credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NatsAuth {
    None,
    Token(String),
    UserPassword { user: String, password: String },
}

fn default_servers() -> Vec<String> {
    vec!["nats://127.0.0.1:4222".to_string()]
}

fn default_connect_timeout() -> u64 {
    2_000
}

fn default_reconnect_wait() -> u64 {
    2_000
}

fn default_max_reconnects() -> Option<u32> {
    Some(60)
}

fn default_ping_interval() -> u64 {
    120
}

fn default_request_timeout() -> u64 {
    5_000
}

impl NatsConfig {
    /// Load configuration with the `NATS_` prefix
    pub fn load() -> EnvResult<Self> {
        let env = Resolver::builder().prefix("NATS_").build()?;
        Self::load_from(&env)
    }

    /// Load configuration from `env`, honouring its `CONFIG_FILE` key
    pub fn load_from(env: &Resolver) -> EnvResult<Self> {
        let config = match env.lookup("CONFIG_FILE") {
            Some(path) => {
                debug!(path = %path, "loading NATS config file");
                let mut config = Self::from_file(&path)?;
                config.apply_env_overrides(env);
                config
            }
            None => Self::from_resolver(env),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> EnvResult<Self> {
        read_toml(path)
    }

    /// Load configuration from environment variables
    ///
    /// Keys (after the resolver's prefix):
    /// - `SERVERS`: Comma-separated servers (default: nats://127.0.0.1:4222)
    /// - `NAME`: Connection name
    /// - `TOKEN`: Token authentication
    /// - `USER` / `PASSWORD`: User/password authentication
    /// - `CONNECT_TIMEOUT_MS`: Connect timeout (default: 2s)
    /// - `RECONNECT_WAIT_MS`: Delay between reconnects (default: 2s)
    /// - `MAX_RECONNECTS`: Reconnect attempts, negative for unlimited (default: 60)
    /// - `PING_INTERVAL`: Ping interval, seconds or with unit (default: 2m)
    /// - `REQUEST_TIMEOUT_MS`: Request timeout (default: 5s)
    ///
    /// Every key is optional, so this never fails.
    pub fn from_resolver(env: &Resolver) -> Self {
        let defaults = default_servers();
        let defaults: Vec<&str> = defaults.iter().map(String::as_str).collect();

        Self {
            servers: env.get_string_slice("SERVERS", &defaults),
            name: env.lookup("NAME"),
            token: env.lookup("TOKEN"),
            user: env.lookup("USER"),
            password: env.lookup("PASSWORD"),
            connect_timeout_ms: millis(env, "CONNECT_TIMEOUT_MS", default_connect_timeout()),
            reconnect_wait_ms: millis(env, "RECONNECT_WAIT_MS", default_reconnect_wait()),
            max_reconnects: max_reconnects(env.get_int64("MAX_RECONNECTS", 60)),
            ping_interval_secs: secs(env, "PING_INTERVAL", default_ping_interval()),
            request_timeout_ms: millis(env, "REQUEST_TIMEOUT_MS", default_request_timeout()),
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self, env: &Resolver) {
        if env.lookup("SERVERS").is_some() {
            let current: Vec<&str> = self.servers.iter().map(String::as_str).collect();
            self.servers = env.get_string_slice("SERVERS", &current);
        }
        if let Some(val) = env.lookup("NAME") {
            self.name = Some(val);
        }
        if let Some(val) = env.lookup("TOKEN") {
            self.token = Some(val);
        }
        if let Some(val) = env.lookup("USER") {
            self.user = Some(val);
        }
        if let Some(val) = env.lookup("PASSWORD") {
            self.password = Some(val);
        }
        if env.lookup("MAX_RECONNECTS").is_some() {
            self.max_reconnects = max_reconnects(env.get_int64("MAX_RECONNECTS", 60));
        }
        self.connect_timeout_ms = millis(env, "CONNECT_TIMEOUT_MS", self.connect_timeout_ms);
        self.reconnect_wait_ms = millis(env, "RECONNECT_WAIT_MS", self.reconnect_wait_ms);
        self.ping_interval_secs = secs(env, "PING_INTERVAL", self.ping_interval_secs);
        self.request_timeout_ms = millis(env, "REQUEST_TIMEOUT_MS", self.request_timeout_ms);
    }

    /// Validate the configuration
    pub fn validate(&self) -> EnvResult<()> {
        if self.servers.is_empty() {
            return Err(EnvError::config("At least one NATS server is required"));
        }

        if self.token.is_some() && self.user.is_some() {
            return Err(EnvError::config(
                "NATS token and user authentication are mutually exclusive",
            ));
        }

        if self.user.is_some() != self.password.is_some() {
            return Err(EnvError::config(
                "NATS user and password must be set together",
            ));
        }

        if self.connect_timeout_ms == 0 {
            return Err(EnvError::config("connect_timeout_ms must be > 0"));
        }

        Ok(())
    }

    /// Server URLs with a scheme on every entry
    pub fn server_urls(&self) -> Vec<String> {
        self.servers
            .iter()
            .map(|s| {
                if s.contains("://") {
                    s.clone()
                } else {
                    format!("nats://{s}")
                }
            })
            .collect()
    }

    pub fn auth(&self) -> NatsAuth {
        match (&self.token, &self.user, &self.password) {
            (Some(token), _, _) => NatsAuth::Token(token.clone()),
            (None, Some(user), Some(password)) => NatsAuth::UserPassword {
                user: user.clone(),
                password: password.clone(),
            },
            _ => NatsAuth::None,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_wait(&self) -> Duration {
        Duration::from_millis(self.reconnect_wait_ms)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn millis(env: &Resolver, name: &str, current: u64) -> u64 {
    env.get_duration(name, Duration::from_millis(current))
        .as_millis()
        .min(u64::MAX as u128) as u64
}

fn secs(env: &Resolver, name: &str, current: u64) -> u64 {
    env.get_duration(name, Duration::from_secs(current)).as_secs()
}

fn max_reconnects(n: i64) -> Option<u32> {
    if n < 0 {
        None
    } else {
        Some(u32::try_from(n).unwrap_or(u32::MAX))
    }
}
