//! Configuration for Kafka clients

use envkit_core::config_file::read_toml;
use envkit_core::{EnvError, EnvResult, Resolver};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Broker security protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityProtocol {
    #[default]
    Plaintext,
    Ssl,
    SaslPlaintext,
    SaslSsl,
}

impl SecurityProtocol {
    pub fn uses_sasl(self) -> bool {
        matches!(self, SecurityProtocol::SaslPlaintext | SecurityProtocol::SaslSsl)
    }
}

impl fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SecurityProtocol::Plaintext => "PLAINTEXT",
            SecurityProtocol::Ssl => "SSL",
            SecurityProtocol::SaslPlaintext => "SASL_PLAINTEXT",
            SecurityProtocol::SaslSsl => "SASL_SSL",
        })
    }
}

impl FromStr for SecurityProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "PLAINTEXT" => Ok(SecurityProtocol::Plaintext),
            "SSL" => Ok(SecurityProtocol::Ssl),
            "SASL_PLAINTEXT" => Ok(SecurityProtocol::SaslPlaintext),
            "SASL_SSL" => Ok(SecurityProtocol::SaslSsl),
            other => Err(format!("unknown security protocol {other}")),
        }
    }
}

/// Where a consumer group without a committed offset starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetReset {
    Earliest,
    #[default]
    Latest,
}

impl fmt::Display for OffsetReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        })
    }
}

impl FromStr for OffsetReset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "earliest" | "oldest" => Ok(OffsetReset::Earliest),
            "latest" | "newest" => Ok(OffsetReset::Latest),
            other => Err(format!("unknown offset reset {other}")),
        }
    }
}

/// Kafka client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Bootstrap brokers (`host:port`)
    pub brokers: Vec<String>,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Consumer group, required for consumers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default)]
    pub security_protocol: SecurityProtocol,

    /// SASL mechanism (PLAIN, SCRAM-SHA-256, SCRAM-SHA-512)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sasl_mechanism: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sasl_username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sasl_password: Option<String>,

    /// Consumer session timeout in milliseconds
    #[serde(default = "default_session_timeout")]
    pub session_timeout_ms: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub auto_offset_reset: OffsetReset,

    #[serde(default = "default_true")]
    pub enable_auto_commit: bool,
}

fn default_client_id() -> String {
    "envkit".to_string()
}

fn default_session_timeout() -> u64 {
    45_000
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

const SASL_MECHANISMS: [&str; 3] = ["PLAIN", "SCRAM-SHA-256", "SCRAM-SHA-512"];

impl KafkaConfig {
    /// Load configuration with the `KAFKA_` prefix
    pub fn load() -> EnvResult<Self> {
        let env = Resolver::builder().prefix("KAFKA_").build()?;
        Self::load_from(&env)
    }

    /// Load configuration from `env`, honouring its `CONFIG_FILE` key
    pub fn load_from(env: &Resolver) -> EnvResult<Self> {
        let config = match env.lookup("CONFIG_FILE") {
            Some(path) => {
                debug!(path = %path, "loading Kafka config file");
                let mut config = Self::from_file(&path)?;
                config.apply_env_overrides(env)?;
                config
            }
            None => Self::from_resolver(env)?,
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
    /// - `BROKERS`: Required, comma-separated bootstrap brokers
    /// - `CLIENT_ID`: Client id (default: envkit)
    /// - `GROUP_ID`: Consumer group
    /// - `SECURITY_PROTOCOL`: PLAINTEXT, SSL, SASL_PLAINTEXT, SASL_SSL
    /// - `SASL_MECHANISM` / `SASL_USERNAME` / `SASL_PASSWORD`
    /// - `SESSION_TIMEOUT_MS`: Session timeout (default: 45s)
    /// - `REQUEST_TIMEOUT_MS`: Request timeout (default: 30s)
    /// - `AUTO_OFFSET_RESET`: earliest or latest (default: latest)
    /// - `ENABLE_AUTO_COMMIT`: Commit offsets automatically (default: true)
    pub fn from_resolver(env: &Resolver) -> EnvResult<Self> {
        let brokers = env.get_string_slice("BROKERS", &[]);
        if brokers.is_empty() {
            return Err(EnvError::NotFound(env.key("BROKERS")));
        }

        let mut config = Self {
            brokers,
            client_id: default_client_id(),
            group_id: None,
            security_protocol: SecurityProtocol::default(),
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
            session_timeout_ms: default_session_timeout(),
            request_timeout_ms: default_request_timeout(),
            auto_offset_reset: OffsetReset::default(),
            enable_auto_commit: true,
        };
        config.apply_env_overrides(env)?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Enum-valued keys fail on unknown values instead of falling back.
    pub fn apply_env_overrides(&mut self, env: &Resolver) -> EnvResult<()> {
        if env.lookup("BROKERS").is_some() {
            let current: Vec<&str> = self.brokers.iter().map(String::as_str).collect();
            self.brokers = env.get_string_slice("BROKERS", &current);
        }
        if let Some(val) = env.lookup("CLIENT_ID") {
            self.client_id = val;
        }
        if let Some(val) = env.lookup("GROUP_ID") {
            self.group_id = Some(val);
        }
        if env.lookup("SECURITY_PROTOCOL").is_some() {
            self.security_protocol = env.require("SECURITY_PROTOCOL")?;
        }
        if let Some(val) = env.lookup("SASL_MECHANISM") {
            self.sasl_mechanism = Some(val.to_uppercase());
        }
        if let Some(val) = env.lookup("SASL_USERNAME") {
            self.sasl_username = Some(val);
        }
        if let Some(val) = env.lookup("SASL_PASSWORD") {
            self.sasl_password = Some(val);
        }
        self.session_timeout_ms = millis(env, "SESSION_TIMEOUT_MS", self.session_timeout_ms);
        self.request_timeout_ms = millis(env, "REQUEST_TIMEOUT_MS", self.request_timeout_ms);
        if env.lookup("AUTO_OFFSET_RESET").is_some() {
            self.auto_offset_reset = env.require("AUTO_OFFSET_RESET")?;
        }
        self.enable_auto_commit = env.get_bool("ENABLE_AUTO_COMMIT", self.enable_auto_commit);
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> EnvResult<()> {
        if self.brokers.is_empty() {
            return Err(EnvError::config("At least one Kafka broker is required"));
        }

        if self.client_id.is_empty() {
            return Err(EnvError::config("client_id cannot be empty"));
        }

        if self.security_protocol.uses_sasl() {
            let mechanism = self.sasl_mechanism.as_deref().ok_or_else(|| {
                EnvError::config(format!(
                    "sasl_mechanism is required with {}",
                    self.security_protocol
                ))
            })?;
            if !SASL_MECHANISMS.contains(&mechanism) {
                return Err(EnvError::config(format!(
                    "unsupported SASL mechanism {mechanism}"
                )));
            }
            if self.sasl_username.is_none() || self.sasl_password.is_none() {
                return Err(EnvError::config(
                    "sasl_username and sasl_password are required for SASL",
                ));
            }
        }

        if self.request_timeout_ms == 0 {
            return Err(EnvError::config("request_timeout_ms must be > 0"));
        }

        Ok(())
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Client properties in librdkafka naming
    pub fn client_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        let mut set = |key: &str, value: String| {
            props.insert(key.to_string(), value);
        };

        set("bootstrap.servers", self.brokers.join(","));
        set("client.id", self.client_id.clone());
        set("security.protocol", self.security_protocol.to_string());
        set("session.timeout.ms", self.session_timeout_ms.to_string());
        set("request.timeout.ms", self.request_timeout_ms.to_string());
        set("auto.offset.reset", self.auto_offset_reset.to_string());
        set("enable.auto.commit", self.enable_auto_commit.to_string());
        if let Some(group_id) = &self.group_id {
            set("group.id", group_id.clone());
        }
        if self.security_protocol.uses_sasl() {
            if let Some(mechanism) = &self.sasl_mechanism {
                set("sasl.mechanism", mechanism.clone());
            }
            if let Some(username) = &self.sasl_username {
                set("sasl.username", username.clone());
            }
            if let Some(password) = &self.sasl_password {
                set("sasl.password", password.clone());
            }
        }

        props
    }
}

fn millis(env: &Resolver, name: &str, current: u64) -> u64 {
    env.get_duration(name, Duration::from_millis(current))
        .as_millis()
        .min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use envkit_core::MemoryEnv;
    use std::sync::Arc;

    fn env(vars: &[(&str, &str)]) -> Resolver {
        Resolver::builder()
            .prefix("KAFKA_")
            .silent(true)
            .store(Arc::new(MemoryEnv::with_vars(vars.iter().copied())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_brokers_required() {
        let err = KafkaConfig::load_from(&env(&[("KAFKA_BROKERS", " , ")])).unwrap_err();
        assert!(matches!(err, EnvError::NotFound(ref key) if key == "KAFKA_BROKERS"));
    }

    #[test]
    fn test_client_properties() {
        let config = KafkaConfig::load_from(&env(&[
            ("KAFKA_BROKERS", "k1:9092, k2:9092"),
            ("KAFKA_GROUP_ID", "billing"),
            ("KAFKA_SECURITY_PROTOCOL", "sasl_ssl"),
            ("KAFKA_SASL_MECHANISM", "scram-sha-512"),
            ("KAFKA_SASL_USERNAME", "svc"),
            ("KAFKA_SASL_PASSWORD", "pw"),
            ("KAFKA_SESSION_TIMEOUT_MS", "10000"),
            ("KAFKA_AUTO_OFFSET_RESET", "oldest"),
        ]))
        .unwrap();

        let props = config.client_properties();
        assert_eq!(props["bootstrap.servers"], "k1:9092,k2:9092");
        assert_eq!(props["group.id"], "billing");
        assert_eq!(props["security.protocol"], "SASL_SSL");
        assert_eq!(props["sasl.mechanism"], "SCRAM-SHA-512");
        assert_eq!(props["session.timeout.ms"], "10000");
        assert_eq!(props["auto.offset.reset"], "earliest");
        assert_eq!(props["enable.auto.commit"], "true");
        assert_eq!(config.session_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_plaintext_omits_sasl() {
        let config = KafkaConfig::load_from(&env(&[
            ("KAFKA_BROKERS", "k1:9092"),
            ("KAFKA_SASL_USERNAME", "unused"),
        ]))
        .unwrap();

        let props = config.client_properties();
        assert_eq!(props["security.protocol"], "PLAINTEXT");
        assert!(!props.contains_key("sasl.username"));
        assert!(!props.contains_key("group.id"));
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            KafkaConfig::load_from(&env(&[
                ("KAFKA_BROKERS", "k1:9092"),
                ("KAFKA_SECURITY_PROTOCOL", "SASL_PLAINTEXT"),
            ])),
            Err(EnvError::Config(_))
        ));
        assert!(matches!(
            KafkaConfig::load_from(&env(&[
                ("KAFKA_BROKERS", "k1:9092"),
                ("KAFKA_SECURITY_PROTOCOL", "carrier-pigeon"),
            ])),
            Err(EnvError::Invalid { .. })
        ));
        assert!(matches!(
            KafkaConfig::load_from(&env(&[
                ("KAFKA_BROKERS", "k1:9092"),
                ("KAFKA_SECURITY_PROTOCOL", "SASL_SSL"),
                ("KAFKA_SASL_MECHANISM", "GSSAPI"),
                ("KAFKA_SASL_USERNAME", "u"),
                ("KAFKA_SASL_PASSWORD", "p"),
            ])),
            Err(EnvError::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kafka.toml");
        std::fs::write(
            &path,
            "brokers = [\"f1:9092\"]\nsecurity_protocol = \"SSL\"\nauto_offset_reset = \"earliest\"\n",
        )
        .unwrap();
        let path = path.to_str().unwrap().to_string();

        let config = KafkaConfig::load_from(&env(&[
            ("KAFKA_CONFIG_FILE", path.as_str()),
            ("KAFKA_CLIENT_ID", "from-env"),
        ]))
        .unwrap();

        assert_eq!(config.brokers, vec!["f1:9092"]);
        assert_eq!(config.security_protocol, SecurityProtocol::Ssl);
        assert_eq!(config.auto_offset_reset, OffsetReset::Earliest);
        assert_eq!(config.client_id, "from-env");
    }
}
