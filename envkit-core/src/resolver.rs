//! Typed environment resolver.
//!
//! A [`Resolver`] reads `prefix + name` from its [`EnvStore`], caches non-empty
//! raw strings, and converts them on every call. Every typed getter takes a
//! default that is returned when the key is unset, empty or unparseable.

use crate::parse;
use crate::store::{EnvStore, ProcessEnv};
use crate::{duration, envfile, EnvError, EnvResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Resolver settings, fixed at construction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Prepended to every key, empty for none
    #[serde(default)]
    pub prefix: String,

    /// Suppress diagnostics for unparseable values
    #[serde(default)]
    pub silent: bool,

    /// Keys (without prefix) that must be present at construction
    #[serde(default)]
    pub required_keys: Vec<String>,

    /// `KEY=VALUE` file loaded into the store before validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,
}

/// Builder for [`Resolver`]
#[derive(Default)]
pub struct ResolverBuilder {
    config: ResolverConfig,
    store: Option<Arc<dyn EnvStore>>,
}

impl ResolverBuilder {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.config.silent = silent;
        self
    }

    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.env_file = Some(path.into());
        self
    }

    /// Add required keys; may be called more than once
    pub fn required<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .required_keys
            .extend(keys.into_iter().map(Into::into));
        self
    }

    /// Use `store` instead of the process environment
    pub fn store(mut self, store: Arc<dyn EnvStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> EnvResult<Resolver> {
        let store = self.store.unwrap_or_else(|| Arc::new(ProcessEnv::new()));
        Resolver::with_store(self.config, store)
    }
}

/// Resolves typed configuration values from an environment store
pub struct Resolver {
    config: Arc<ResolverConfig>,
    store: Arc<dyn EnvStore>,
    cache: Mutex<HashMap<String, String>>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("cached", &self.cache_len())
            .finish()
    }
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// Create a resolver over the process environment
    pub fn new(config: ResolverConfig) -> EnvResult<Self> {
        Self::with_store(config, Arc::new(ProcessEnv::new()))
    }

    /// Create a resolver over `store`.
    ///
    /// Loads `env_file` if configured (a read failure is logged and skipped),
    /// then fails with [`EnvError::MissingRequired`] naming every absent
    /// required key.
    pub fn with_store(config: ResolverConfig, store: Arc<dyn EnvStore>) -> EnvResult<Self> {
        if let Some(path) = &config.env_file {
            if let Err(e) = envfile::load_file(path, store.as_ref(), config.silent) {
                if !config.silent {
                    warn!(error = %e, "env file not loaded, continuing without it");
                }
            }
        }

        let resolver = Self {
            config: Arc::new(config),
            store,
            cache: Mutex::new(HashMap::new()),
        };

        if !resolver.config.required_keys.is_empty() {
            let missing = resolver.validate_required(&resolver.config.required_keys);
            if !missing.is_empty() {
                return Err(EnvError::MissingRequired { keys: missing });
            }
        }

        debug!(prefix = %resolver.config.prefix, "resolver ready");
        Ok(resolver)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    pub fn store(&self) -> &Arc<dyn EnvStore> {
        &self.store
    }

    /// Fully qualified key for `name`
    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.config.prefix, name)
    }

    /// A resolver sharing this store with `prefix` appended to the current one
    ///
    /// The child has its own cache. A key the parent has already cached keeps
    /// its old value in the parent after the child `set`s it, until the parent
    /// calls [`Resolver::clear_cache`].
    pub fn scoped(&self, prefix: &str) -> Resolver {
        let mut config = (*self.config).clone();
        config.prefix.push_str(prefix);
        config.required_keys.clear();
        config.env_file = None;
        Resolver {
            config: Arc::new(config),
            store: self.store.clone(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of cached entries
    pub fn cache_len(&self) -> usize {
        self.cache().len()
    }

    /// Raw non-empty value for `name`, consulting the cache first
    pub fn lookup(&self, name: &str) -> Option<String> {
        let key = self.key(name);
        if let Some(value) = self.cache().get(&key) {
            return Some(value.clone());
        }

        let value = self.store.get(&key).filter(|v| !v.is_empty())?;
        self.cache().insert(key, value.clone());
        Some(value)
    }

    fn typed<T>(
        &self,
        name: &str,
        default: T,
        kind: &'static str,
        convert: impl FnOnce(&str) -> Option<T>,
    ) -> T {
        match self.lookup(name) {
            Some(raw) => {
                let parsed = convert(&raw);
                parse::or_default(&self.key(name), &raw, parsed, default, kind, self.config.silent)
            }
            None => default,
        }
    }

    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.lookup(name).unwrap_or_else(|| default.to_string())
    }

    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        self.typed(name, default, "bool", parse::bool_value)
    }

    pub fn get_int(&self, name: &str, default: i32) -> i32 {
        self.typed(name, default, "int", parse::from_str_value)
    }

    pub fn get_int64(&self, name: &str, default: i64) -> i64 {
        self.typed(name, default, "int64", parse::from_str_value)
    }

    pub fn get_float64(&self, name: &str, default: f64) -> f64 {
        self.typed(name, default, "float64", parse::from_str_value)
    }

    /// Duration with unit inference for bare integers (see [`duration::resolve`])
    pub fn get_duration(&self, name: &str, default: Duration) -> Duration {
        self.typed(name, default, "duration", |raw| duration::resolve(name, raw))
    }

    /// Comma-separated list, trimmed, empty pieces dropped
    pub fn get_string_slice(&self, name: &str, default: &[&str]) -> Vec<String> {
        self.lookup(name)
            .and_then(|raw| parse::string_slice(&raw))
            .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
    }

    /// Comma-separated integers; pieces that fail to parse are dropped
    pub fn get_int_slice(&self, name: &str, default: &[i32]) -> Vec<i32> {
        self.lookup(name)
            .and_then(|raw| parse::int_slice(&raw))
            .unwrap_or_else(|| default.to_vec())
    }

    pub fn get_url(&self, name: &str, default: Option<Url>) -> Option<Url> {
        match self.lookup(name) {
            Some(raw) => {
                let parsed = parse::url_value(&raw).map(Some);
                parse::or_default(&self.key(name), &raw, parsed, default, "url", self.config.silent)
            }
            None => default,
        }
    }

    /// Existing filesystem path, `~` expanded against `HOME` from the store
    pub fn get_file_path(&self, name: &str, default: impl Into<PathBuf>) -> PathBuf {
        let home = self.store.get("HOME").filter(|h| !h.is_empty());
        self.typed(name, default.into(), "file path", |raw| {
            parse::file_path(raw, home.as_deref())
        })
    }

    /// Decode the value as JSON.
    ///
    /// Unlike the other getters there is no default: an unset or empty key is
    /// [`EnvError::NotFound`] and a decode failure is [`EnvError::Json`].
    pub fn get_json<T: DeserializeOwned>(&self, name: &str) -> EnvResult<T> {
        let key = self.key(name);
        let raw = self.lookup(name).ok_or_else(|| EnvError::NotFound(key.clone()))?;
        serde_json::from_str(&raw).map_err(|source| EnvError::Json { key, source })
    }

    /// Value of `name`, or [`EnvError::NotFound`] when unset or empty
    pub fn require_string(&self, name: &str) -> EnvResult<String> {
        self.lookup(name)
            .ok_or_else(|| EnvError::NotFound(self.key(name)))
    }

    /// Parse `name` as `T`, failing instead of falling back to a default
    pub fn require<T>(&self, name: &str) -> EnvResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.require_string(name)?;
        raw.parse()
            .map_err(|e: T::Err| EnvError::invalid(self.key(name), raw.clone(), e))
    }

    /// Prefixed keys from `names` that are absent from the store.
    ///
    /// A key set to the empty string counts as present.
    pub fn validate_required<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .map(|name| self.key(name.as_ref()))
            .filter(|key| !self.store.contains(key))
            .collect()
    }

    /// Set `name` in the store and the cache
    pub fn set(&self, name: &str, value: &str) {
        let key = self.key(name);
        self.store.set(&key, value);
        let mut cache = self.cache();
        if value.is_empty() {
            cache.remove(&key);
        } else {
            cache.insert(key, value.to_string());
        }
    }

    /// Remove `name` from the store and the cache
    pub fn unset(&self, name: &str) {
        let key = self.key(name);
        self.store.unset(&key);
        self.cache().remove(&key);
    }

    /// Drop every cached value; the store is untouched
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Snapshot of store entries under this resolver's prefix
    pub fn export(&self) -> BTreeMap<String, String> {
        let prefix = &self.config.prefix;
        self.store
            .snapshot()
            .into_iter()
            .filter(|(key, _)| key.starts_with(prefix.as_str()))
            .collect()
    }
}
