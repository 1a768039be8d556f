//! Multiple logical databases sharing one Redis server.

use crate::RedisConfig;
use envkit_core::{EnvError, EnvResult, Resolver};
use std::collections::BTreeMap;

/// One base configuration partitioned by logical database.
///
/// Databases are addressed by index, or by a name declared in
/// `DATABASES=cache:0,sessions:1,queues:2`.
#[derive(Debug, Clone)]
pub struct RedisDatabases {
    base: RedisConfig,
    named: BTreeMap<String, u32>,
}

impl RedisDatabases {
    pub fn new(base: RedisConfig) -> Self {
        Self {
            base,
            named: BTreeMap::new(),
        }
    }

    /// Load the base configuration and the `DATABASES` name table
    pub fn load_from(env: &Resolver) -> EnvResult<Self> {
        let mut databases = Self::new(RedisConfig::load_from(env)?);

        for entry in env.get_string_slice("DATABASES", &[]) {
            let (name, index) = entry
                .split_once(':')
                .map(|(n, i)| (n.trim(), i.trim()))
                .ok_or_else(|| {
                    EnvError::invalid(env.key("DATABASES"), entry.as_str(), "expected name:index")
                })?;
            let index: u32 = index.parse().map_err(|_| {
                EnvError::invalid(env.key("DATABASES"), entry.as_str(), "index is not a number")
            })?;
            databases.insert(name, index)?;
        }

        Ok(databases)
    }

    /// Register `name` for database `index`
    pub fn insert(&mut self, name: impl Into<String>, index: u32) -> EnvResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(EnvError::config("Redis database name cannot be empty"));
        }
        if self.named.contains_key(&name) {
            return Err(EnvError::config(format!(
                "Redis database name {name} declared twice"
            )));
        }
        self.named.insert(name, index);
        Ok(())
    }

    pub fn base(&self) -> &RedisConfig {
        &self.base
    }

    /// Configuration for database `index`
    pub fn for_index(&self, index: u32) -> RedisConfig {
        self.base.with_db(index)
    }

    /// Configuration for the database registered as `name`
    pub fn for_name(&self, name: &str) -> Option<RedisConfig> {
        self.named.get(name).map(|&index| self.for_index(index))
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.named.get(name).copied()
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envkit_core::MemoryEnv;
    use std::sync::Arc;

    fn env(vars: &[(&str, &str)]) -> Resolver {
        Resolver::builder()
            .prefix("REDIS_")
            .silent(true)
            .store(Arc::new(MemoryEnv::with_vars(vars.iter().copied())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_named_databases() {
        let dbs = RedisDatabases::load_from(&env(&[
            ("REDIS_HOST", "redis.svc"),
            ("REDIS_DATABASES", "sessions:1, cache:0,queues : 5"),
        ]))
        .unwrap();

        assert_eq!(dbs.names().collect::<Vec<_>>(), vec!["cache", "queues", "sessions"]);
        assert_eq!(dbs.index_of("queues"), Some(5));
        assert_eq!(
            dbs.for_name("sessions").unwrap().connection_url().unwrap(),
            "redis://redis.svc:6379/1"
        );
        assert!(dbs.for_name("missing").is_none());
        assert_eq!(dbs.for_index(9).db, 9);
        assert_eq!(dbs.base().db, 0);
    }

    #[test]
    fn test_malformed_entries() {
        assert!(RedisDatabases::load_from(&env(&[("REDIS_DATABASES", "cache")])).is_err());
        assert!(RedisDatabases::load_from(&env(&[("REDIS_DATABASES", "cache:x")])).is_err());
        assert!(RedisDatabases::load_from(&env(&[("REDIS_DATABASES", "a:1,a:2")])).is_err());
    }
}
