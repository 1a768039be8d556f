//! Environment store abstraction.
//!
//! The resolver never touches `std::env` directly. It reads and writes through
//! an [`EnvStore`], so tests can run against [`MemoryEnv`] and every write to
//! the real process table goes through a single lock in [`ProcessEnv`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};

/// Key-value table the resolver reads from and writes to.
pub trait EnvStore: Send + Sync {
    /// Value of `key`, or `None` when the key is absent.
    ///
    /// A key explicitly set to the empty string returns `Some("")`.
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, replacing any existing value.
    fn set(&self, key: &str, value: &str);

    /// Remove `key`.
    fn unset(&self, key: &str);

    /// Point-in-time copy of every entry.
    fn snapshot(&self) -> BTreeMap<String, String>;

    /// Whether `key` is present, including when set to the empty string.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

static PROCESS_ENV_LOCK: Mutex<()> = Mutex::new(());

/// The process environment.
///
/// Reads and writes are serialised behind a process-wide lock. Code that
/// calls `std::env::set_var` directly bypasses it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        Self
    }
}

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = PROCESS_ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        let _guard = PROCESS_ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var(key, value);
    }

    fn unset(&self, key: &str) {
        let _guard = PROCESS_ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var(key);
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        let _guard = PROCESS_ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        // Entries that are not valid UTF-8 cannot be resolved anyway
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

/// In-memory environment, used as a test double and for isolated resolvers.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `vars`
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: RwLock::new(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.vars.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.vars
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn unset(&self, key: &str) {
        self.vars
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
