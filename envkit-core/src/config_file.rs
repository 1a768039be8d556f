//! TOML configuration files.

use crate::{EnvError, EnvResult};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Read and deserialize a TOML file
pub fn read_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> EnvResult<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| EnvError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value = toml::from_str(&content).map_err(|e| {
        EnvError::config(format!("failed to parse config file {}: {}", path.display(), e))
    })?;
    debug!(path = %path.display(), "config file loaded");
    Ok(value)
}
