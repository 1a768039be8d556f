//! `KEY=VALUE` env file loading.
//!
//! Format: one assignment per line, `#` comments and blank lines ignored,
//! split on the first `=`, key and value trimmed, one pair of matching
//! enclosing quotes stripped from the value. No interpolation, no escapes,
//! no multi-line values.

use crate::store::EnvStore;
use crate::{EnvError, EnvResult};
use std::path::Path;
use tracing::{debug, warn};

/// Parse env file content into ordered `(key, value)` pairs.
///
/// Lines without `=` (or with an empty key) are skipped, with a warning
/// unless `silent` is set.
pub fn parse(content: &str, silent: bool) -> Vec<(String, String)> {
    let mut entries = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            if !silent {
                warn!(line = idx + 1, "skipping env file line without '='");
            }
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            if !silent {
                warn!(line = idx + 1, "skipping env file line with empty key");
            }
            continue;
        }

        entries.push((key.to_string(), strip_quotes(value.trim()).to_string()));
    }

    entries
}

/// Apply parsed entries to `store` without overwriting existing keys.
///
/// Returns the number of keys that were set.
pub fn apply(store: &dyn EnvStore, entries: &[(String, String)]) -> usize {
    let mut applied = 0;
    for (key, value) in entries {
        if store.contains(key) {
            debug!(key = %key, "env file entry ignored, key already set");
            continue;
        }
        store.set(key, value);
        applied += 1;
    }
    applied
}

/// Read `path` and load it into `store`, live values winning over the file.
pub fn load_file(path: impl AsRef<Path>, store: &dyn EnvStore, silent: bool) -> EnvResult<usize> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| EnvError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = parse(&content, silent);
    let applied = apply(store, &entries);
    debug!(
        path = %path.display(),
        parsed = entries.len(),
        applied,
        "env file loaded"
    );
    Ok(applied)
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
