//! Raw string to typed value conversions shared by the resolver and the
//! standalone functions.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;
use url::Url;

pub(crate) fn bool_value(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "t" => Some(true),
        "false" | "0" | "no" | "n" | "f" => Some(false),
        _ => None,
    }
}

pub(crate) fn from_str_value<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

/// Split on `,`, trim, drop empty pieces. `None` when nothing survives.
pub(crate) fn string_slice(raw: &str) -> Option<Vec<String>> {
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

/// Like [`string_slice`], dropping pieces that are not integers.
pub(crate) fn int_slice(raw: &str) -> Option<Vec<i32>> {
    let items: Vec<i32> = raw
        .split(',')
        .map(str::trim)
        .filter_map(|s| s.parse().ok())
        .collect();
    (!items.is_empty()).then_some(items)
}

pub(crate) fn url_value(raw: &str) -> Option<Url> {
    Url::parse(raw).ok()
}

/// Expand a leading `~`, make the path absolute and require it to exist.
pub(crate) fn file_path(raw: &str, home: Option<&str>) -> Option<PathBuf> {
    let expanded = match raw.strip_prefix('~') {
        Some("") => PathBuf::from(home?),
        Some(rest) if rest.starts_with('/') || rest.starts_with(std::path::MAIN_SEPARATOR) => {
            Path::new(home?).join(&rest[1..])
        }
        // `~user` is not expanded
        _ => PathBuf::from(raw),
    };

    let absolute = std::path::absolute(expanded).ok()?;
    absolute.exists().then_some(absolute)
}

/// Return `parsed`, or warn (unless silent) and fall back to `default`.
pub(crate) fn or_default<T>(
    key: &str,
    raw: &str,
    parsed: Option<T>,
    default: T,
    kind: &'static str,
    silent: bool,
) -> T {
    match parsed {
        Some(value) => value,
        None => {
            if !silent {
                warn!(key, value = raw, kind, "invalid environment value, using default");
            }
            default
        }
    }
}
