//! Standalone functions over the process environment.
//!
//! No prefix, no cache: every call reads the live environment. Use a
//! [`Resolver`](crate::Resolver) when either is needed.

use crate::parse;
use crate::store::{EnvStore, ProcessEnv};
use crate::{duration, EnvError, EnvResult};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

fn raw(key: &str) -> Option<String> {
    ProcessEnv.get(key).filter(|v| !v.is_empty())
}

fn typed<T>(key: &str, default: T, kind: &'static str, convert: impl FnOnce(&str) -> Option<T>) -> T {
    match raw(key) {
        Some(raw) => {
            let parsed = convert(&raw);
            parse::or_default(key, &raw, parsed, default, kind, false)
        }
        None => default,
    }
}

pub fn string(key: &str, default: &str) -> String {
    raw(key).unwrap_or_else(|| default.to_string())
}

pub fn bool(key: &str, default: bool) -> bool {
    typed(key, default, "bool", parse::bool_value)
}

pub fn int(key: &str, default: i32) -> i32 {
    typed(key, default, "int", parse::from_str_value)
}

pub fn int64(key: &str, default: i64) -> i64 {
    typed(key, default, "int64", parse::from_str_value)
}

pub fn float64(key: &str, default: f64) -> f64 {
    typed(key, default, "float64", parse::from_str_value)
}

pub fn duration(key: &str, default: Duration) -> Duration {
    typed(key, default, "duration", |raw| duration::resolve(key, raw))
}

pub fn string_slice(key: &str, default: &[&str]) -> Vec<String> {
    raw(key)
        .and_then(|raw| parse::string_slice(&raw))
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
}

pub fn int_slice(key: &str, default: &[i32]) -> Vec<i32> {
    raw(key)
        .and_then(|raw| parse::int_slice(&raw))
        .unwrap_or_else(|| default.to_vec())
}

pub fn url(key: &str, default: Option<Url>) -> Option<Url> {
    typed(key, default, "url", |raw| parse::url_value(raw).map(Some))
}

pub fn file_path(key: &str, default: impl Into<PathBuf>) -> PathBuf {
    let home = raw("HOME");
    typed(key, default.into(), "file path", |raw| {
        parse::file_path(raw, home.as_deref())
    })
}

pub fn json<T: DeserializeOwned>(key: &str) -> EnvResult<T> {
    let raw = raw(key).ok_or_else(|| EnvError::NotFound(key.to_string()))?;
    serde_json::from_str(&raw).map_err(|source| EnvError::Json {
        key: key.to_string(),
        source,
    })
}

pub fn require_string(key: &str) -> EnvResult<String> {
    raw(key).ok_or_else(|| EnvError::NotFound(key.to_string()))
}

/// Keys from `keys` that are absent from the process environment
pub fn missing<S: AsRef<str>>(keys: &[S]) -> Vec<String> {
    keys.iter()
        .map(|k| k.as_ref())
        .filter(|k| !ProcessEnv.contains(k))
        .map(str::to_string)
        .collect()
}
