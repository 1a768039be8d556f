//! Duration parsing with unit inference from the key name.
//!
//! A value carrying a unit (`"30s"`, `"1h 30m"`, `"250ms"`) is parsed as a
//! [`humantime`] duration. A bare integer takes its unit from the key:
//! `TIMEOUT_MS=500` is 500 milliseconds, `TIMEOUT=500` is 500 seconds.

use std::time::Duration;

/// Unit assigned to a bare integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl InferredUnit {
    /// Infer the unit from a key name, case-insensitively.
    ///
    /// Checks run in a fixed order and the first match wins, so `ITEMS` is
    /// read as milliseconds. Callers depend on this order.
    pub fn from_key(key: &str) -> Self {
        let key = key.to_lowercase();
        let matches = |unit: &str| key.contains(&format!("_{unit}")) || key.ends_with(unit);

        if matches("ms") {
            InferredUnit::Milliseconds
        } else if matches("us") {
            InferredUnit::Microseconds
        } else if matches("ns") {
            InferredUnit::Nanoseconds
        } else if matches("min") {
            InferredUnit::Minutes
        } else if matches("hour") {
            InferredUnit::Hours
        } else {
            InferredUnit::Seconds
        }
    }

    /// Duration of `n` of this unit, `None` on overflow
    pub fn duration(self, n: u64) -> Option<Duration> {
        Some(match self {
            InferredUnit::Nanoseconds => Duration::from_nanos(n),
            InferredUnit::Microseconds => Duration::from_micros(n),
            InferredUnit::Milliseconds => Duration::from_millis(n),
            InferredUnit::Seconds => Duration::from_secs(n),
            InferredUnit::Minutes => Duration::from_secs(n.checked_mul(60)?),
            InferredUnit::Hours => Duration::from_secs(n.checked_mul(3600)?),
        })
    }
}

/// Resolve `raw` into a duration for `key`.
///
/// Returns `None` when the value is unparseable or negative.
pub fn resolve(key: &str, raw: &str) -> Option<Duration> {
    match raw.parse::<i64>() {
        Ok(n) if n < 0 => None,
        Ok(n) => InferredUnit::from_key(key).duration(n as u64),
        Err(_) => humantime::parse_duration(raw).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_inference_order() {
        assert_eq!(InferredUnit::from_key("TIMEOUT_MS"), InferredUnit::Milliseconds);
        assert_eq!(InferredUnit::from_key("timeoutms"), InferredUnit::Milliseconds);
        assert_eq!(InferredUnit::from_key("POLL_US"), InferredUnit::Microseconds);
        assert_eq!(InferredUnit::from_key("TICK_NS"), InferredUnit::Nanoseconds);
        assert_eq!(InferredUnit::from_key("TTL_MIN"), InferredUnit::Minutes);
        assert_eq!(InferredUnit::from_key("TTL_MINUTES"), InferredUnit::Minutes);
        assert_eq!(InferredUnit::from_key("RETENTION_HOURS"), InferredUnit::Hours);
        assert_eq!(InferredUnit::from_key("TIMEOUT"), InferredUnit::Seconds);
        // Heuristic, not a classifier
        assert_eq!(InferredUnit::from_key("MAX_ITEMS"), InferredUnit::Milliseconds);
        assert_eq!(InferredUnit::from_key("TIMEOUT_MS_MIN"), InferredUnit::Milliseconds);
    }

    #[test]
    fn test_bare_integer_uses_key_unit() {
        assert_eq!(resolve("TIMEOUT_MS", "250"), Some(Duration::from_millis(250)));
        assert_eq!(resolve("CACHE_TTL_MIN", "5"), Some(Duration::from_secs(300)));
        assert_eq!(resolve("SESSION_HOUR", "2"), Some(Duration::from_secs(7200)));
        assert_eq!(resolve("POLL_US", "10"), Some(Duration::from_micros(10)));
        assert_eq!(resolve("TIMEOUT", "30"), Some(Duration::from_secs(30)));
        assert_eq!(resolve("TIMEOUT", "0"), Some(Duration::ZERO));
    }

    #[test]
    fn test_explicit_unit_wins_over_key() {
        assert_eq!(resolve("TIMEOUT_MS", "30s"), Some(Duration::from_secs(30)));
        assert_eq!(resolve("TTL_MIN", "5m"), Some(Duration::from_secs(300)));
        assert_eq!(resolve("TIMEOUT", "300ms"), Some(Duration::from_millis(300)));
        assert_eq!(resolve("TIMEOUT", "2h"), Some(Duration::from_secs(7200)));
        assert_eq!(resolve("TIMEOUT", "1h 30m"), Some(Duration::from_secs(5400)));
        assert_eq!(resolve("TIMEOUT", "7ns"), Some(Duration::from_nanos(7)));
        assert_eq!(resolve("RETENTION", "2days"), Some(Duration::from_secs(172_800)));
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert_eq!(resolve("TIMEOUT", "-5"), None);
        assert_eq!(resolve("TIMEOUT", "-5s"), None);
        assert_eq!(resolve("TIMEOUT", "abc"), None);
        assert_eq!(resolve("TIMEOUT", "10x"), None);
        assert_eq!(resolve("TIMEOUT", "s"), None);
        assert_eq!(resolve("TIMEOUT", ""), None);
    }
}
