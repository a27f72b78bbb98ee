//! Write targets and expiration policies

use crate::keys::CacheKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Structural type of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheValueType {
    String,
    List,
    Hash,
    Set,
    SortedSet,
}

impl CacheValueType {
    /// Parse the type names reported by backends (`TYPE` command)
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(CacheValueType::String),
            "list" => Some(CacheValueType::List),
            "hash" => Some(CacheValueType::Hash),
            "set" => Some(CacheValueType::Set),
            "zset" | "sortedset" | "sorted_set" => Some(CacheValueType::SortedSet),
            _ => None,
        }
    }
}

impl fmt::Display for CacheValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheValueType::String => "string",
            CacheValueType::List => "list",
            CacheValueType::Hash => "hash",
            CacheValueType::Set => "set",
            CacheValueType::SortedSet => "zset",
        };
        f.write_str(name)
    }
}

/// Expiration policy: an absolute instant, or a relative span that may slide
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheExpiration {
    pub absolute: Option<DateTime<Utc>>,
    pub relative: Option<Duration>,
    /// Restart the relative span on every access
    pub sliding: bool,
}

impl CacheExpiration {
    pub fn absolute(at: DateTime<Utc>) -> Self {
        Self {
            absolute: Some(at),
            relative: None,
            sliding: false,
        }
    }

    pub fn relative(span: Duration) -> Self {
        Self {
            absolute: None,
            relative: Some(span),
            sliding: false,
        }
    }

    pub fn sliding(span: Duration) -> Self {
        Self {
            absolute: None,
            relative: Some(span),
            sliding: true,
        }
    }

    /// Instant the value expires when written at `now`.
    /// An absolute instant takes precedence over a relative span.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if let Some(at) = self.absolute {
            return Some(at);
        }
        let span = chrono::Duration::from_std(self.relative?).ok()?;
        now.checked_add_signed(span)
    }

    /// Remaining lifetime in milliseconds measured from `now`, at least 1
    pub fn ttl_millis(&self, now: DateTime<Utc>) -> Option<i64> {
        let at = self.expires_at(now)?;
        Some((at - now).num_milliseconds().max(1))
    }

    /// Span to re-apply on each access, for sliding policies
    pub fn sliding_window(&self) -> Option<Duration> {
        if self.sliding && self.absolute.is_none() {
            self.relative
        } else {
            None
        }
    }
}

/// Gate evaluated by the provider before a write proceeds
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SetCondition {
    #[default]
    Always,
    IfExists,
    IfNotExists,
    /// Write only when the current value equals the given one
    Equal(String),
    /// Write only when the current value differs from the given one
    NotEqual(String),
}

/// A single write target
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value_type: CacheValueType,
    pub value: String,
    pub expiration: Option<CacheExpiration>,
    pub when: SetCondition,
}

impl CacheEntry {
    /// String entry written unconditionally without expiration
    pub fn new(key: CacheKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value_type: CacheValueType::String,
            value: value.into(),
            expiration: None,
            when: SetCondition::Always,
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_condition(mut self, when: SetCondition) -> Self {
        self.when = when;
        self
    }

    pub fn with_value_type(mut self, value_type: CacheValueType) -> Self {
        self.value_type = value_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_absolute_wins_over_relative() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap();
        let expiration = CacheExpiration {
            absolute: Some(at),
            relative: Some(Duration::from_secs(100)),
            sliding: true,
        };
        assert_eq!(expiration.expires_at(now), Some(at));
        assert_eq!(expiration.ttl_millis(now), Some(10_000));
        assert_eq!(expiration.sliding_window(), None);
    }

    #[test]
    fn test_relative_and_sliding() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let expiration = CacheExpiration::sliding(Duration::from_secs(30));
        assert_eq!(expiration.ttl_millis(now), Some(30_000));
        assert_eq!(expiration.sliding_window(), Some(Duration::from_secs(30)));
        assert_eq!(CacheExpiration::default().expires_at(now), None);
    }

    #[test]
    fn test_past_absolute_still_yields_positive_ttl() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(CacheExpiration::absolute(past).ttl_millis(now), Some(1));
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(CacheValueType::from_type_name("zset"), Some(CacheValueType::SortedSet));
        assert_eq!(CacheValueType::from_type_name("none"), None);
        assert_eq!(CacheValueType::List.to_string(), "list");
    }
}
