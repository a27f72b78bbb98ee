//! String commands

use super::{CacheStatus, CommandOptions};
use crate::entry::{CacheEntry, CacheExpiration};
use crate::keys::CacheKey;
use crate::values::{BitOperation, CacheNumber};

/// Write one or more string entries, each gated by its own condition
#[derive(Debug, Clone, Default)]
pub struct StringSetParams {
    pub entries: Vec<CacheEntry>,
    pub options: CommandOptions,
}

impl StringSetParams {
    pub fn new(entries: Vec<CacheEntry>) -> Self {
        Self {
            entries,
            options: CommandOptions::default(),
        }
    }

    pub fn single(key: CacheKey, value: impl Into<String>) -> Self {
        Self::new(vec![CacheEntry::new(key, value)])
    }

    pub fn add_entry(mut self, entry: CacheEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSetResult {
    pub key: String,
    pub stored: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StringSetResponse {
    pub status: CacheStatus,
    pub results: Vec<StringSetResult>,
}

/// Read one or more string values
#[derive(Debug, Clone, Default)]
pub struct StringGetParams {
    pub keys: Vec<CacheKey>,
    pub options: CommandOptions,
}

impl StringGetParams {
    pub fn new(key: CacheKey) -> Self {
        Self::many(vec![key])
    }

    pub fn many(keys: Vec<CacheKey>) -> Self {
        Self {
            keys,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringValue {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StringGetResponse {
    pub status: CacheStatus,
    pub values: Vec<StringValue>,
}

impl StringGetResponse {
    /// First value, or an empty string when nothing was found
    pub fn value(&self) -> &str {
        self.values
            .first()
            .and_then(|v| v.value.as_deref())
            .unwrap_or_default()
    }

    /// Value stored under the given key text
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.key == key)
            .and_then(|v| v.value.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringAppendParams {
    pub key: CacheKey,
    pub value: String,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl StringAppendParams {
    pub fn new(key: CacheKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringAppendResponse {
    pub status: CacheStatus,
    pub new_length: i64,
}

/// Count set bits inside the inclusive byte range `[start, end]`
#[derive(Debug, Clone, Default)]
pub struct StringBitCountParams {
    pub key: CacheKey,
    pub start: i64,
    pub end: i64,
    pub options: CommandOptions,
}

impl StringBitCountParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            start: 0,
            end: -1,
            options: CommandOptions::default(),
        }
    }

    pub fn with_range(mut self, start: i64, end: i64) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringBitCountResponse {
    pub status: CacheStatus,
    pub bit_count: i64,
}

/// Combine the bits of source keys into a destination key
#[derive(Debug, Clone)]
pub struct StringBitOperationParams {
    pub operation: BitOperation,
    pub keys: Vec<CacheKey>,
    pub destination_key: CacheKey,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl StringBitOperationParams {
    pub fn new(operation: BitOperation, keys: Vec<CacheKey>, destination_key: CacheKey) -> Self {
        Self {
            operation,
            keys,
            destination_key,
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringBitOperationResponse {
    pub status: CacheStatus,
    /// Length of the destination value in bytes
    pub length: i64,
}

/// Position of the first bit equal to `bit` inside the byte range
#[derive(Debug, Clone, Default)]
pub struct StringBitPositionParams {
    pub key: CacheKey,
    pub bit: bool,
    pub start: i64,
    pub end: i64,
    pub options: CommandOptions,
}

impl StringBitPositionParams {
    pub fn new(key: CacheKey, bit: bool) -> Self {
        Self {
            key,
            bit,
            start: 0,
            end: -1,
            options: CommandOptions::default(),
        }
    }

    pub fn with_range(mut self, start: i64, end: i64) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringBitPositionResponse {
    pub status: CacheStatus,
    /// Bit position, `-1` when no such bit exists
    pub position: i64,
}

#[derive(Debug, Clone, Default)]
pub struct StringDecrementParams {
    pub key: CacheKey,
    pub value: CacheNumber,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl StringDecrementParams {
    pub fn new(key: CacheKey, value: impl Into<CacheNumber>) -> Self {
        Self {
            key,
            value: value.into(),
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringDecrementResponse {
    pub status: CacheStatus,
    pub new_value: CacheNumber,
}

#[derive(Debug, Clone, Default)]
pub struct StringIncrementParams {
    pub key: CacheKey,
    pub value: CacheNumber,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl StringIncrementParams {
    pub fn new(key: CacheKey, value: impl Into<CacheNumber>) -> Self {
        Self {
            key,
            value: value.into(),
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringIncrementResponse {
    pub status: CacheStatus,
    pub new_value: CacheNumber,
}

#[derive(Debug, Clone, Default)]
pub struct StringGetBitParams {
    pub key: CacheKey,
    pub offset: i64,
    pub options: CommandOptions,
}

impl StringGetBitParams {
    pub fn new(key: CacheKey, offset: i64) -> Self {
        Self {
            key,
            offset,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringGetBitResponse {
    pub status: CacheStatus,
    pub bit: bool,
}

/// Substring over the inclusive byte range `[start, end]`
#[derive(Debug, Clone, Default)]
pub struct StringGetRangeParams {
    pub key: CacheKey,
    pub start: i64,
    pub end: i64,
    pub options: CommandOptions,
}

impl StringGetRangeParams {
    pub fn new(key: CacheKey, start: i64, end: i64) -> Self {
        Self {
            key,
            start,
            end,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringGetRangeResponse {
    pub status: CacheStatus,
    pub value: String,
}

/// Replace a value and return the previous one
#[derive(Debug, Clone, Default)]
pub struct StringGetSetParams {
    pub key: CacheKey,
    pub new_value: String,
    pub options: CommandOptions,
}

impl StringGetSetParams {
    pub fn new(key: CacheKey, new_value: impl Into<String>) -> Self {
        Self {
            key,
            new_value: new_value.into(),
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringGetSetResponse {
    pub status: CacheStatus,
    pub old_value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StringLengthParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl StringLengthParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringLengthResponse {
    pub status: CacheStatus,
    pub length: i64,
}

#[derive(Debug, Clone, Default)]
pub struct StringSetBitParams {
    pub key: CacheKey,
    pub offset: i64,
    pub bit: bool,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl StringSetBitParams {
    pub fn new(key: CacheKey, offset: i64, bit: bool) -> Self {
        Self {
            key,
            offset,
            bit,
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringSetBitResponse {
    pub status: CacheStatus,
    pub old_bit: bool,
}

/// Overwrite part of a value starting at `offset`, padding with zero bytes
#[derive(Debug, Clone, Default)]
pub struct StringSetRangeParams {
    pub key: CacheKey,
    pub offset: i64,
    pub value: String,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl StringSetRangeParams {
    pub fn new(key: CacheKey, offset: i64, value: impl Into<String>) -> Self {
        Self {
            key,
            offset,
            value: value.into(),
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringSetRangeResponse {
    pub status: CacheStatus,
    pub new_length: i64,
}

impl_response!(
    StringSetResponse,
    StringGetResponse,
    StringAppendResponse,
    StringBitCountResponse,
    StringBitOperationResponse,
    StringBitPositionResponse,
    StringDecrementResponse,
    StringIncrementResponse,
    StringGetBitResponse,
    StringGetRangeResponse,
    StringGetSetResponse,
    StringLengthResponse,
    StringSetBitResponse,
    StringSetRangeResponse,
);
