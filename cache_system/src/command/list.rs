//! List commands

use super::{CacheStatus, CommandOptions};
use crate::entry::CacheExpiration;
use crate::keys::CacheKey;

/// Insert `value` before the first occurrence of `pivot`
#[derive(Debug, Clone, Default)]
pub struct ListInsertBeforeParams {
    pub key: CacheKey,
    pub pivot: String,
    pub value: String,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl ListInsertBeforeParams {
    pub fn new(key: CacheKey, pivot: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key,
            pivot: pivot.into(),
            value: value.into(),
            expiration: None,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListInsertBeforeResponse {
    pub status: CacheStatus,
    /// List length after insertion, `-1` when the pivot is missing
    pub new_length: i64,
}

/// Insert `value` after the first occurrence of `pivot`
#[derive(Debug, Clone, Default)]
pub struct ListInsertAfterParams {
    pub key: CacheKey,
    pub pivot: String,
    pub value: String,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl ListInsertAfterParams {
    pub fn new(key: CacheKey, pivot: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key,
            pivot: pivot.into(),
            value: value.into(),
            expiration: None,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListInsertAfterResponse {
    pub status: CacheStatus,
    pub new_length: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ListGetByIndexParams {
    pub key: CacheKey,
    pub index: i64,
    pub options: CommandOptions,
}

impl ListGetByIndexParams {
    pub fn new(key: CacheKey, index: i64) -> Self {
        Self {
            key,
            index,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListGetByIndexResponse {
    pub status: CacheStatus,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListLeftPopParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl ListLeftPopParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListLeftPopResponse {
    pub status: CacheStatus,
    pub value: Option<String>,
}

/// Prepend values; the last value ends up at the head
#[derive(Debug, Clone, Default)]
pub struct ListLeftPushParams {
    pub key: CacheKey,
    pub values: Vec<String>,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl ListLeftPushParams {
    pub fn new(key: CacheKey, values: Vec<String>) -> Self {
        Self {
            key,
            values,
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
pub struct ListLeftPushResponse {
    pub status: CacheStatus,
    pub new_length: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ListLengthParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl ListLengthParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListLengthResponse {
    pub status: CacheStatus,
    pub length: i64,
}

/// Elements in the inclusive index range `[start, end]`
#[derive(Debug, Clone, Default)]
pub struct ListRangeParams {
    pub key: CacheKey,
    pub start: i64,
    pub end: i64,
    pub options: CommandOptions,
}

impl ListRangeParams {
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
pub struct ListRangeResponse {
    pub status: CacheStatus,
    pub values: Vec<String>,
}

/// Remove occurrences of `value`: `count > 0` from the head, `count < 0`
/// from the tail, `0` removes all
#[derive(Debug, Clone, Default)]
pub struct ListRemoveParams {
    pub key: CacheKey,
    pub value: String,
    pub count: i64,
    pub options: CommandOptions,
}

impl ListRemoveParams {
    pub fn new(key: CacheKey, value: impl Into<String>, count: i64) -> Self {
        Self {
            key,
            value: value.into(),
            count,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListRemoveResponse {
    pub status: CacheStatus,
    pub removed: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ListRightPopParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl ListRightPopParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListRightPopResponse {
    pub status: CacheStatus,
    pub value: Option<String>,
}

/// Pop from the tail of `source_key` and push onto the head of `destination_key`
#[derive(Debug, Clone, Default)]
pub struct ListRightPopLeftPushParams {
    pub source_key: CacheKey,
    pub destination_key: CacheKey,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl ListRightPopLeftPushParams {
    pub fn new(source_key: CacheKey, destination_key: CacheKey) -> Self {
        Self {
            source_key,
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
pub struct ListRightPopLeftPushResponse {
    pub status: CacheStatus,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListRightPushParams {
    pub key: CacheKey,
    pub values: Vec<String>,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl ListRightPushParams {
    pub fn new(key: CacheKey, values: Vec<String>) -> Self {
        Self {
            key,
            values,
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
pub struct ListRightPushResponse {
    pub status: CacheStatus,
    pub new_length: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ListSetByIndexParams {
    pub key: CacheKey,
    pub index: i64,
    pub value: String,
    pub options: CommandOptions,
}

impl ListSetByIndexParams {
    pub fn new(key: CacheKey, index: i64, value: impl Into<String>) -> Self {
        Self {
            key,
            index,
            value: value.into(),
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListSetByIndexResponse {
    pub status: CacheStatus,
}

/// Keep only the inclusive index range `[start, end]`
#[derive(Debug, Clone, Default)]
pub struct ListTrimParams {
    pub key: CacheKey,
    pub start: i64,
    pub end: i64,
    pub options: CommandOptions,
}

impl ListTrimParams {
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
pub struct ListTrimResponse {
    pub status: CacheStatus,
}

impl_response!(
    ListInsertBeforeResponse,
    ListInsertAfterResponse,
    ListGetByIndexResponse,
    ListLeftPopResponse,
    ListLeftPushResponse,
    ListLengthResponse,
    ListRangeResponse,
    ListRemoveResponse,
    ListRightPopResponse,
    ListRightPopLeftPushResponse,
    ListRightPushResponse,
    ListSetByIndexResponse,
    ListTrimResponse,
);
