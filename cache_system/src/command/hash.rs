//! Hash commands

use super::{CacheStatus, CommandOptions};
use crate::entry::CacheExpiration;
use crate::keys::CacheKey;
use crate::values::CacheNumber;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct HashDeleteParams {
    pub key: CacheKey,
    pub fields: Vec<String>,
    pub options: CommandOptions,
}

impl HashDeleteParams {
    pub fn new(key: CacheKey, fields: Vec<String>) -> Self {
        Self {
            key,
            fields,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashDeleteResponse {
    pub status: CacheStatus,
    pub deleted: i64,
}

#[derive(Debug, Clone, Default)]
pub struct HashExistParams {
    pub key: CacheKey,
    pub field: String,
    pub options: CommandOptions,
}

impl HashExistParams {
    pub fn new(key: CacheKey, field: impl Into<String>) -> Self {
        Self {
            key,
            field: field.into(),
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashExistResponse {
    pub status: CacheStatus,
    pub exists: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HashGetParams {
    pub key: CacheKey,
    pub field: String,
    pub options: CommandOptions,
}

impl HashGetParams {
    pub fn new(key: CacheKey, field: impl Into<String>) -> Self {
        Self {
            key,
            field: field.into(),
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashGetResponse {
    pub status: CacheStatus,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HashGetAllParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl HashGetAllParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashGetAllResponse {
    pub status: CacheStatus,
    pub values: HashMap<String, String>,
}

/// Add `value` to a numeric field; an absent field starts at zero
#[derive(Debug, Clone, Default)]
pub struct HashIncrementParams {
    pub key: CacheKey,
    pub field: String,
    pub value: CacheNumber,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl HashIncrementParams {
    pub fn new(key: CacheKey, field: impl Into<String>, value: impl Into<CacheNumber>) -> Self {
        Self {
            key,
            field: field.into(),
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
pub struct HashIncrementResponse {
    pub status: CacheStatus,
    pub new_value: CacheNumber,
}

#[derive(Debug, Clone, Default)]
pub struct HashDecrementParams {
    pub key: CacheKey,
    pub field: String,
    pub value: CacheNumber,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl HashDecrementParams {
    pub fn new(key: CacheKey, field: impl Into<String>, value: impl Into<CacheNumber>) -> Self {
        Self {
            key,
            field: field.into(),
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
pub struct HashDecrementResponse {
    pub status: CacheStatus,
    pub new_value: CacheNumber,
}

#[derive(Debug, Clone, Default)]
pub struct HashKeysParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl HashKeysParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashKeysResponse {
    pub status: CacheStatus,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HashLengthParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl HashLengthParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashLengthResponse {
    pub status: CacheStatus,
    pub length: i64,
}

#[derive(Debug, Clone, Default)]
pub struct HashSetParams {
    pub key: CacheKey,
    pub items: HashMap<String, String>,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl HashSetParams {
    pub fn new(key: CacheKey, items: HashMap<String, String>) -> Self {
        Self {
            key,
            items,
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn field(key: CacheKey, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, HashMap::from([(field.into(), value.into())]))
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashSetResponse {
    pub status: CacheStatus,
}

#[derive(Debug, Clone, Default)]
pub struct HashValuesParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl HashValuesParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashValuesResponse {
    pub status: CacheStatus,
    pub values: Vec<String>,
}

/// Cursor scan over fields matching a glob pattern
#[derive(Debug, Clone, Default)]
pub struct HashScanParams {
    pub key: CacheKey,
    pub pattern: Option<String>,
    pub cursor: u64,
    pub page_size: usize,
    pub options: CommandOptions,
}

impl HashScanParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            pattern: None,
            cursor: 0,
            page_size: 10,
            options: CommandOptions::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_cursor(mut self, cursor: u64) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct HashScanResponse {
    pub status: CacheStatus,
    /// Cursor for the next page, `0` when the scan is complete
    pub cursor: u64,
    pub values: HashMap<String, String>,
}

impl_response!(
    HashDeleteResponse,
    HashExistResponse,
    HashGetResponse,
    HashGetAllResponse,
    HashIncrementResponse,
    HashDecrementResponse,
    HashKeysResponse,
    HashLengthResponse,
    HashSetResponse,
    HashValuesResponse,
    HashScanResponse,
);
