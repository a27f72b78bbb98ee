//! Key commands
//!
//! These apply to a key regardless of the structural type stored under it.

use super::{CacheStatus, CommandOptions};
use crate::entry::{CacheExpiration, CacheValueType, SetCondition};
use crate::keys::CacheKey;
use crate::server::CacheServer;
use crate::values::SortOrder;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct KeyDeleteParams {
    pub keys: Vec<CacheKey>,
    pub options: CommandOptions,
}

impl KeyDeleteParams {
    pub fn new(keys: Vec<CacheKey>) -> Self {
        Self {
            keys,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyDeleteResponse {
    pub status: CacheStatus,
    pub deleted: i64,
}

/// Serialize the value stored at a key; the bytes are provider specific
#[derive(Debug, Clone, Default)]
pub struct KeyDumpParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl KeyDumpParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyDumpResponse {
    pub status: CacheStatus,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct KeyExistParams {
    pub keys: Vec<CacheKey>,
    pub options: CommandOptions,
}

impl KeyExistParams {
    pub fn new(keys: Vec<CacheKey>) -> Self {
        Self {
            keys,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyExistResponse {
    pub status: CacheStatus,
    /// Number of the given keys that exist
    pub count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct KeyExpireParams {
    pub key: CacheKey,
    pub expiration: CacheExpiration,
    pub options: CommandOptions,
}

impl KeyExpireParams {
    pub fn new(key: CacheKey, expiration: CacheExpiration) -> Self {
        Self {
            key,
            expiration,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyExpireResponse {
    pub status: CacheStatus,
}

/// Transfer a key to another server
#[derive(Debug, Clone)]
pub struct KeyMigrateParams {
    pub key: CacheKey,
    pub destination: CacheServer,
    pub timeout_ms: u64,
    /// Keep the key on the source server
    pub copy: bool,
    /// Overwrite an existing key on the destination
    pub replace: bool,
    pub options: CommandOptions,
}

impl KeyMigrateParams {
    pub fn new(key: CacheKey, destination: CacheServer) -> Self {
        Self {
            key,
            destination,
            timeout_ms: 5000,
            copy: false,
            replace: false,
            options: CommandOptions::default(),
        }
    }

    pub fn with_copy(mut self, copy: bool) -> Self {
        self.copy = copy;
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyMigrateResponse {
    pub status: CacheStatus,
}

/// Move a key to another database of the same server
#[derive(Debug, Clone, Default)]
pub struct KeyMoveParams {
    pub key: CacheKey,
    pub database: u32,
    pub options: CommandOptions,
}

impl KeyMoveParams {
    pub fn new(key: CacheKey, database: u32) -> Self {
        Self {
            key,
            database,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyMoveResponse {
    pub status: CacheStatus,
    pub moved: bool,
}

/// Remove the expiration of a key
#[derive(Debug, Clone, Default)]
pub struct KeyPersistParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl KeyPersistParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyPersistResponse {
    pub status: CacheStatus,
}

#[derive(Debug, Clone, Default)]
pub struct KeyRandomParams {
    pub options: CommandOptions,
}

impl KeyRandomParams {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyRandomResponse {
    pub status: CacheStatus,
    pub key: Option<String>,
}

/// Rename a key; `IfNotExists` refuses to overwrite an existing target
#[derive(Debug, Clone, Default)]
pub struct KeyRenameParams {
    pub key: CacheKey,
    pub new_key: CacheKey,
    pub when: SetCondition,
    pub options: CommandOptions,
}

impl KeyRenameParams {
    pub fn new(key: CacheKey, new_key: CacheKey) -> Self {
        Self {
            key,
            new_key,
            when: SetCondition::Always,
            options: CommandOptions::default(),
        }
    }

    pub fn with_condition(mut self, when: SetCondition) -> Self {
        self.when = when;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyRenameResponse {
    pub status: CacheStatus,
}

/// Recreate a key from bytes produced by a dump on the same provider type
#[derive(Debug, Clone, Default)]
pub struct KeyRestoreParams {
    pub key: CacheKey,
    pub value: Vec<u8>,
    pub expiration: Option<CacheExpiration>,
    pub replace: bool,
    pub options: CommandOptions,
}

impl KeyRestoreParams {
    pub fn new(key: CacheKey, value: Vec<u8>) -> Self {
        Self {
            key,
            value,
            expiration: None,
            replace: false,
            options: CommandOptions::default(),
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyRestoreResponse {
    pub status: CacheStatus,
}

/// Cursor scan over the keys of the target database
#[derive(Debug, Clone, Default)]
pub struct KeyScanParams {
    pub pattern: Option<String>,
    pub cursor: u64,
    pub page_size: usize,
    pub options: CommandOptions,
}

impl KeyScanParams {
    pub fn new() -> Self {
        Self {
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
pub struct KeyScanResponse {
    pub status: CacheStatus,
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// Sort the elements of a list, set or sorted set
#[derive(Debug, Clone, Default)]
pub struct KeySortParams {
    pub key: CacheKey,
    pub order: SortOrder,
    /// Compare as strings instead of numbers
    pub alpha: bool,
    pub offset: usize,
    pub count: Option<usize>,
    pub by_pattern: Option<String>,
    pub get_patterns: Vec<String>,
    pub options: CommandOptions,
}

impl KeySortParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_limit(mut self, offset: usize, count: usize) -> Self {
        self.offset = offset;
        self.count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeySortResponse {
    pub status: CacheStatus,
    pub values: Vec<String>,
}

/// Sort and store the result as a list under `destination_key`
#[derive(Debug, Clone, Default)]
pub struct KeySortAndStoreParams {
    pub key: CacheKey,
    pub destination_key: CacheKey,
    pub order: SortOrder,
    pub alpha: bool,
    pub offset: usize,
    pub count: Option<usize>,
    pub by_pattern: Option<String>,
    pub get_patterns: Vec<String>,
    pub options: CommandOptions,
}

impl KeySortAndStoreParams {
    pub fn new(key: CacheKey, destination_key: CacheKey) -> Self {
        Self {
            key,
            destination_key,
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_limit(mut self, offset: usize, count: usize) -> Self {
        self.offset = offset;
        self.count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeySortAndStoreResponse {
    pub status: CacheStatus,
    pub length: i64,
}

#[derive(Debug, Clone, Default)]
pub struct KeyTypeParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl KeyTypeParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyTypeResponse {
    pub status: CacheStatus,
    pub value_type: Option<CacheValueType>,
}

#[derive(Debug, Clone, Default)]
pub struct KeyTimeToLiveParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl KeyTimeToLiveParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyTimeToLiveResponse {
    pub status: CacheStatus,
    /// Remaining lifetime, `None` when the key never expires
    pub time_to_live: Option<Duration>,
}

impl_response!(
    KeyDeleteResponse,
    KeyDumpResponse,
    KeyExistResponse,
    KeyExpireResponse,
    KeyMigrateResponse,
    KeyMoveResponse,
    KeyPersistResponse,
    KeyRandomResponse,
    KeyRenameResponse,
    KeyRestoreResponse,
    KeyScanResponse,
    KeySortResponse,
    KeySortAndStoreResponse,
    KeyTypeResponse,
    KeyTimeToLiveResponse,
);
