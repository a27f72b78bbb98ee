//! Set commands

use super::{CacheStatus, CommandOptions};
use crate::entry::CacheExpiration;
use crate::keys::CacheKey;
use crate::values::CombineOperation;

#[derive(Debug, Clone, Default)]
pub struct SetAddParams {
    pub key: CacheKey,
    pub members: Vec<String>,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl SetAddParams {
    pub fn new(key: CacheKey, members: Vec<String>) -> Self {
        Self {
            key,
            members,
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
pub struct SetAddResponse {
    pub status: CacheStatus,
    /// Members that were not present before
    pub added: i64,
}

/// Union, intersection or difference of several sets, in key order
#[derive(Debug, Clone)]
pub struct SetCombineParams {
    pub keys: Vec<CacheKey>,
    pub operation: CombineOperation,
    pub options: CommandOptions,
}

impl SetCombineParams {
    pub fn new(keys: Vec<CacheKey>, operation: CombineOperation) -> Self {
        Self {
            keys,
            operation,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetCombineResponse {
    pub status: CacheStatus,
    pub members: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SetCombineAndStoreParams {
    pub keys: Vec<CacheKey>,
    pub destination_key: CacheKey,
    pub operation: CombineOperation,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl SetCombineAndStoreParams {
    pub fn new(
        keys: Vec<CacheKey>,
        destination_key: CacheKey,
        operation: CombineOperation,
    ) -> Self {
        Self {
            keys,
            destination_key,
            operation,
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
pub struct SetCombineAndStoreResponse {
    pub status: CacheStatus,
    /// Size of the stored set
    pub count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SetContainsParams {
    pub key: CacheKey,
    pub member: String,
    pub options: CommandOptions,
}

impl SetContainsParams {
    pub fn new(key: CacheKey, member: impl Into<String>) -> Self {
        Self {
            key,
            member: member.into(),
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetContainsResponse {
    pub status: CacheStatus,
    pub contains: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SetLengthParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl SetLengthParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetLengthResponse {
    pub status: CacheStatus,
    pub length: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SetMembersParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl SetMembersParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetMembersResponse {
    pub status: CacheStatus,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SetMoveParams {
    pub source_key: CacheKey,
    pub destination_key: CacheKey,
    pub member: String,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl SetMoveParams {
    pub fn new(source_key: CacheKey, destination_key: CacheKey, member: impl Into<String>) -> Self {
        Self {
            source_key,
            destination_key,
            member: member.into(),
            expiration: None,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetMoveResponse {
    pub status: CacheStatus,
    pub moved: bool,
}

/// Remove and return up to `count` random members
#[derive(Debug, Clone, Default)]
pub struct SetPopParams {
    pub key: CacheKey,
    pub count: usize,
    pub options: CommandOptions,
}

impl SetPopParams {
    pub fn new(key: CacheKey, count: usize) -> Self {
        Self {
            key,
            count,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetPopResponse {
    pub status: CacheStatus,
    pub members: Vec<String>,
}

/// Largest `|count|` accepted for repeated sampling
pub const MAX_RANDOM_MEMBERS: u64 = 1_000_000;

/// Random members without removal. A positive count returns distinct
/// members; a negative count may repeat members and returns exactly `|count|`,
/// up to `MAX_RANDOM_MEMBERS`. Larger negative counts fail with `OffsetInvalid`.
#[derive(Debug, Clone, Default)]
pub struct SetRandomMembersParams {
    pub key: CacheKey,
    pub count: i64,
    pub options: CommandOptions,
}

impl SetRandomMembersParams {
    pub fn new(key: CacheKey, count: i64) -> Self {
        Self {
            key,
            count,
            options: CommandOptions::default(),
        }
    }

    /// True when a repeating sample would exceed `MAX_RANDOM_MEMBERS`
    pub fn exceeds_sample_limit(&self) -> bool {
        self.count < 0 && self.count.unsigned_abs() > MAX_RANDOM_MEMBERS
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetRandomMembersResponse {
    pub status: CacheStatus,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SetRemoveParams {
    pub key: CacheKey,
    pub members: Vec<String>,
    pub options: CommandOptions,
}

impl SetRemoveParams {
    pub fn new(key: CacheKey, members: Vec<String>) -> Self {
        Self {
            key,
            members,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetRemoveResponse {
    pub status: CacheStatus,
    pub removed: i64,
}

impl_response!(
    SetAddResponse,
    SetCombineResponse,
    SetCombineAndStoreResponse,
    SetContainsResponse,
    SetLengthResponse,
    SetMembersResponse,
    SetMoveResponse,
    SetPopResponse,
    SetRandomMembersResponse,
    SetRemoveResponse,
);
