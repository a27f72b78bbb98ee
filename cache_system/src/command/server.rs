//! Server administration commands
//!
//! These carry no keys; the target server comes from the pinned server in the
//! options or from the resolver.

use super::{CacheStatus, CommandOptions};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Flush the given databases, or the server's own database when empty
#[derive(Debug, Clone, Default)]
pub struct ClearDataParams {
    pub databases: Vec<u32>,
    pub options: CommandOptions,
}

impl ClearDataParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_databases(mut self, databases: Vec<u32>) -> Self {
        self.databases = databases;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClearDataResponse {
    pub status: CacheStatus,
}

#[derive(Debug, Clone, Default)]
pub struct GetAllDatabasesParams {
    pub options: CommandOptions,
}

impl GetAllDatabasesParams {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheDatabase {
    pub index: u32,
    pub name: String,
    pub key_count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct GetAllDatabasesResponse {
    pub status: CacheStatus,
    pub databases: Vec<CacheDatabase>,
}

/// Keys of the target database matching a glob pattern
#[derive(Debug, Clone, Default)]
pub struct GetKeysParams {
    pub pattern: Option<String>,
    pub options: CommandOptions,
}

impl GetKeysParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetKeysResponse {
    pub status: CacheStatus,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GetLastSaveParams {
    pub options: CommandOptions,
}

impl GetLastSaveParams {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetLastSaveResponse {
    pub status: CacheStatus,
    pub last_save: Option<DateTime<Utc>>,
}

/// Server configuration entries matching a glob pattern
#[derive(Debug, Clone, Default)]
pub struct GetConfigParams {
    pub pattern: Option<String>,
    pub options: CommandOptions,
}

impl GetConfigParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetConfigResponse {
    pub status: CacheStatus,
    pub config: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShutdownParams {
    /// Persist data before stopping
    pub save: bool,
    pub options: CommandOptions,
}

impl ShutdownParams {
    pub fn new(save: bool) -> Self {
        Self {
            save,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShutdownResponse {
    pub status: CacheStatus,
}

impl_response!(
    ClearDataResponse,
    GetAllDatabasesResponse,
    GetKeysResponse,
    GetLastSaveResponse,
    GetConfigResponse,
    ShutdownResponse,
);
