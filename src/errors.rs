//! Error types for the CacheHaus crate
//!
//! This module contains all error types that can be returned by CacheHaus operations.

use cache_system::{CacheError, ErrorCode};
use config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheHausError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache server not found: {0}")]
    ServerNotFound(String),

    #[error("Cache server '{0}' is unhealthy: {1}")]
    Unhealthy(String, String),
}

impl CacheHausError {
    /// Response code for configuration failures raised by the cache layer
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            CacheHausError::Cache(e) => e.code(),
            _ => None,
        }
    }
}
