//! Error types for cache operations
//!
//! Two layers live here. `ErrorCode` is the stable, data-dependent outcome a
//! provider writes into a response (missing key, wrong type, ...). `CacheError`
//! is returned through `Result` and is reserved for setup mistakes and
//! unrecoverable provider faults.

use crate::server::ServerType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable response codes for expected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    KeyIsNullOrEmpty,
    KeyNotExist,
    OffsetLessThanZero,
    OffsetInvalid,
    ValuesIsNullOrEmpty,
    ValueIsNotString,
    ValueIsNotList,
    ValueIsNotHash,
    ValueIsNotSet,
    ValueIsNotSortedSet,
    ValueCannotBeCalculated,
    OperationUnsupported,
    NoResult,
    ServerNotConfigured,
    ProviderNotConfigured,
    DatabaseNotConfigured,
}

impl ErrorCode {
    /// Wire form of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::KeyIsNullOrEmpty => "1001",
            ErrorCode::KeyNotExist => "1002",
            ErrorCode::OffsetLessThanZero => "1003",
            ErrorCode::OffsetInvalid => "1004",
            ErrorCode::ValuesIsNullOrEmpty => "1005",
            ErrorCode::ValueIsNotString => "1006",
            ErrorCode::ValueIsNotList => "1007",
            ErrorCode::ValueIsNotHash => "1008",
            ErrorCode::ValueIsNotSet => "1009",
            ErrorCode::ValueIsNotSortedSet => "1010",
            ErrorCode::ValueCannotBeCalculated => "1011",
            ErrorCode::OperationUnsupported => "1012",
            ErrorCode::NoResult => "1013",
            ErrorCode::ServerNotConfigured => "1014",
            ErrorCode::ProviderNotConfigured => "1015",
            ErrorCode::DatabaseNotConfigured => "1016",
        }
    }

    /// Human readable description used as the default response message
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::KeyIsNullOrEmpty => "cache key is null or empty",
            ErrorCode::KeyNotExist => "cache key does not exist",
            ErrorCode::OffsetLessThanZero => "offset is less than zero",
            ErrorCode::OffsetInvalid => "offset is out of range",
            ErrorCode::ValuesIsNullOrEmpty => "values are null or empty",
            ErrorCode::ValueIsNotString => "value is not a string",
            ErrorCode::ValueIsNotList => "value is not a list",
            ErrorCode::ValueIsNotHash => "value is not a hash",
            ErrorCode::ValueIsNotSet => "value is not a set",
            ErrorCode::ValueIsNotSortedSet => "value is not a sorted set",
            ErrorCode::ValueCannotBeCalculated => "value cannot be calculated",
            ErrorCode::OperationUnsupported => "operation is not supported by the provider",
            ErrorCode::NoResult => "no results were returned",
            ErrorCode::ServerNotConfigured => "no cache server is configured",
            ErrorCode::ProviderNotConfigured => "no cache provider is configured",
            ErrorCode::DatabaseNotConfigured => "no database is configured",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache system errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No cache server could be resolved for operation {0}")]
    ServerNotConfigured(String),

    #[error("No cache provider is registered for server type {0}")]
    ProviderNotConfigured(ServerType),

    #[error("Cache server '{0}' has no database configured")]
    DatabaseNotConfigured(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache operation timeout")]
    Timeout,

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("Blocking cache calls cannot run inside an async runtime")]
    BlockingInAsyncContext,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CacheError {
    /// Response code matching this error, for the configuration family
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            CacheError::ServerNotConfigured(_) => Some(ErrorCode::ServerNotConfigured),
            CacheError::ProviderNotConfigured(_) => Some(ErrorCode::ProviderNotConfigured),
            CacheError::DatabaseNotConfigured(_) => Some(ErrorCode::DatabaseNotConfigured),
            _ => None,
        }
    }

    /// Whether the error comes from a setup mistake rather than a runtime fault
    pub fn is_configuration(&self) -> bool {
        self.code().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let all = [
            ErrorCode::KeyIsNullOrEmpty,
            ErrorCode::KeyNotExist,
            ErrorCode::OffsetLessThanZero,
            ErrorCode::OffsetInvalid,
            ErrorCode::ValuesIsNullOrEmpty,
            ErrorCode::ValueIsNotString,
            ErrorCode::ValueIsNotList,
            ErrorCode::ValueIsNotHash,
            ErrorCode::ValueIsNotSet,
            ErrorCode::ValueIsNotSortedSet,
            ErrorCode::ValueCannotBeCalculated,
            ErrorCode::OperationUnsupported,
            ErrorCode::NoResult,
            ErrorCode::ServerNotConfigured,
            ErrorCode::ProviderNotConfigured,
            ErrorCode::DatabaseNotConfigured,
        ];
        let codes: HashSet<&str> = all.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes.len(), all.len());
        assert_ne!(
            ErrorCode::ValueIsNotSortedSet.as_str(),
            ErrorCode::ValueCannotBeCalculated.as_str()
        );
    }

    #[test]
    fn test_configuration_errors_carry_codes() {
        let err = CacheError::ProviderNotConfigured(ServerType::Redis);
        assert!(err.is_configuration());
        assert_eq!(err.code(), Some(ErrorCode::ProviderNotConfigured));
        assert!(!CacheError::Timeout.is_configuration());
    }
}
