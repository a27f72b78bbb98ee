//! Convenience re-exports for common cache-system usage

// Routing and execution
pub use crate::dispatcher::Dispatcher;
pub use crate::registry::{CacheRegistry, ServerResolver};
pub use crate::server::{CacheEndpoint, CacheServer, ServerType, DEFAULT_IN_MEMORY_SERVER};

// Command model
pub use crate::command::hash::*;
pub use crate::command::keys::*;
pub use crate::command::list::*;
pub use crate::command::server::*;
pub use crate::command::set::*;
pub use crate::command::sorted_set::*;
pub use crate::command::string::*;
pub use crate::command::{
    CacheCommand, CacheOperation, CacheResponse, CacheStatus, CommandDescriptor, CommandFamily,
    CommandFlags, CommandOptions, StructurePattern,
};
pub use crate::data::DataResponse;
pub use crate::entry::{CacheEntry, CacheExpiration, CacheValueType, SetCondition};
pub use crate::keys::{CacheKey, CacheObject, KeyComposer};
pub use crate::values::*;

// Errors and providers
pub use crate::errors::{CacheError, ErrorCode};
pub use crate::provider::{CacheProvider, MemoryProvider, RedisProvider};
pub use crate::serializer::{DataSerializer, JsonSerializer};

// Common external dependencies
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
