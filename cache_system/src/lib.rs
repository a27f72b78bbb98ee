//! Cache system: the command layer behind CacheHaus
//!
//! Callers build a parameter record for one cache operation, hand it to the
//! [`Dispatcher`], and get back a typed response. The dispatcher resolves the
//! server through the [`CacheRegistry`], composes keys with the registered
//! prefixes, and runs the command on the provider for that server's type.
//!
//! ```rust,no_run
//! use cache_system::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), CacheError> {
//! let mut registry = CacheRegistry::new();
//! registry.configure_in_memory_fallback(true);
//! let cache = Dispatcher::new(Arc::new(registry));
//!
//! let key = CacheKey::for_object(CacheObject::new("users")).with_name_value("id", "1");
//! cache.string().set(&StringSetParams::single(key.clone(), "ada")).await?;
//! let response = cache.string().get(&StringGetParams::new(key)).await?;
//! assert_eq!(response.value(), "ada");
//! # Ok(())
//! # }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod command;
pub mod data;
pub mod dispatcher;
pub mod entry;
pub mod errors;
pub mod keys;
pub mod prelude;
pub mod provider;
pub mod registry;
pub mod serializer;
pub mod server;
pub mod values;

pub use data::DataResponse;
pub use dispatcher::Dispatcher;
pub use errors::{CacheError, ErrorCode};
pub use provider::{CacheProvider, MemoryProvider, RedisProvider};
pub use registry::{CacheRegistry, ServerResolver};
pub use serializer::{DataSerializer, JsonSerializer};
pub use server::{CacheServer, ServerType};
