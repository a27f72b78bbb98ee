//! # CacheHaus
//!
//! A uniform cache command layer: one set of string, list, hash, set,
//! sorted-set, key and server commands, dispatched to the in-memory provider
//! or to Redis depending on how each cache object is routed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cachehaus::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Session {
//!     user: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_toml_str(
//!         r#"
//!         [cache]
//!         global_prefixes = ["app"]
//!         use_in_memory_for_default = true
//!         "#,
//!     )?;
//!     let cache = CacheHaus::new(config)?;
//!     let dispatcher = cache.dispatcher();
//!
//!     let key = CacheKey::for_object(CacheObject::new("sessions")).with_name_value("id", "42");
//!     let set = StringSetParams::single(key.clone(), "hello");
//!     dispatcher.string().set(&set).await?;
//!
//!     let got = dispatcher.string().get(&StringGetParams::new(key)).await?;
//!     println!("{}", got.value());
//!
//!     let session_key = CacheKey::new().with_name_value("session", "abc");
//!     let session = Session { user: "ada".into() };
//!     dispatcher
//!         .set_data(session_key.clone(), &session, None, CommandOptions::default())
//!         .await?;
//!     let loaded: DataResponse<Session> = dispatcher
//!         .get_data(session_key, CommandOptions::default())
//!         .await?;
//!     println!("{:?}", loaded.into_data());
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::CacheHaus;
pub use errors::CacheHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheSettings, ConfigError, RoutingConfig, ServerConfig, ServerKind};

// Re-export internal crates used by the public API
pub use cache_system;

// Re-export external dependencies used in public API
pub use async_trait;
pub use chrono;
