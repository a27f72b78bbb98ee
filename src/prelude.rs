//! Convenience re-exports for common CacheHaus usage
//!
//! This prelude module re-exports the most commonly used items from the CacheHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use cachehaus::prelude::*;
//!
//! let key = CacheKey::new().with_name_value("user", "1");
//! let params = StringGetParams::new(key);
//! ```

// Core CacheHaus components
pub use crate::core::CacheHaus;
pub use crate::errors::CacheHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheSettings, ConfigError, RoutingConfig, ServerConfig, ServerKind};

// Re-export cache system
pub use cache_system::prelude::*;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use chrono;
pub use tokio;
