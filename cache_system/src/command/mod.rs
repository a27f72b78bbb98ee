//! Command model
//!
//! Every cache operation has one parameter type and one response type. The
//! parameter carries the inputs plus `CommandOptions` (target cache object,
//! flags, structural pattern, in-memory fallback). The response carries a
//! `CacheStatus` and a typed payload.
//!
//! The binding of parameters to provider methods and to the dispatcher facade
//! is generated from the single table in `table.rs`.

use crate::errors::{CacheError, ErrorCode};
use crate::keys::{CacheKey, CacheObject};
use crate::provider::CacheProvider;
use crate::server::CacheServer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

macro_rules! impl_response {
    ($($response:ty),+ $(,)?) => {
        $(
            impl $crate::command::CacheResponse for $response {
                fn status(&self) -> &$crate::command::CacheStatus {
                    &self.status
                }

                fn status_mut(&mut self) -> &mut $crate::command::CacheStatus {
                    &mut self.status
                }
            }
        )+
    };
}

pub mod hash;
pub mod keys;
pub mod list;
pub mod server;
pub mod set;
pub mod sorted_set;
pub mod string;
mod table;

pub use table::*;

/// Per-command routing hints, combined as a bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CommandFlags(u32);

impl CommandFlags {
    pub const NONE: CommandFlags = CommandFlags(0);
    pub const HIGH_PRIORITY: CommandFlags = CommandFlags(1);
    pub const FIRE_AND_FORGET: CommandFlags = CommandFlags(1 << 1);
    pub const NO_REDIRECT: CommandFlags = CommandFlags(1 << 2);
    pub const DEMAND_MASTER: CommandFlags = CommandFlags(1 << 3);
    pub const PREFER_REPLICA: CommandFlags = CommandFlags(1 << 4);
    pub const DEMAND_REPLICA: CommandFlags = CommandFlags(1 << 5);

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: CommandFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: CommandFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: CommandFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for CommandFlags {
    type Output = CommandFlags;

    fn bitor(self, rhs: CommandFlags) -> CommandFlags {
        CommandFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for CommandFlags {
    fn bitor_assign(&mut self, rhs: CommandFlags) {
        self.0 |= rhs.0;
    }
}

/// Whether a command targets one server or a sharded set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StructurePattern {
    #[default]
    Single,
    Distribute,
}

/// Options shared by every command parameter
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Logical entity the command works on; drives server resolution
    pub cache_object: Option<CacheObject>,
    pub flags: CommandFlags,
    pub structure: StructurePattern,
    /// Fall back to the process-local server when resolution yields nothing
    pub use_in_memory_for_default: bool,
    /// Skip resolution and run on this server
    pub server: Option<CacheServer>,
}

/// Outcome carried by every response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStatus {
    pub success: bool,
    pub code: Option<ErrorCode>,
    pub message: Option<String>,
}

impl CacheStatus {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: None,
            message: None,
        }
    }

    pub fn failed(code: ErrorCode) -> Self {
        Self {
            success: false,
            code: Some(code),
            message: Some(code.description().to_string()),
        }
    }
}

/// Common behavior of response records
pub trait CacheResponse: Default + Send + 'static {
    fn status(&self) -> &CacheStatus;

    fn status_mut(&mut self) -> &mut CacheStatus;

    /// Empty successful response
    fn success() -> Self {
        let mut response = Self::default();
        *response.status_mut() = CacheStatus::ok();
        response
    }

    /// Empty failed response with the code's default message
    fn failure(code: ErrorCode) -> Self {
        let mut response = Self::default();
        *response.status_mut() = CacheStatus::failed(code);
        response
    }

    /// Failed response with a custom message
    fn failure_with(code: ErrorCode, message: impl Into<String>) -> Self {
        let mut response = Self::failure(code);
        response.status_mut().message = Some(message.into());
        response
    }

    /// Mark this response failed while keeping any payload already set
    fn fail(&mut self, code: ErrorCode) {
        *self.status_mut() = CacheStatus::failed(code);
    }

    fn is_success(&self) -> bool {
        self.status().success
    }

    fn code(&self) -> Option<ErrorCode> {
        self.status().code
    }
}

/// Object-safe view of a command parameter, handed to server resolvers
pub trait CommandDescriptor: Send + Sync {
    fn operation(&self) -> CacheOperation;

    fn options(&self) -> &CommandOptions;

    fn options_mut(&mut self) -> &mut CommandOptions;

    /// Keys the command touches, in argument order
    fn keys(&self) -> Vec<&CacheKey>;

    /// Cache object from the options, else from the first key that has one
    fn cache_object(&self) -> Option<&CacheObject> {
        self.options()
            .cache_object
            .as_ref()
            .or_else(|| self.keys().into_iter().find_map(|k| k.object()))
    }

    fn for_object(mut self, object: CacheObject) -> Self
    where
        Self: Sized,
    {
        self.options_mut().cache_object = Some(object);
        self
    }

    fn with_flags(mut self, flags: CommandFlags) -> Self
    where
        Self: Sized,
    {
        self.options_mut().flags = flags;
        self
    }

    fn with_structure(mut self, structure: StructurePattern) -> Self
    where
        Self: Sized,
    {
        self.options_mut().structure = structure;
        self
    }

    fn use_in_memory_for_default(mut self, enabled: bool) -> Self
    where
        Self: Sized,
    {
        self.options_mut().use_in_memory_for_default = enabled;
        self
    }

    fn on_server(mut self, server: CacheServer) -> Self
    where
        Self: Sized,
    {
        self.options_mut().server = Some(server);
        self
    }
}

/// A parameter bound to the provider method that executes it
#[async_trait]
pub trait CacheCommand: CommandDescriptor + Clone {
    type Response: CacheResponse;

    async fn execute(
        &self,
        provider: &dyn CacheProvider,
        server: &CacheServer,
    ) -> Result<Self::Response, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::string::{StringGetParams, StringGetResponse};

    #[test]
    fn test_flags_combine() {
        let mut flags = CommandFlags::FIRE_AND_FORGET | CommandFlags::NO_REDIRECT;
        assert!(flags.contains(CommandFlags::FIRE_AND_FORGET));
        assert!(!flags.contains(CommandFlags::DEMAND_MASTER));

        flags.remove(CommandFlags::FIRE_AND_FORGET);
        assert!(!flags.contains(CommandFlags::FIRE_AND_FORGET));
        flags |= CommandFlags::HIGH_PRIORITY;
        assert_eq!(flags.bits(), 0b101);
        assert!(CommandFlags::NONE.is_empty());
    }

    #[test]
    fn test_response_helpers() {
        let ok = StringGetResponse::success();
        assert!(ok.is_success());
        assert_eq!(ok.code(), None);

        let failed = StringGetResponse::failure(ErrorCode::KeyNotExist);
        assert!(!failed.is_success());
        assert_eq!(failed.code(), Some(ErrorCode::KeyNotExist));
        assert_eq!(
            failed.status().message.as_deref(),
            Some("cache key does not exist")
        );
    }

    #[test]
    fn test_descriptor_builders_and_object_lookup() {
        let key = CacheKey::for_object(CacheObject::new("users")).with_name("1");
        let params = StringGetParams::new(key)
            .with_flags(CommandFlags::PREFER_REPLICA)
            .use_in_memory_for_default(true);

        assert_eq!(params.operation(), CacheOperation::StringGet);
        assert_eq!(params.operation().family(), CommandFamily::String);
        assert_eq!(params.cache_object().map(|o| o.name.as_str()), Some("users"));
        assert!(params.options().use_in_memory_for_default);

        let params = params.for_object(CacheObject::new("sessions"));
        assert_eq!(params.cache_object().map(|o| o.name.as_str()), Some("sessions"));
    }
}
