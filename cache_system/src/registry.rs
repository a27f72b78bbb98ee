//! Configuration registry
//!
//! Holds everything the dispatcher needs to route a command: providers by
//! server type, the server resolver, the key composer, the data serializer
//! and the database policy. The registry is assembled once at startup and
//! then shared behind an `Arc`; every `configure_*` call overwrites the
//! previous value.

use crate::command::CommandDescriptor;
use crate::errors::CacheError;
use crate::keys::{GlobalPrefixFn, KeyComposer, ObjectPrefixFn};
use crate::provider::{CacheProvider, MemoryProvider};
use crate::serializer::{DataSerializer, JsonSerializer};
use crate::server::{CacheServer, ServerType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Picks the server for a command, `None` when it has no opinion
pub type ServerResolver = Arc<dyn Fn(&dyn CommandDescriptor) -> Option<CacheServer> + Send + Sync>;

pub struct CacheRegistry {
    providers: HashMap<ServerType, Arc<dyn CacheProvider>>,
    resolver: Option<ServerResolver>,
    composer: KeyComposer,
    serializer: Arc<dyn DataSerializer>,
    throw_on_missing_database: bool,
    in_memory_fallback: bool,
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut providers: Vec<String> = self
            .providers
            .iter()
            .map(|(server_type, provider)| format!("{}={}", server_type, provider.name()))
            .collect();
        providers.sort();

        f.debug_struct("CacheRegistry")
            .field("providers", &providers)
            .field("has_resolver", &self.resolver.is_some())
            .field("composer", &self.composer)
            .field("serializer", &self.serializer.name())
            .field("throw_on_missing_database", &self.throw_on_missing_database)
            .field("in_memory_fallback", &self.in_memory_fallback)
            .finish()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheRegistry {
    /// Registry with the in-memory provider registered and nothing else
    pub fn new() -> Self {
        let mut providers: HashMap<ServerType, Arc<dyn CacheProvider>> = HashMap::new();
        providers.insert(ServerType::InMemory, Arc::new(MemoryProvider::new()));
        Self {
            providers,
            resolver: None,
            composer: KeyComposer::default(),
            serializer: Arc::new(JsonSerializer),
            throw_on_missing_database: false,
            in_memory_fallback: false,
        }
    }

    pub fn configure_cache_provider(
        &mut self,
        server_type: ServerType,
        provider: Arc<dyn CacheProvider>,
    ) -> &mut Self {
        debug_log!("Registering provider '{}' for {}", provider.name(), server_type);
        self.providers.insert(server_type, provider);
        self
    }

    /// Install the callback that maps a command to its server
    pub fn configure_cache_server(&mut self, resolver: ServerResolver) -> &mut Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn configure_global_prefix(&mut self, prefix: GlobalPrefixFn) -> &mut Self {
        self.composer = std::mem::take(&mut self.composer).with_global_prefix(prefix);
        self
    }

    pub fn configure_object_prefix(&mut self, prefix: ObjectPrefixFn) -> &mut Self {
        self.composer = std::mem::take(&mut self.composer).with_object_prefix(prefix);
        self
    }

    pub fn configure_key_split(
        &mut self,
        key_split: impl Into<String>,
        name_value_split: impl Into<String>,
    ) -> &mut Self {
        self.composer = std::mem::take(&mut self.composer).with_split(key_split, name_value_split);
        self
    }

    pub fn configure_serializer(&mut self, serializer: Arc<dyn DataSerializer>) -> &mut Self {
        self.serializer = serializer;
        self
    }

    pub fn configure_throw_on_missing_database(&mut self, enabled: bool) -> &mut Self {
        self.throw_on_missing_database = enabled;
        self
    }

    /// Fall back to the in-memory server for every command, not only those
    /// that ask for it through their options
    pub fn configure_in_memory_fallback(&mut self, enabled: bool) -> &mut Self {
        self.in_memory_fallback = enabled;
        self
    }

    pub fn composer(&self) -> &KeyComposer {
        &self.composer
    }

    pub fn serializer(&self) -> &dyn DataSerializer {
        self.serializer.as_ref()
    }

    /// Server for a command: the pinned server, else the resolver's pick,
    /// else the in-memory default when fallback is allowed
    pub fn get_cache_server(
        &self,
        command: &dyn CommandDescriptor,
    ) -> Result<CacheServer, CacheError> {
        if let Some(server) = &command.options().server {
            return Ok(server.clone());
        }
        if let Some(server) = self.resolver.as_ref().and_then(|resolve| resolve(command)) {
            return Ok(server);
        }
        if command.options().use_in_memory_for_default || self.in_memory_fallback {
            return Ok(CacheServer::default_in_memory());
        }
        Err(CacheError::ServerNotConfigured(command.operation().to_string()))
    }

    pub fn get_cache_provider(
        &self,
        server_type: ServerType,
    ) -> Result<Arc<dyn CacheProvider>, CacheError> {
        self.providers
            .get(&server_type)
            .cloned()
            .ok_or(CacheError::ProviderNotConfigured(server_type))
    }

    /// Reject servers without a database index when the policy asks for one
    pub fn check_database(&self, server: &CacheServer) -> Result<(), CacheError> {
        if self.throw_on_missing_database && server.database.is_none() {
            return Err(CacheError::DatabaseNotConfigured(server.name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::string::StringGetParams;
    use crate::keys::{CacheKey, CacheObject};
    use crate::provider::RedisProvider;

    fn key(object: &str) -> CacheKey {
        CacheKey::for_object(CacheObject::new(object)).with_name("1")
    }

    #[test]
    fn test_pinned_server_wins() {
        let mut registry = CacheRegistry::new();
        registry.configure_cache_server(Arc::new(|_: &dyn CommandDescriptor| {
            Some(CacheServer::new("resolved", ServerType::Redis))
        }));

        let pinned = CacheServer::new("pinned", ServerType::InMemory);
        let params = StringGetParams::new(key("users")).on_server(pinned.clone());
        assert_eq!(registry.get_cache_server(&params).unwrap(), pinned);

        let params = StringGetParams::new(key("users"));
        assert_eq!(registry.get_cache_server(&params).unwrap().name, "resolved");
    }

    #[test]
    fn test_resolver_sees_cache_object() {
        let mut registry = CacheRegistry::new();
        registry.configure_cache_server(Arc::new(|command: &dyn CommandDescriptor| {
            let object = command.cache_object()?;
            (object.name == "sessions")
                .then(|| CacheServer::new("session-store", ServerType::InMemory))
        }));

        let routed = StringGetParams::new(key("sessions"));
        assert_eq!(registry.get_cache_server(&routed).unwrap().name, "session-store");

        let unrouted = StringGetParams::new(key("orders"));
        assert!(matches!(
            registry.get_cache_server(&unrouted),
            Err(CacheError::ServerNotConfigured(op)) if op == "StringGet"
        ));
    }

    #[test]
    fn test_in_memory_fallback() {
        let mut registry = CacheRegistry::new();
        let params = StringGetParams::new(key("users")).use_in_memory_for_default(true);
        assert_eq!(
            registry.get_cache_server(&params).unwrap(),
            CacheServer::default_in_memory()
        );

        let params = StringGetParams::new(key("users"));
        assert!(registry.get_cache_server(&params).is_err());
        registry.configure_in_memory_fallback(true);
        assert!(registry.get_cache_server(&params).is_ok());
    }

    #[test]
    fn test_provider_lookup() {
        let mut registry = CacheRegistry::new();
        assert_eq!(registry.get_cache_provider(ServerType::InMemory).unwrap().name(), "in-memory");
        assert!(matches!(
            registry.get_cache_provider(ServerType::Redis),
            Err(CacheError::ProviderNotConfigured(ServerType::Redis))
        ));

        registry.configure_cache_provider(ServerType::Redis, Arc::new(RedisProvider::new()));
        assert_eq!(registry.get_cache_provider(ServerType::Redis).unwrap().name(), "redis");
    }

    #[test]
    fn test_missing_database_policy() {
        let mut registry = CacheRegistry::new();
        let server = CacheServer::new("nodb", ServerType::InMemory);
        assert!(registry.check_database(&server).is_ok());

        registry.configure_throw_on_missing_database(true);
        assert!(matches!(
            registry.check_database(&server),
            Err(CacheError::DatabaseNotConfigured(name)) if name == "nodb"
        ));
        assert!(registry.check_database(&server.with_database(2)).is_ok());
    }

    #[test]
    fn test_key_split_reaches_composer() {
        let mut registry = CacheRegistry::new();
        registry
            .configure_key_split("|", "=")
            .configure_global_prefix(Arc::new(|| vec!["app".to_string()]));
        let key = CacheKey::new().with_name_value("user", "1");
        assert_eq!(registry.composer().compose(&key), "app|user=1");
    }
}
