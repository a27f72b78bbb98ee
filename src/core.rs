//! Core CacheHaus functionality
//!
//! This module contains the main CacheHaus struct, which turns an `AppConfig`
//! into a ready-to-use registry and dispatcher.

use std::collections::HashMap;
use std::sync::Arc;

use cache_system::command::keys::KeyExistParams;
use cache_system::command::{CacheResponse, CommandDescriptor};
use cache_system::keys::CacheKey;
use cache_system::{CacheRegistry, CacheServer, Dispatcher, RedisProvider, ServerType};
use config::AppConfig;

use crate::errors::CacheHausError;

/// Key probed by `health_check`
const HEALTH_KEY: &str = "cachehaus:health";

/// Main CacheHaus coordinator owning the configured servers and the dispatcher
#[derive(Debug)]
pub struct CacheHaus {
    config: AppConfig,
    servers: HashMap<String, CacheServer>,
    dispatcher: Dispatcher,
}

impl CacheHaus {
    /// Build from a configuration
    pub fn new(config: AppConfig) -> Result<Self, CacheHausError> {
        Self::with_registry(config, |_| {})
    }

    /// Build from `CACHEHAUS_CONFIG` or `./cachehaus.toml`
    pub fn load() -> Result<Self, CacheHausError> {
        Self::new(AppConfig::load()?)
    }

    /// Build from a configuration, letting `customize` adjust the registry
    /// (object prefixes, serializer, extra providers) before it is frozen
    pub fn with_registry(
        config: AppConfig,
        customize: impl FnOnce(&mut CacheRegistry),
    ) -> Result<Self, CacheHausError> {
        config.validate()?;

        let servers: HashMap<String, CacheServer> = config
            .servers
            .iter()
            .map(|server_config| {
                let server = CacheServer::from(server_config);
                (server.identity(), server)
            })
            .collect();

        let lookup = |name: &str| servers.get(&name.to_lowercase()).cloned();
        let routes: HashMap<String, CacheServer> = config
            .routing
            .objects
            .iter()
            .filter_map(|(object, target)| Some((object.clone(), lookup(target.as_str())?)))
            .collect();
        let default_server = config.routing.default_server.as_deref().and_then(lookup);

        let mut registry = CacheRegistry::new();
        registry
            .configure_cache_provider(ServerType::Redis, Arc::new(RedisProvider::new()))
            .configure_key_split(
                config.cache.key_split.clone(),
                config.cache.name_value_split.clone(),
            )
            .configure_throw_on_missing_database(config.cache.throw_on_missing_database)
            .configure_in_memory_fallback(config.cache.use_in_memory_for_default)
            .configure_cache_server(Arc::new(move |command: &dyn CommandDescriptor| {
                command
                    .cache_object()
                    .and_then(|object| routes.get(&object.name))
                    .or(default_server.as_ref())
                    .cloned()
            }));

        if !config.cache.global_prefixes.is_empty() {
            let prefixes = config.cache.global_prefixes.clone();
            registry.configure_global_prefix(Arc::new(move || prefixes.clone()));
        }

        customize(&mut registry);

        debug_log!("CacheHaus configured with {} server(s)", servers.len());

        Ok(Self {
            config,
            servers,
            dispatcher: Dispatcher::new(Arc::new(registry)),
        })
    }

    /// Dispatcher for every cache command
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Configured server by name, ignoring case
    pub fn server(&self, name: &str) -> Result<&CacheServer, CacheHausError> {
        self.servers
            .get(&name.to_lowercase())
            .ok_or_else(|| CacheHausError::ServerNotFound(name.to_string()))
    }

    /// Names of all configured servers, sorted
    pub fn list_servers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.servers.values().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Round-trip a cheap command to a configured server
    pub async fn health_check(&self, name: &str) -> Result<(), CacheHausError> {
        let server = self.server(name)?.clone();
        let params = KeyExistParams::new(vec![CacheKey::constant(HEALTH_KEY)]).on_server(server);
        let response = self.dispatcher.execute(&params).await?;
        if !response.is_success() {
            return Err(CacheHausError::Unhealthy(
                name.to_string(),
                response.status().message.clone().unwrap_or_default(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cache_system::command::string::StringGetParams;
    use cache_system::CacheProvider;
    use cache_system::keys::CacheObject;

    const CONFIG: &str = r#"
[cache]
global_prefixes = ["svc"]

[[servers]]
name = "Sessions"
server_type = "memory"
database = 1

[[servers]]
name = "fallback"
server_type = "memory"

[routing]
default_server = "fallback"
[routing.objects]
sessions = "sessions"
"#;

    fn haus() -> CacheHaus {
        CacheHaus::new(AppConfig::from_toml_str(CONFIG).unwrap()).unwrap()
    }

    #[test]
    fn test_servers_by_name() {
        let haus = haus();
        assert_eq!(haus.list_servers(), vec!["Sessions", "fallback"]);
        assert_eq!(haus.server("SESSIONS").unwrap().database, Some(1));
        assert!(matches!(
            haus.server("orders"),
            Err(CacheHausError::ServerNotFound(name)) if name == "orders"
        ));
    }

    #[test]
    fn test_routing_by_object_then_default() {
        let haus = haus();
        let registry = haus.dispatcher().registry();

        let routed =
            StringGetParams::new(CacheKey::for_object(CacheObject::new("sessions")).with_name("1"));
        assert_eq!(registry.get_cache_server(&routed).unwrap().name, "Sessions");

        let other =
            StringGetParams::new(CacheKey::for_object(CacheObject::new("orders")).with_name("1"));
        assert_eq!(registry.get_cache_server(&other).unwrap().name, "fallback");

        let bare = StringGetParams::new(CacheKey::new().with_name("1"));
        assert_eq!(registry.get_cache_server(&bare).unwrap().name, "fallback");
    }

    #[test]
    fn test_redis_provider_registered() {
        let haus = haus();
        let provider = haus.dispatcher().registry().get_cache_provider(ServerType::Redis).unwrap();
        assert_eq!(provider.name(), "redis");
    }

    #[test]
    fn test_global_prefixes_applied() {
        let haus = haus();
        let key = CacheKey::new().with_name_value("user", "7");
        assert_eq!(haus.dispatcher().registry().composer().compose(&key), "svc:user:7");
    }

    #[test]
    fn test_customize_hook_runs() {
        let config = AppConfig::from_toml_str(CONFIG).unwrap();
        let haus = CacheHaus::with_registry(config, |registry| {
            registry.configure_key_split("/", "=");
        })
        .unwrap();
        let key = CacheKey::new().with_name_value("user", "7");
        assert_eq!(haus.dispatcher().registry().composer().compose(&key), "svc/user=7");
    }

    #[tokio::test]
    async fn test_health_check_on_memory_server() {
        let haus = haus();
        haus.health_check("fallback").await.unwrap();
        assert!(matches!(
            haus.health_check("missing").await,
            Err(CacheHausError::ServerNotFound(_))
        ));
    }
}
