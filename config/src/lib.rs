//! # Configuration Management for CacheHaus
//!
//! This crate provides the configuration structures for CacheHaus: key
//! composition settings, the cache servers and the routing of cache objects
//! onto those servers.
//!
//! ## TOML File Configuration
//! ```toml
//! [cache]
//! key_split = ":"
//! name_value_split = ":"
//! global_prefixes = ["app"]
//! throw_on_missing_database = false
//! use_in_memory_for_default = true
//!
//! [[servers]]
//! name = "primary"
//! server_type = "redis"
//! endpoints = [{ host = "127.0.0.1", port = 6379 }]
//! database = 0
//! connect_timeout_ms = 5000
//! sync_timeout_ms = 5000
//!
//! [routing]
//! default_server = "primary"
//! [routing.objects]
//! sessions = "primary"
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! # fn main() -> Result<(), config::ConfigError> {
//! // Load from CACHEHAUS_CONFIG or ./cachehaus.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./cachehaus.toml";
const CONFIG_PATH_VAR: &str = "CACHEHAUS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// Key composition and fallback policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub key_split: String,
    pub name_value_split: String,
    pub global_prefixes: Vec<String>,
    pub throw_on_missing_database: bool,
    pub use_in_memory_for_default: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_split: ":".to_string(),
            name_value_split: ":".to_string(),
            global_prefixes: Vec::new(),
            throw_on_missing_database: false,
            use_in_memory_for_default: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    Memory,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
}

/// One cache server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub server_type: ServerKind,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<u32>,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub sync_timeout_ms: u64,
    #[serde(default)]
    pub allow_admin: bool,
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Which server serves which cache object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub default_server: Option<String>,
    /// Cache object name to server name
    #[serde(default)]
    pub objects: HashMap<String, String>,
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the variable may come from the environment
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }

        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Server configuration by name, ignoring case
    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.key_split.is_empty() {
            return Err(ConfigError::Invalid("Cache key_split cannot be empty".to_string()));
        }
        if self.cache.name_value_split.is_empty() {
            return Err(ConfigError::Invalid(
                "Cache name_value_split cannot be empty".to_string(),
            ));
        }
        if self.cache.global_prefixes.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::Invalid(
                "Cache global_prefixes cannot contain empty entries".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for server in &self.servers {
            server.validate()?;
            if !names.insert(server.name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate server name '{}'",
                    server.name
                )));
            }
        }

        let routes = self
            .routing
            .default_server
            .iter()
            .chain(self.routing.objects.values());
        for target in routes {
            if self.server(target).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "Routing refers to unknown server '{}'",
                    target
                )));
            }
        }

        Ok(())
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("Server name cannot be empty".to_string()));
        }
        if self.server_type == ServerKind::Redis && self.endpoints.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Redis server '{}' needs at least one endpoint",
                self.name
            )));
        }
        for endpoint in &self.endpoints {
            if endpoint.host.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Server '{}' endpoint host cannot be empty",
                    self.name
                )));
            }
            if endpoint.port == 0 {
                return Err(ConfigError::Invalid(format!(
                    "Server '{}' endpoint port cannot be zero",
                    self.name
                )));
            }
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(format!(
                "Server '{}' connect_timeout_ms must be greater than 0",
                self.name
            )));
        }
        if self.sync_timeout_ms == 0 {
            return Err(ConfigError::Invalid(format!(
                "Server '{}' sync_timeout_ms must be greater than 0",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[cache]
key_split = ":"
name_value_split = "="
global_prefixes = ["app"]
use_in_memory_for_default = true

[[servers]]
name = "primary"
server_type = "redis"
endpoints = [{ host = "127.0.0.1", port = 6379 }]
database = 0
connect_timeout_ms = 2000

[[servers]]
name = "local"
server_type = "memory"

[routing]
default_server = "primary"
[routing.objects]
sessions = "Local"
"#;

    fn invalid_message(content: &str) -> String {
        match AppConfig::from_toml_str(content) {
            Err(ConfigError::Invalid(message)) => message,
            other => panic!("expected invalid configuration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.cache.name_value_split, "=");
        assert_eq!(config.cache.global_prefixes, vec!["app".to_string()]);
        assert!(config.cache.use_in_memory_for_default);
        assert!(!config.cache.throw_on_missing_database);

        let primary = config.server("PRIMARY").unwrap();
        assert_eq!(primary.server_type, ServerKind::Redis);
        assert_eq!(primary.connect_timeout_ms, 2000);
        assert_eq!(primary.sync_timeout_ms, 5000);
        assert_eq!(primary.database, Some(0));

        let local = config.server("local").unwrap();
        assert_eq!(local.server_type, ServerKind::Memory);
        assert!(local.endpoints.is_empty());
        assert_eq!(config.routing.objects.get("sessions").map(String::as_str), Some("Local"));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.cache.key_split, ":");
        assert!(config.servers.is_empty());
        assert!(config.routing.default_server.is_none());
    }

    #[test]
    fn test_rejects_duplicate_names_ignoring_case() {
        let message = invalid_message(
            r#"
[[servers]]
name = "cache"
server_type = "memory"

[[servers]]
name = "Cache"
server_type = "memory"
"#,
        );
        assert!(message.contains("Duplicate"));
    }

    #[test]
    fn test_rejects_unknown_route_target() {
        let message = invalid_message(
            r#"
[[servers]]
name = "local"
server_type = "memory"

[routing.objects]
orders = "remote"
"#,
        );
        assert!(message.contains("remote"));
    }

    #[test]
    fn test_rejects_bad_endpoints_and_timeouts() {
        invalid_message(
            r#"
[[servers]]
name = "primary"
server_type = "redis"
endpoints = [{ host = "", port = 6379 }]
"#,
        );
        invalid_message(
            r#"
[[servers]]
name = "primary"
server_type = "redis"
endpoints = [{ host = "localhost", port = 0 }]
"#,
        );
        invalid_message(
            r#"
[[servers]]
name = "primary"
server_type = "redis"
"#,
        );
        invalid_message(
            r#"
[[servers]]
name = "local"
server_type = "memory"
sync_timeout_ms = 0
"#,
        );
    }

    #[test]
    fn test_rejects_empty_splits_and_names() {
        invalid_message("[cache]\nkey_split = \"\"\n");
        invalid_message("[cache]\nname_value_split = \"\"\n");
        invalid_message("[[servers]]\nname = \" \"\nserver_type = \"memory\"\n");
    }

    #[test]
    fn test_unknown_server_type_is_a_parse_error() {
        let result =
            AppConfig::from_toml_str("[[servers]]\nname = \"x\"\nserver_type = \"memcached\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.servers.len(), 2);

        let missing = AppConfig::from_file(file.path().with_extension("absent"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
