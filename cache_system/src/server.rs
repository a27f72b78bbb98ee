//! Cache server records
//!
//! A `CacheServer` identifies one physical backend. Servers are registered at
//! startup and never change afterwards, so they are shared by clone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Name of the fallback server that always exists
pub const DEFAULT_IN_MEMORY_SERVER: &str = "default-in-memory";

/// Backend family a server belongs to; selects the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerType {
    InMemory,
    Redis,
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerType::InMemory => write!(f, "in-memory"),
            ServerType::Redis => write!(f, "redis"),
        }
    }
}

impl From<config::ServerKind> for ServerType {
    fn from(kind: config::ServerKind) -> Self {
        match kind {
            config::ServerKind::Memory => ServerType::InMemory,
            config::ServerKind::Redis => ServerType::Redis,
        }
    }
}

/// Network endpoint of a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEndpoint {
    pub host: String,
    pub port: u16,
}

impl CacheEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for CacheEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Physical cache server. Equality is by name only, ignoring case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheServer {
    pub name: String,
    pub server_type: ServerType,
    pub endpoints: Vec<CacheEndpoint>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Database index; `None` means the provider default
    pub database: Option<u32>,
    pub ssl: bool,
    pub client_name: Option<String>,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Command timeout in milliseconds
    pub sync_timeout_ms: u64,
    /// Allow administrative commands (flush, shutdown, config)
    pub allow_admin: bool,
}

impl CacheServer {
    pub fn new(name: impl Into<String>, server_type: ServerType) -> Self {
        Self {
            name: name.into(),
            server_type,
            endpoints: Vec::new(),
            username: None,
            password: None,
            database: None,
            ssl: false,
            client_name: None,
            connect_timeout_ms: 5000,
            sync_timeout_ms: 5000,
            allow_admin: false,
        }
    }

    /// The process-local fallback server
    pub fn default_in_memory() -> Self {
        let mut server = Self::new(DEFAULT_IN_MEMORY_SERVER, ServerType::InMemory);
        server.database = Some(0);
        server.allow_admin = true;
        server
    }

    pub fn with_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.endpoints.push(CacheEndpoint::new(host, port));
        self
    }

    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    pub fn with_database(mut self, database: u32) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    pub fn with_sync_timeout(mut self, timeout_ms: u64) -> Self {
        self.sync_timeout_ms = timeout_ms;
        self
    }

    pub fn with_allow_admin(mut self, allow_admin: bool) -> Self {
        self.allow_admin = allow_admin;
        self
    }

    /// Connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Command timeout as Duration
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }

    /// Database index with the provider default applied
    pub fn database_or_default(&self) -> u32 {
        self.database.unwrap_or(0)
    }

    /// Lowercased name, the identity used for equality and lookups
    pub fn identity(&self) -> String {
        self.name.to_lowercase()
    }
}

impl PartialEq for CacheServer {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for CacheServer {}

impl Hash for CacheServer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl From<&config::ServerConfig> for CacheServer {
    fn from(config: &config::ServerConfig) -> Self {
        Self {
            name: config.name.clone(),
            server_type: config.server_type.into(),
            endpoints: config
                .endpoints
                .iter()
                .map(|e| CacheEndpoint::new(e.host.clone(), e.port))
                .collect(),
            username: config.username.clone(),
            password: config.password.clone(),
            database: config.database,
            ssl: config.ssl,
            client_name: config.client_name.clone(),
            connect_timeout_ms: config.connect_timeout_ms,
            sync_timeout_ms: config.sync_timeout_ms,
            allow_admin: config.allow_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_configuration_drift() {
        let a = CacheServer::new("Primary", ServerType::Redis).with_endpoint("10.0.0.1", 6379);
        let b = CacheServer::new("primary", ServerType::InMemory).with_database(3);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_default_in_memory_server() {
        let server = CacheServer::default_in_memory();
        assert_eq!(server.server_type, ServerType::InMemory);
        assert_eq!(server.database, Some(0));
        assert_eq!(server.name, DEFAULT_IN_MEMORY_SERVER);
    }
}
