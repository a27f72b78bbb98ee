//! Command dispatcher
//!
//! Every facade method funnels into `Dispatcher::execute`: resolve the server,
//! resolve its provider, apply the database policy, compose the keys, then
//! hand the command to the provider exactly once. The provider's response is
//! returned unmodified.
//!
//! Blocking entry points drive the same future on a process-wide runtime and
//! refuse to run from inside an async context.

use crate::command::CacheCommand;
use crate::errors::CacheError;
use crate::registry::CacheRegistry;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::runtime::{Builder, Handle, Runtime};

static BLOCKING_RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn blocking_runtime() -> Result<&'static Runtime, CacheError> {
    if let Some(runtime) = BLOCKING_RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("cachehaus-blocking")
        .enable_all()
        .build()?;
    // A concurrent caller may have won the race; its runtime is kept
    Ok(BLOCKING_RUNTIME.get_or_init(|| runtime))
}

/// Run a cache future to completion from synchronous code
pub(crate) fn block_on<T>(
    future: impl Future<Output = Result<T, CacheError>>,
) -> Result<T, CacheError> {
    if Handle::try_current().is_ok() {
        return Err(CacheError::BlockingInAsyncContext);
    }
    blocking_runtime()?.block_on(future)
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CacheRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CacheRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    pub async fn execute<C: CacheCommand>(&self, command: &C) -> Result<C::Response, CacheError> {
        let server = self.registry.get_cache_server(command)?;
        let provider = self.registry.get_cache_provider(server.server_type)?;
        self.registry.check_database(&server)?;

        let composer = self.registry.composer();
        trace_log!(
            "Dispatching {} to server '{}' via {}",
            command.operation(),
            server.name,
            provider.name()
        );
        if command.keys().into_iter().all(|key| key.bind(composer)) {
            return command.execute(provider.as_ref(), &server).await;
        }

        // Keys composed by another registry: work on fresh copies
        let command = command.clone();
        for key in command.keys() {
            key.bind(composer);
        }
        command.execute(provider.as_ref(), &server).await
    }

    pub fn execute_blocking<C: CacheCommand>(
        &self,
        command: &C,
    ) -> Result<C::Response, CacheError> {
        block_on(self.execute(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::string::{StringGetParams, StringSetParams};
    use crate::command::{CacheResponse, CommandDescriptor};
    use crate::errors::ErrorCode;
    use crate::keys::{CacheKey, CacheObject};
    use crate::server::{CacheServer, ServerType};

    fn dispatcher(registry: CacheRegistry) -> Dispatcher {
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_keys_are_composed_with_registry_prefixes() {
        let mut registry = CacheRegistry::new();
        registry
            .configure_global_prefix(Arc::new(|| vec!["app".to_string()]))
            .configure_in_memory_fallback(true);
        let dispatcher = dispatcher(registry);

        let key = CacheKey::for_object(CacheObject::new("users")).with_name_value("id", "1");
        let set = StringSetParams::single(key.clone(), "ada");
        assert!(dispatcher.execute(&set).await.unwrap().is_success());

        let scan = crate::command::server::GetKeysParams::new();
        let keys = dispatcher.execute(&scan).await.unwrap().keys;
        assert_eq!(keys, vec!["app:users:id:1".to_string()]);

        let get = StringGetParams::new(key);
        assert_eq!(dispatcher.execute(&get).await.unwrap().value(), "ada");
    }

    #[tokio::test]
    async fn test_same_key_through_two_registries_keeps_each_prefix() {
        let registry = |prefix: &'static str| {
            let mut registry = CacheRegistry::new();
            registry
                .configure_global_prefix(Arc::new(move || vec![prefix.to_string()]))
                .configure_in_memory_fallback(true);
            dispatcher(registry)
        };
        let first = registry("a");
        let second = registry("b");

        let key = CacheKey::new().with_name_value("user", "1");
        let set = StringSetParams::single(key.clone(), "x");
        let response = first.execute(&set).await.unwrap();
        assert_eq!(response.results[0].key, "a:user:1");
        let response = second.execute(&set).await.unwrap();
        assert_eq!(response.results[0].key, "b:user:1");

        let scan = crate::command::server::GetKeysParams::new();
        assert_eq!(second.execute(&scan).await.unwrap().keys, vec!["b:user:1".to_string()]);
        assert_eq!(first.execute(&scan).await.unwrap().keys, vec!["a:user:1".to_string()]);
    }

    #[tokio::test]
    async fn test_configuration_errors_are_raised() {
        let dispatcher = self::dispatcher(CacheRegistry::new());
        let params = StringGetParams::new(CacheKey::new().with_name("a"));
        assert!(matches!(
            dispatcher.execute(&params).await,
            Err(CacheError::ServerNotConfigured(_))
        ));

        let redis = CacheServer::new("remote", ServerType::Redis);
        let params = params.on_server(redis);
        assert!(matches!(
            dispatcher.execute(&params).await,
            Err(CacheError::ProviderNotConfigured(ServerType::Redis))
        ));
    }

    #[tokio::test]
    async fn test_blocking_refused_inside_runtime() {
        let dispatcher = dispatcher(CacheRegistry::new());
        let params =
            StringGetParams::new(CacheKey::new().with_name("a")).use_in_memory_for_default(true);
        assert!(matches!(
            dispatcher.execute_blocking(&params),
            Err(CacheError::BlockingInAsyncContext)
        ));
    }

    #[test]
    fn test_blocking_mirror_runs_outside_runtime() {
        let dispatcher = dispatcher(CacheRegistry::new());
        let params = StringGetParams::new(CacheKey::new().with_name("missing"))
            .use_in_memory_for_default(true);
        let response = dispatcher.execute_blocking(&params).unwrap();
        assert_eq!(response.code(), Some(ErrorCode::KeyNotExist));
    }
}
