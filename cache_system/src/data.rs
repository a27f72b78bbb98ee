//! Typed data helpers
//!
//! Thin wrappers over the string family for callers that cache whole
//! records. Payloads go through the registry's serializer; a value that
//! cannot be serialized, or renders to nothing, fails with
//! `ValuesIsNullOrEmpty` before any provider is contacted.

use crate::command::keys::{KeyExistParams, KeyExistResponse};
use crate::command::string::{StringGetParams, StringSetParams, StringSetResponse};
use crate::command::{CacheResponse, CacheStatus, CommandDescriptor, CommandOptions};
use crate::dispatcher::{Dispatcher, block_on};
use crate::entry::{CacheEntry, CacheExpiration};
use crate::errors::{CacheError, ErrorCode};
use crate::keys::CacheKey;
use crate::serializer;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Response of `get_data`
#[derive(Debug, Clone)]
pub struct DataResponse<T> {
    pub status: CacheStatus,
    pub data: Option<T>,
}

impl<T> Default for DataResponse<T> {
    fn default() -> Self {
        Self {
            status: CacheStatus::default(),
            data: None,
        }
    }
}

impl<T: Send + 'static> CacheResponse for DataResponse<T> {
    fn status(&self) -> &CacheStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut CacheStatus {
        &mut self.status
    }
}

impl<T> DataResponse<T> {
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl Dispatcher {
    /// Serialize `data` and store it under `key`
    pub async fn set_data<T: Serialize>(
        &self,
        key: CacheKey,
        data: &T,
        expiration: Option<CacheExpiration>,
        options: CommandOptions,
    ) -> Result<StringSetResponse, CacheError> {
        let payload = match serializer::serialize(self.registry().serializer(), data) {
            Ok(payload) if !payload.is_empty() => payload,
            Ok(_) => return Ok(StringSetResponse::failure(ErrorCode::ValuesIsNullOrEmpty)),
            Err(e) => {
                return Ok(StringSetResponse::failure_with(
                    ErrorCode::ValuesIsNullOrEmpty,
                    format!("cannot serialize value: {}", e),
                ));
            }
        };

        let mut entry = CacheEntry::new(key, payload);
        if let Some(expiration) = expiration {
            entry = entry.with_expiration(expiration);
        }
        let mut params = StringSetParams::new(vec![entry]);
        *params.options_mut() = options;
        self.execute(&params).await
    }

    /// Read and deserialize the value stored under `key`
    pub async fn get_data<T: DeserializeOwned + Send + 'static>(
        &self,
        key: CacheKey,
        options: CommandOptions,
    ) -> Result<DataResponse<T>, CacheError> {
        let mut params = StringGetParams::new(key);
        *params.options_mut() = options;
        let response = self.execute(&params).await?;
        if !response.is_success() {
            return Ok(DataResponse {
                status: response.status,
                data: None,
            });
        }

        match serializer::deserialize(self.registry().serializer(), response.value()) {
            Ok(data) => Ok(DataResponse {
                data: Some(data),
                ..DataResponse::success()
            }),
            Err(e) => Ok(DataResponse::failure_with(
                ErrorCode::ValuesIsNullOrEmpty,
                format!("cannot deserialize value: {}", e),
            )),
        }
    }

    /// Whether `key` holds a value
    pub async fn exists(
        &self,
        key: CacheKey,
        options: CommandOptions,
    ) -> Result<KeyExistResponse, CacheError> {
        let mut params = KeyExistParams::new(vec![key]);
        *params.options_mut() = options;
        self.execute(&params).await
    }

    pub fn set_data_blocking<T: Serialize>(
        &self,
        key: CacheKey,
        data: &T,
        expiration: Option<CacheExpiration>,
        options: CommandOptions,
    ) -> Result<StringSetResponse, CacheError> {
        block_on(self.set_data(key, data, expiration, options))
    }

    pub fn get_data_blocking<T: DeserializeOwned + Send + 'static>(
        &self,
        key: CacheKey,
        options: CommandOptions,
    ) -> Result<DataResponse<T>, CacheError> {
        block_on(self.get_data(key, options))
    }

    pub fn exists_blocking(
        &self,
        key: CacheKey,
        options: CommandOptions,
    ) -> Result<KeyExistResponse, CacheError> {
        block_on(self.exists(key, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CacheRegistry;
    use crate::serializer::DataSerializer;
    use serde::Deserialize;
    use serde_json::Value;
    use std::sync::Arc;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        hits: u32,
    }

    fn in_memory() -> CommandOptions {
        CommandOptions {
            use_in_memory_for_default: true,
            ..CommandOptions::default()
        }
    }

    /// Serializer that renders everything to nothing
    struct Blank;

    impl DataSerializer for Blank {
        fn name(&self) -> &'static str {
            "blank"
        }

        fn encode(&self, _value: &Value) -> Result<String, CacheError> {
            Ok(String::new())
        }

        fn decode(&self, _payload: &str) -> Result<Value, CacheError> {
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn test_set_then_get_data() {
        let dispatcher = Dispatcher::new(Arc::new(CacheRegistry::new()));
        let key = CacheKey::new().with_name_value("session", "abc");
        let session = Session {
            user: "ada".into(),
            hits: 3,
        };

        let stored = dispatcher.set_data(key.clone(), &session, None, in_memory()).await.unwrap();
        assert!(stored.is_success());
        assert!(dispatcher.exists(key.clone(), in_memory()).await.unwrap().count == 1);

        let loaded: DataResponse<Session> = dispatcher.get_data(key, in_memory()).await.unwrap();
        assert!(loaded.is_success());
        assert_eq!(loaded.into_data(), Some(session));
    }

    #[tokio::test]
    async fn test_missing_data_keeps_provider_status() {
        let dispatcher = Dispatcher::new(Arc::new(CacheRegistry::new()));
        let loaded: DataResponse<Session> = dispatcher
            .get_data(CacheKey::new().with_name("nothing"), in_memory())
            .await
            .unwrap();
        assert_eq!(loaded.code(), Some(ErrorCode::KeyNotExist));
        assert!(loaded.data.is_none());
    }

    #[tokio::test]
    async fn test_empty_payload_short_circuits() {
        let mut registry = CacheRegistry::new();
        registry.configure_serializer(Arc::new(Blank));
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let key = CacheKey::new().with_name("blank");

        // No server is configured, so reaching a provider would be an error
        let response = dispatcher
            .set_data(key, &1, None, CommandOptions::default())
            .await
            .unwrap();
        assert_eq!(response.code(), Some(ErrorCode::ValuesIsNullOrEmpty));
    }

    #[tokio::test]
    async fn test_undecodable_payload_fails_softly() {
        let dispatcher = Dispatcher::new(Arc::new(CacheRegistry::new()));
        let key = CacheKey::new().with_name("raw");
        let set = StringSetParams::single(key.clone(), "not json").use_in_memory_for_default(true);
        dispatcher.execute(&set).await.unwrap();

        let loaded: DataResponse<Session> = dispatcher.get_data(key, in_memory()).await.unwrap();
        assert_eq!(loaded.code(), Some(ErrorCode::ValuesIsNullOrEmpty));
    }
}
