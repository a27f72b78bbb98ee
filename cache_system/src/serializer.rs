//! Payload serialization for the data helpers
//!
//! `DataSerializer` is object safe so the registry can hold any
//! implementation; typed values cross it as `serde_json::Value`.

use crate::errors::CacheError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub trait DataSerializer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Render a value as the string payload stored in the cache
    fn encode(&self, value: &Value) -> Result<String, CacheError>;

    /// Parse a stored payload back into a value
    fn decode(&self, payload: &str) -> Result<Value, CacheError>;
}

/// Plain JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl DataSerializer for JsonSerializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<String, CacheError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, payload: &str) -> Result<Value, CacheError> {
        Ok(serde_json::from_str(payload)?)
    }
}

pub fn serialize<T: Serialize>(
    serializer: &dyn DataSerializer,
    data: &T,
) -> Result<String, CacheError> {
    serializer.encode(&serde_json::to_value(data)?)
}

pub fn deserialize<T: DeserializeOwned>(
    serializer: &dyn DataSerializer,
    payload: &str,
) -> Result<T, CacheError> {
    Ok(serde_json::from_value(serializer.decode(payload)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: u64,
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn test_json_payload() {
        let profile = Profile {
            id: 7,
            name: "Ada".into(),
            tags: vec!["admin".into()],
        };
        let payload = serialize(&JsonSerializer, &profile).unwrap();
        assert_eq!(payload, r#"{"id":7,"name":"Ada","tags":["admin"]}"#);

        let back: Profile = deserialize(&JsonSerializer, &payload).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_invalid_payload_is_an_error() {
        let result: Result<Profile, _> = deserialize(&JsonSerializer, "{not json");
        assert!(matches!(result, Err(CacheError::SerializationError(_))));

        let result: Result<Profile, _> = deserialize(&JsonSerializer, r#"{"id":"x"}"#);
        assert!(result.is_err());
    }
}
