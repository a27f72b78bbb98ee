//! Integration tests against a live Redis server
//!
//! These run only when `REDIS_URL` is set (for example
//! `REDIS_URL=redis://127.0.0.1:6379/15`). Each test works under its own key
//! prefix and deletes what it wrote.

use std::time::Duration;

use cachehaus::prelude::*;
use chrono::Utc;

/// Host, port and database from a `redis://host:port/db` url
fn redis_target() -> Option<(String, u16, u32)> {
    let url = std::env::var("REDIS_URL").ok()?;
    let rest = url.strip_prefix("redis://")?;
    let (authority, database) = match rest.split_once('/') {
        Some((authority, db)) if !db.is_empty() => (authority, db.parse().ok()?),
        Some((authority, _)) => (authority, 0),
        None => (rest, 0),
    };
    let authority = authority.rsplit('@').next()?;
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse().ok()?),
        None => (authority.to_string(), 6379),
    };
    Some((host, port, database))
}

fn cache() -> Option<CacheHaus> {
    let (host, port, database) = redis_target()?;
    let toml = format!(
        r#"
[cache]
global_prefixes = ["cachehaus-test-{}"]

[[servers]]
name = "redis"
server_type = "redis"
endpoints = [{{ host = "{}", port = {} }}]
database = {}

[routing]
default_server = "redis"
"#,
        Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        host,
        port,
        database
    );
    Some(CacheHaus::new(AppConfig::from_toml_str(&toml).unwrap()).unwrap())
}

async fn cleanup(cache: &CacheHaus, keys: Vec<CacheKey>) {
    cache.dispatcher().keys().delete(&KeyDeleteParams::new(keys)).await.unwrap();
}

#[tokio::test]
async fn test_redis_set_get_and_conditions() {
    let Some(cache) = cache() else {
        return;
    };
    let strings = cache.dispatcher().string();
    let key = CacheKey::new().with_name_value("user", "1");

    let response = strings.set(&StringSetParams::single(key.clone(), "ada")).await.unwrap();
    assert!(response.is_success());
    assert_eq!(strings.get(&StringGetParams::new(key.clone())).await.unwrap().value(), "ada");

    let entry = CacheEntry::new(key.clone(), "bob").with_condition(SetCondition::IfNotExists);
    let response = strings.set(&StringSetParams::new(vec![entry])).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::NoResult));

    let entry =
        CacheEntry::new(key.clone(), "cy").with_condition(SetCondition::Equal("ada".into()));
    assert!(strings.set(&StringSetParams::new(vec![entry])).await.unwrap().is_success());

    let entry =
        CacheEntry::new(key.clone(), "dee").with_condition(SetCondition::Equal("ada".into()));
    let response = strings.set(&StringSetParams::new(vec![entry])).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::NoResult));
    assert_eq!(strings.get(&StringGetParams::new(key.clone())).await.unwrap().value(), "cy");

    let missing = CacheKey::new().with_name_value("user", "missing");
    let entry = CacheEntry::new(missing.clone(), "x").with_condition(SetCondition::IfExists);
    let response = strings.set(&StringSetParams::new(vec![entry])).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::KeyNotExist));

    cleanup(&cache, vec![key, missing]).await;
}

#[tokio::test]
async fn test_redis_numbers_and_wrong_type() {
    let Some(cache) = cache() else {
        return;
    };
    let dispatcher = cache.dispatcher();
    let counter = CacheKey::new().with_name("counter");
    let list = CacheKey::new().with_name("list");

    let response = dispatcher
        .string()
        .increment(&StringIncrementParams::new(counter.clone(), 10))
        .await
        .unwrap();
    assert_eq!(response.new_value, CacheNumber::Integer(10));

    let response = dispatcher
        .string()
        .increment(&StringIncrementParams::new(counter.clone(), 0.5))
        .await
        .unwrap();
    assert_eq!(response.new_value, CacheNumber::Float(10.5));

    dispatcher
        .list()
        .right_push(&ListRightPushParams::new(list.clone(), vec!["a".into()]))
        .await
        .unwrap();
    let response = dispatcher
        .string()
        .increment(&StringIncrementParams::new(list.clone(), 1))
        .await
        .unwrap();
    assert_eq!(response.code(), Some(ErrorCode::ValueIsNotString));

    cleanup(&cache, vec![counter, list]).await;
}

#[tokio::test]
async fn test_redis_list_ranges_and_expiration() {
    let Some(cache) = cache() else {
        return;
    };
    let dispatcher = cache.dispatcher();
    let key = CacheKey::new().with_name("queue");

    let values = ["a", "b", "c", "d"].iter().map(|v| v.to_string()).collect();
    let push = ListRightPushParams::new(key.clone(), values)
        .with_expiration(CacheExpiration::relative(Duration::from_secs(30)));
    assert_eq!(dispatcher.list().right_push(&push).await.unwrap().new_length, 4);

    let tail = dispatcher.list().range(&ListRangeParams::new(key.clone(), -2, -1)).await.unwrap();
    assert_eq!(tail.values, vec!["c", "d"]);

    let ttl = dispatcher
        .keys()
        .time_to_live(&KeyTimeToLiveParams::new(key.clone()))
        .await
        .unwrap();
    let remaining = ttl.time_to_live.unwrap();
    assert!(remaining <= Duration::from_secs(30));
    assert!(remaining > Duration::from_secs(20));

    assert_eq!(
        dispatcher.keys().key_type(&KeyTypeParams::new(key.clone())).await.unwrap().value_type,
        Some(CacheValueType::List)
    );

    cleanup(&cache, vec![key]).await;
}

#[tokio::test]
async fn test_redis_data_helpers() {
    let Some(cache) = cache() else {
        return;
    };
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Order {
        id: u64,
        total: f64,
    }

    let dispatcher = cache.dispatcher();
    let key = CacheKey::for_object(CacheObject::new("orders")).with_name_value("id", "9");
    let order = Order { id: 9, total: 12.5 };

    dispatcher
        .set_data(key.clone(), &order, None, CommandOptions::default())
        .await
        .unwrap();
    let loaded: DataResponse<Order> = dispatcher
        .get_data(key.clone(), CommandOptions::default())
        .await
        .unwrap();
    assert_eq!(loaded.into_data(), Some(order));

    cleanup(&cache, vec![key]).await;
}

#[tokio::test]
async fn test_redis_health_check() {
    let Some(cache) = cache() else {
        return;
    };
    cache.health_check("redis").await.unwrap();
}
