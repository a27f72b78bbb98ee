//! Integration tests for the command layer against the in-memory provider
//!
//! Every test builds its own `CacheHaus`, so the in-memory keyspace starts
//! empty each time.

use std::time::Duration;

use cachehaus::prelude::*;

const CONFIG: &str = r#"
[cache]
global_prefixes = ["app"]

[[servers]]
name = "local"
server_type = "memory"
database = 0

[[servers]]
name = "sessions"
server_type = "memory"
database = 1

[routing]
default_server = "local"
[routing.objects]
sessions = "sessions"
"#;

fn cache() -> CacheHaus {
    CacheHaus::new(AppConfig::from_toml_str(CONFIG).unwrap()).unwrap()
}

fn user_key(id: &str) -> CacheKey {
    CacheKey::for_object(CacheObject::new("users")).with_name_value("id", id)
}

#[tokio::test]
async fn test_set_then_get_end_to_end() {
    let cache = cache();
    let dispatcher = cache.dispatcher();

    let set = StringSetParams::single(user_key("1"), "ada");
    let response = dispatcher.string().set(&set).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.results.len(), 1);
    assert!(response.results[0].stored);
    assert_eq!(response.results[0].key, "app:users:id:1");

    let get = StringGetParams::new(user_key("1"));
    let response = dispatcher.string().get(&get).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.value(), "ada");

    let keys = dispatcher.server().get_keys(&GetKeysParams::new()).await.unwrap();
    assert_eq!(keys.keys, vec!["app:users:id:1".to_string()]);
}

#[tokio::test]
async fn test_missing_key_reports_key_not_exist() {
    let cache = cache();
    let get = StringGetParams::new(user_key("404"));
    let response = cache.dispatcher().string().get(&get).await.unwrap();
    assert!(!response.is_success());
    assert_eq!(response.code(), Some(ErrorCode::KeyNotExist));
}

#[tokio::test]
async fn test_conditional_writes() {
    let cache = cache();
    let strings = cache.dispatcher().string();
    let key = user_key("cond");

    // IfExists on a missing key
    let entry = CacheEntry::new(key.clone(), "first").with_condition(SetCondition::IfExists);
    let response = strings.set(&StringSetParams::new(vec![entry])).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::KeyNotExist));
    assert!(!response.results[0].stored);

    // IfNotExists creates, then refuses
    let entry = CacheEntry::new(key.clone(), "first").with_condition(SetCondition::IfNotExists);
    assert!(strings.set(&StringSetParams::new(vec![entry])).await.unwrap().is_success());
    let entry = CacheEntry::new(key.clone(), "second").with_condition(SetCondition::IfNotExists);
    let response = strings.set(&StringSetParams::new(vec![entry])).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::NoResult));

    // Equal with a stale expectation leaves the value alone
    let entry =
        CacheEntry::new(key.clone(), "third").with_condition(SetCondition::Equal("stale".into()));
    let response = strings.set(&StringSetParams::new(vec![entry])).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::NoResult));
    let current = strings.get(&StringGetParams::new(key.clone())).await.unwrap();
    assert_eq!(current.value(), "first");

    let entry =
        CacheEntry::new(key.clone(), "third").with_condition(SetCondition::Equal("first".into()));
    assert!(strings.set(&StringSetParams::new(vec![entry])).await.unwrap().is_success());

    let entry = CacheEntry::new(key.clone(), "fourth")
        .with_condition(SetCondition::NotEqual("third".into()));
    let response = strings.set(&StringSetParams::new(vec![entry])).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::NoResult));

    let current = strings.get(&StringGetParams::new(key)).await.unwrap();
    assert_eq!(current.value(), "third");
}

#[tokio::test]
async fn test_numeric_edge_cases() {
    let cache = cache();
    let strings = cache.dispatcher().string();
    let counter = user_key("counter");

    let response = strings
        .increment(&StringIncrementParams::new(counter.clone(), 5))
        .await
        .unwrap();
    assert_eq!(response.new_value, CacheNumber::Integer(5));

    let response = strings
        .decrement(&StringDecrementParams::new(counter.clone(), 7))
        .await
        .unwrap();
    assert_eq!(response.new_value, CacheNumber::Integer(-2));

    let response = strings
        .increment(&StringIncrementParams::new(counter.clone(), 0.5))
        .await
        .unwrap();
    assert_eq!(response.new_value, CacheNumber::Float(-1.5));

    // Overflow fails without touching the stored value
    let big = user_key("big");
    strings.set(&StringSetParams::single(big.clone(), i64::MAX.to_string())).await.unwrap();
    let response = strings.increment(&StringIncrementParams::new(big.clone(), 1)).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::ValueCannotBeCalculated));
    let current = strings.get(&StringGetParams::new(big)).await.unwrap();
    assert_eq!(current.value(), i64::MAX.to_string());

    let text = user_key("text");
    strings.set(&StringSetParams::single(text.clone(), "abc")).await.unwrap();
    let response = strings.increment(&StringIncrementParams::new(text, 1)).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::ValueCannotBeCalculated));
}

#[tokio::test]
async fn test_wrong_type_is_reported() {
    let cache = cache();
    let dispatcher = cache.dispatcher();
    let key = user_key("list");

    let push = ListRightPushParams::new(key.clone(), vec!["a".into()]);
    dispatcher.list().right_push(&push).await.unwrap();

    let response = dispatcher.string().get(&StringGetParams::new(key)).await.unwrap();
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_negative_list_ranges() {
    let cache = cache();
    let lists = cache.dispatcher().list();
    let key = user_key("queue");

    let values = ["a", "b", "c", "d"].iter().map(|v| v.to_string()).collect();
    let pushed = lists.right_push(&ListRightPushParams::new(key.clone(), values)).await.unwrap();
    assert_eq!(pushed.new_length, 4);

    let tail = lists.range(&ListRangeParams::new(key.clone(), -2, -1)).await.unwrap();
    assert_eq!(tail.values, vec!["c", "d"]);

    let all = lists.range(&ListRangeParams::new(key.clone(), 0, -1)).await.unwrap();
    assert_eq!(all.values, vec!["a", "b", "c", "d"]);

    let clamped = lists.range(&ListRangeParams::new(key.clone(), -100, 1)).await.unwrap();
    assert_eq!(clamped.values, vec!["a", "b"]);

    let past_end = lists.range(&ListRangeParams::new(key.clone(), 5, 10)).await.unwrap();
    assert!(past_end.is_success());
    assert!(past_end.values.is_empty());

    let inverted = lists.range(&ListRangeParams::new(key, 3, 1)).await.unwrap();
    assert!(inverted.values.is_empty());
}

#[tokio::test]
async fn test_sorted_set_ranges() {
    let cache = cache();
    let sorted = cache.dispatcher().sorted_set();
    let key = user_key("scores");

    let members = vec![
        SortedSetMember::new("ada", 3.0),
        SortedSetMember::new("bob", 1.0),
        SortedSetMember::new("cy", 2.0),
    ];
    let added = sorted.add(&SortedSetAddParams::new(key.clone(), members)).await.unwrap();
    assert_eq!(added.added, 3);

    let by_rank = sorted
        .range_by_rank(&SortedSetRangeByRankParams::new(key.clone(), 0, -1))
        .await
        .unwrap();
    let names: Vec<&str> = by_rank.members.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(names, vec!["bob", "cy", "ada"]);

    let by_score = sorted
        .range_by_score(&SortedSetRangeByScoreParams::new(
            key.clone(),
            ScoreBound::Exclusive(1.0),
            ScoreBound::positive_infinity(),
        ))
        .await
        .unwrap();
    let names: Vec<&str> = by_score.members.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(names, vec!["cy", "ada"]);

    let reversed = sorted
        .range_by_rank(
            &SortedSetRangeByRankParams::new(key, -2, -1).with_order(SortOrder::Descending),
        )
        .await
        .unwrap();
    let names: Vec<&str> = reversed.members.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(names, vec!["cy", "bob"]);
}

#[tokio::test]
async fn test_relative_expiration_elapses() {
    let cache = cache();
    let dispatcher = cache.dispatcher();
    let key = user_key("ephemeral");

    let entry = CacheEntry::new(key.clone(), "soon gone")
        .with_expiration(CacheExpiration::relative(Duration::from_millis(50)));
    dispatcher.string().set(&StringSetParams::new(vec![entry])).await.unwrap();

    let ttl = dispatcher
        .keys()
        .time_to_live(&KeyTimeToLiveParams::new(key.clone()))
        .await
        .unwrap();
    assert!(ttl.time_to_live.is_some());

    tokio::time::sleep(Duration::from_millis(120)).await;

    let response = dispatcher.string().get(&StringGetParams::new(key.clone())).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::KeyNotExist));
    let exists = dispatcher.keys().exist(&KeyExistParams::new(vec![key])).await.unwrap();
    assert_eq!(exists.count, 0);
}

#[tokio::test]
async fn test_objects_route_to_their_server() {
    let cache = cache();
    let dispatcher = cache.dispatcher();

    let session = CacheKey::for_object(CacheObject::new("sessions")).with_name("abc");
    dispatcher
        .string()
        .set(&StringSetParams::single(session.clone(), "token"))
        .await
        .unwrap();

    // The default server does not see keys routed elsewhere
    let local = cache.server("local").unwrap().clone();
    let keys = dispatcher
        .server()
        .get_keys(&GetKeysParams::new().on_server(local))
        .await
        .unwrap();
    assert!(keys.keys.is_empty());

    let sessions = cache.server("sessions").unwrap().clone();
    let keys = dispatcher
        .server()
        .get_keys(&GetKeysParams::new().on_server(sessions))
        .await
        .unwrap();
    assert_eq!(keys.keys, vec!["app:sessions:abc".to_string()]);
}

#[tokio::test]
async fn test_unrouted_commands_need_a_fallback() {
    let config = AppConfig::from_toml_str(
        r#"
[[servers]]
name = "local"
server_type = "memory"

[routing.objects]
users = "local"
"#,
    )
    .unwrap();
    let cache = CacheHaus::new(config).unwrap();
    let strings = cache.dispatcher().string();

    let routed = StringGetParams::new(user_key("1"));
    assert!(strings.get(&routed).await.is_ok());

    let unrouted = StringGetParams::new(CacheKey::new().with_name("orphan"));
    let error = strings.get(&unrouted).await.unwrap_err();
    assert!(matches!(error, CacheError::ServerNotConfigured(_)));
    assert_eq!(error.code(), Some(ErrorCode::ServerNotConfigured));

    let fallback =
        StringGetParams::new(CacheKey::new().with_name("orphan")).use_in_memory_for_default(true);
    let response = strings.get(&fallback).await.unwrap();
    assert_eq!(response.code(), Some(ErrorCode::KeyNotExist));
}

#[tokio::test]
async fn test_missing_database_policy() {
    let config = AppConfig::from_toml_str(
        r#"
[cache]
throw_on_missing_database = true

[[servers]]
name = "nodb"
server_type = "memory"

[routing]
default_server = "nodb"
"#,
    )
    .unwrap();
    let cache = CacheHaus::new(config).unwrap();
    let error = cache
        .dispatcher()
        .string()
        .get(&StringGetParams::new(user_key("1")))
        .await
        .unwrap_err();
    assert!(matches!(error, CacheError::DatabaseNotConfigured(name) if name == "nodb"));
}

#[test]
fn test_key_composition_is_deterministic() {
    let cache = cache();
    let composer = cache.dispatcher().registry().composer();

    let first = user_key("7");
    let second = user_key("7");
    assert_eq!(first.actual_key(composer), second.actual_key(composer));
    assert_eq!(first, second);

    let mut grown = user_key("7");
    assert_eq!(grown.actual_key(composer), "app:users:id:7");
    grown.add_name("profile");
    assert_eq!(grown.actual_key(composer), "app:users:id:7:profile");

    let parsed = composer.parse("app:users:id:7");
    assert_eq!(parsed.actual_key(composer), "app:users:id:7");

    let constant = CacheKey::constant("raw-key");
    assert_eq!(constant.actual_key(composer), "raw-key");
}

#[test]
fn test_blocking_mirror() {
    let cache = cache();
    let strings = cache.dispatcher().string();
    let key = user_key("blocking");

    let response = strings
        .set_blocking(&StringSetParams::single(key.clone(), "sync"))
        .unwrap();
    assert!(response.is_success());

    let response = strings.get_blocking(&StringGetParams::new(key.clone())).unwrap();
    assert_eq!(response.value(), "sync");

    let length = strings.length_blocking(&StringLengthParams::new(key)).unwrap();
    assert_eq!(length.length, 4);
}

#[tokio::test]
async fn test_blocking_mirror_refused_inside_runtime() {
    let cache = cache();
    let result = cache
        .dispatcher()
        .string()
        .get_blocking(&StringGetParams::new(user_key("1")));
    assert!(matches!(result, Err(CacheError::BlockingInAsyncContext)));
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    roles: Vec<String>,
}

#[tokio::test]
async fn test_data_helpers() {
    let cache = cache();
    let dispatcher = cache.dispatcher();
    let key = user_key("profile");
    let profile = Profile {
        name: "Ada".into(),
        roles: vec!["admin".into()],
    };

    let stored = dispatcher
        .set_data(key.clone(), &profile, None, CommandOptions::default())
        .await
        .unwrap();
    assert!(stored.is_success());

    let exists = dispatcher.exists(key.clone(), CommandOptions::default()).await.unwrap();
    assert_eq!(exists.count, 1);

    let loaded: DataResponse<Profile> = dispatcher
        .get_data(key.clone(), CommandOptions::default())
        .await
        .unwrap();
    assert_eq!(loaded.into_data(), Some(profile));

    let raw = dispatcher.string().get(&StringGetParams::new(key)).await.unwrap();
    assert_eq!(raw.value(), r#"{"name":"Ada","roles":["admin"]}"#);
}

#[test]
fn test_data_helpers_blocking() {
    let cache = cache();
    let dispatcher = cache.dispatcher();
    let key = user_key("blocking-profile");
    let profile = Profile {
        name: "Bob".into(),
        roles: Vec::new(),
    };

    dispatcher
        .set_data_blocking(key.clone(), &profile, None, CommandOptions::default())
        .unwrap();
    let loaded: DataResponse<Profile> = dispatcher
        .get_data_blocking(key.clone(), CommandOptions::default())
        .unwrap();
    assert_eq!(loaded.into_data(), Some(profile));
    assert_eq!(
        dispatcher.exists_blocking(key, CommandOptions::default()).unwrap().count,
        1
    );
}

#[test]
fn test_load_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    let config = AppConfig::from_file(file.path()).unwrap();
    let cache = CacheHaus::new(config).unwrap();
    assert_eq!(cache.list_servers(), vec!["local", "sessions"]);
}
