use super::keyspace::Keyspace;
use super::pattern;
use crate::command::CacheResponse;
use crate::command::hash::*;
use crate::errors::ErrorCode;
use crate::values::CacheNumber;
use chrono::{DateTime, Utc};

pub(super) fn delete(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashDeleteParams,
) -> HashDeleteResponse {
    let key = key_or_fail!(&params.key);
    let deleted = match value_or_fail!(space.hash(&key, now)) {
        Some(hash) => params
            .fields
            .iter()
            .filter(|field| hash.remove(field.as_str()).is_some())
            .count() as i64,
        None => 0,
    };
    space.remove_if_empty(&key);
    HashDeleteResponse {
        deleted,
        ..HashDeleteResponse::success()
    }
}

pub(super) fn exist(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashExistParams,
) -> HashExistResponse {
    let key = key_or_fail!(&params.key);
    let exists =
        value_or_fail!(space.hash(&key, now)).is_some_and(|hash| hash.contains_key(&params.field));
    HashExistResponse {
        exists,
        ..HashExistResponse::success()
    }
}

pub(super) fn get(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashGetParams,
) -> HashGetResponse {
    let key = key_or_fail!(&params.key);
    let value =
        value_or_fail!(space.hash(&key, now)).and_then(|hash| hash.get(&params.field).cloned());
    HashGetResponse {
        value,
        ..HashGetResponse::success()
    }
}

pub(super) fn get_all(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashGetAllParams,
) -> HashGetAllResponse {
    let key = key_or_fail!(&params.key);
    let values = value_or_fail!(space.hash(&key, now))
        .map(|hash| hash.clone())
        .unwrap_or_default();
    HashGetAllResponse {
        values,
        ..HashGetAllResponse::success()
    }
}

fn add_to_field(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    key: &str,
    field: &str,
    delta: CacheNumber,
) -> Result<CacheNumber, ErrorCode> {
    let hash = space.hash_or_create(key, now)?;
    let current = match hash.get(field) {
        None => CacheNumber::Integer(0),
        Some(text) => CacheNumber::parse(text).ok_or(ErrorCode::ValueCannotBeCalculated)?,
    };
    let result = current
        .checked_add(delta)
        .ok_or(ErrorCode::ValueCannotBeCalculated)?;
    hash.insert(field.to_string(), result.to_string());
    Ok(result)
}

pub(super) fn increment(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashIncrementParams,
) -> HashIncrementResponse {
    let key = key_or_fail!(&params.key);
    let outcome = add_to_field(space, now, &key, &params.field, params.value);
    // A failed first increment must not leave an empty hash behind
    space.remove_if_empty(&key);
    let new_value = value_or_fail!(outcome);
    space.set_expiration(&key, params.expiration.as_ref(), now);
    HashIncrementResponse {
        new_value,
        ..HashIncrementResponse::success()
    }
}

pub(super) fn decrement(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashDecrementParams,
) -> HashDecrementResponse {
    let key = key_or_fail!(&params.key);
    let Some(delta) = params.value.checked_neg() else {
        return HashDecrementResponse::failure(ErrorCode::ValueCannotBeCalculated);
    };
    let outcome = add_to_field(space, now, &key, &params.field, delta);
    space.remove_if_empty(&key);
    let new_value = value_or_fail!(outcome);
    space.set_expiration(&key, params.expiration.as_ref(), now);
    HashDecrementResponse {
        new_value,
        ..HashDecrementResponse::success()
    }
}

pub(super) fn keys(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashKeysParams,
) -> HashKeysResponse {
    let key = key_or_fail!(&params.key);
    let mut fields: Vec<String> = value_or_fail!(space.hash(&key, now))
        .map(|hash| hash.keys().cloned().collect())
        .unwrap_or_default();
    fields.sort();
    HashKeysResponse {
        fields,
        ..HashKeysResponse::success()
    }
}

pub(super) fn length(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashLengthParams,
) -> HashLengthResponse {
    let key = key_or_fail!(&params.key);
    let length = value_or_fail!(space.hash(&key, now)).map_or(0, |hash| hash.len() as i64);
    HashLengthResponse {
        length,
        ..HashLengthResponse::success()
    }
}

pub(super) fn set(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashSetParams,
) -> HashSetResponse {
    let key = key_or_fail!(&params.key);
    if params.items.is_empty() {
        return HashSetResponse::failure(ErrorCode::ValuesIsNullOrEmpty);
    }
    let hash = value_or_fail!(space.hash_or_create(&key, now));
    hash.extend(params.items.iter().map(|(f, v)| (f.clone(), v.clone())));
    space.set_expiration(&key, params.expiration.as_ref(), now);
    HashSetResponse::success()
}

pub(super) fn values(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashValuesParams,
) -> HashValuesResponse {
    let key = key_or_fail!(&params.key);
    let values = value_or_fail!(space.hash(&key, now))
        .map(|hash| {
            let mut fields: Vec<(&String, &String)> = hash.iter().collect();
            fields.sort();
            fields.into_iter().map(|(_, v)| v.clone()).collect::<Vec<_>>()
        })
        .unwrap_or_default();
    HashValuesResponse {
        values,
        ..HashValuesResponse::success()
    }
}

pub(super) fn scan(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &HashScanParams,
) -> HashScanResponse {
    let key = key_or_fail!(&params.key);
    let mut fields: Vec<(String, String)> = value_or_fail!(space.hash(&key, now))
        .map(|hash| hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
        .unwrap_or_default();
    fields.sort();
    let (cursor, page) = pattern::scan_page(
        &fields,
        |(field, _)| field.as_str(),
        params.pattern.as_deref(),
        params.cursor,
        params.page_size,
    );
    HashScanResponse {
        cursor,
        values: page.into_iter().collect(),
        ..HashScanResponse::success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::CacheKey;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn key() -> CacheKey {
        CacheKey::constant("h")
    }

    fn hash_space(fields: &[(&str, &str)]) -> Keyspace {
        let mut space = Keyspace::default();
        let items: HashMap<String, String> = fields
            .iter()
            .map(|(f, v)| (f.to_string(), v.to_string()))
            .collect();
        assert!(set(&mut space, now(), &HashSetParams::new(key(), items)).is_success());
        space
    }

    #[test]
    fn test_increment_creates_and_accumulates() {
        let mut space = Keyspace::default();
        let response = increment(&mut space, now(), &HashIncrementParams::new(key(), "hits", 5));
        assert_eq!(response.new_value, CacheNumber::Integer(5));

        let response = increment(&mut space, now(), &HashIncrementParams::new(key(), "hits", 1.5));
        assert_eq!(response.new_value, CacheNumber::Float(6.5));

        let response = decrement(&mut space, now(), &HashDecrementParams::new(key(), "hits", 0.5));
        assert_eq!(response.new_value, CacheNumber::Float(6.0));
    }

    #[test]
    fn test_increment_of_text_field_leaves_value() {
        let mut space = hash_space(&[("name", "ada")]);
        let response = increment(&mut space, now(), &HashIncrementParams::new(key(), "name", 1));
        assert_eq!(response.code(), Some(ErrorCode::ValueCannotBeCalculated));

        let stored = get(&mut space, now(), &HashGetParams::new(key(), "name"));
        assert_eq!(stored.value.as_deref(), Some("ada"));
    }

    #[test]
    fn test_failed_first_increment_leaves_no_key() {
        let mut space = Keyspace::default();
        let response =
            increment(&mut space, now(), &HashIncrementParams::new(key(), "n", f64::INFINITY));
        assert_eq!(response.code(), Some(ErrorCode::ValueCannotBeCalculated));
        assert!(!space.contains("h", now()));
    }

    #[test]
    fn test_increment_on_other_type_fails() {
        let mut space = Keyspace::default();
        space.list_or_create("h", now()).unwrap().push_back("a".into());
        let response = increment(&mut space, now(), &HashIncrementParams::new(key(), "n", 1));
        assert_eq!(response.code(), Some(ErrorCode::ValueIsNotHash));
    }

    #[test]
    fn test_delete_drops_empty_hash() {
        let mut space = hash_space(&[("a", "1"), ("b", "2")]);
        let params = HashDeleteParams::new(key(), vec!["a".into(), "b".into(), "zz".into()]);
        assert_eq!(delete(&mut space, now(), &params).deleted, 2);
        assert!(!space.contains("h", now()));
    }

    #[test]
    fn test_scan_pages_through_sorted_fields() {
        let mut space =
            hash_space(&[("user:1", "a"), ("user:2", "b"), ("order:1", "c"), ("user:3", "d")]);

        let first = scan(&mut space, now(), &HashScanParams::new(key()).with_page_size(2));
        assert_eq!(first.cursor, 2);
        assert_eq!(first.values.len(), 2);
        assert!(first.values.contains_key("order:1"));

        let rest = scan(
            &mut space,
            now(),
            &HashScanParams::new(key()).with_cursor(first.cursor).with_page_size(2),
        );
        assert_eq!(rest.cursor, 0);
        assert_eq!(rest.values.len(), 2);

        let matching = scan(
            &mut space,
            now(),
            &HashScanParams::new(key()).with_pattern("user:*").with_page_size(10),
        );
        let mut fields: Vec<&String> = matching.values.keys().collect();
        fields.sort();
        assert_eq!(fields, vec!["user:1", "user:2", "user:3"]);
        assert_eq!(matching.cursor, 0);
    }

    #[test]
    fn test_values_follow_field_order() {
        let mut space = hash_space(&[("b", "2"), ("a", "1")]);
        assert_eq!(values(&mut space, now(), &HashValuesParams::new(key())).values, vec!["1", "2"]);
        assert_eq!(keys(&mut space, now(), &HashKeysParams::new(key())).fields, vec!["a", "b"]);
    }
}
