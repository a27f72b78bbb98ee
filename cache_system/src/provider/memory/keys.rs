use super::DatabaseId;
use super::keyspace::{Expiry, Keyspace, StoredValue, TypedValue};
use super::pattern;
use crate::command::CacheResponse;
use crate::command::keys::*;
use crate::entry::SetCondition;
use crate::errors::{CacheError, ErrorCode};
use crate::keys::CacheKey;
use crate::server::CacheServer;
use crate::values::SortOrder;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

pub(super) fn delete(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyDeleteParams,
) -> KeyDeleteResponse {
    if params.keys.is_empty() {
        return KeyDeleteResponse::failure(ErrorCode::KeyIsNullOrEmpty);
    }
    let mut deleted = 0;
    for key in &params.keys {
        let key = key_or_fail!(key);
        if space.remove(&key, now).is_some() {
            deleted += 1;
        }
    }
    KeyDeleteResponse {
        deleted,
        ..KeyDeleteResponse::success()
    }
}

pub(super) fn dump(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyDumpParams,
) -> Result<KeyDumpResponse, CacheError> {
    let key = key_or_fail!(&params.key, Ok);
    let Some(stored) = space.get_mut(&key, now) else {
        return Ok(KeyDumpResponse::failure(ErrorCode::KeyNotExist));
    };
    Ok(KeyDumpResponse {
        value: serde_json::to_vec(&stored.value)?,
        ..KeyDumpResponse::success()
    })
}

pub(super) fn exist(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyExistParams,
) -> KeyExistResponse {
    if params.keys.is_empty() {
        return KeyExistResponse::failure(ErrorCode::KeyIsNullOrEmpty);
    }
    let mut count = 0;
    for key in &params.keys {
        let key = key_or_fail!(key);
        if space.contains(&key, now) {
            count += 1;
        }
    }
    KeyExistResponse {
        count,
        ..KeyExistResponse::success()
    }
}

pub(super) fn expire(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyExpireParams,
) -> KeyExpireResponse {
    let key = key_or_fail!(&params.key);
    match space.get_mut(&key, now) {
        Some(stored) => {
            stored.expiry = Expiry::from_policy(&params.expiration, now);
            KeyExpireResponse::success()
        }
        None => KeyExpireResponse::failure(ErrorCode::KeyNotExist),
    }
}

/// Move a key to another database of the same server
pub(super) fn move_to_database(
    databases: &mut HashMap<DatabaseId, Keyspace>,
    server: &CacheServer,
    now: DateTime<Utc>,
    params: &KeyMoveParams,
) -> KeyMoveResponse {
    let key = key_or_fail!(&params.key);
    let source = DatabaseId::of(server);
    let target = DatabaseId::new(server, params.database);
    if source == target {
        return KeyMoveResponse::failure_with(
            ErrorCode::OperationUnsupported,
            "source and destination databases are the same",
        );
    }
    if databases.get_mut(&target).is_some_and(|space| space.contains(&key, now)) {
        return KeyMoveResponse::success();
    }
    let Some(stored) = databases.get_mut(&source).and_then(|space| space.remove(&key, now)) else {
        return KeyMoveResponse::success();
    };
    databases.entry(target).or_default().insert(key, stored);
    KeyMoveResponse {
        moved: true,
        ..KeyMoveResponse::success()
    }
}

pub(super) fn persist(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyPersistParams,
) -> KeyPersistResponse {
    let key = key_or_fail!(&params.key);
    match space.get_mut(&key, now) {
        Some(stored) => {
            stored.expiry = None;
            KeyPersistResponse::success()
        }
        None => KeyPersistResponse::failure(ErrorCode::KeyNotExist),
    }
}

pub(super) fn random(space: &mut Keyspace, now: DateTime<Utc>) -> KeyRandomResponse {
    let keys = space.keys(now);
    if keys.is_empty() {
        return KeyRandomResponse::success();
    }
    KeyRandomResponse {
        key: keys.get(rand::random_range(0..keys.len())).cloned(),
        ..KeyRandomResponse::success()
    }
}

pub(super) fn rename(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyRenameParams,
) -> KeyRenameResponse {
    let key = key_or_fail!(&params.key);
    let new_key = key_or_fail!(&params.new_key);
    if !space.contains(&key, now) {
        return KeyRenameResponse::failure(ErrorCode::KeyNotExist);
    }
    match &params.when {
        SetCondition::Always => {}
        SetCondition::IfNotExists if space.contains(&new_key, now) => {
            return KeyRenameResponse::failure(ErrorCode::NoResult);
        }
        SetCondition::IfNotExists => {}
        _ => {
            return KeyRenameResponse::failure_with(
                ErrorCode::OperationUnsupported,
                "rename supports only Always and IfNotExists",
            );
        }
    }
    if key == new_key {
        return KeyRenameResponse::success();
    }
    if let Some(stored) = space.remove(&key, now) {
        space.insert(new_key, stored);
    }
    KeyRenameResponse::success()
}

pub(super) fn restore(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyRestoreParams,
) -> KeyRestoreResponse {
    let key = key_or_fail!(&params.key);
    if params.value.is_empty() {
        return KeyRestoreResponse::failure(ErrorCode::ValuesIsNullOrEmpty);
    }
    if !params.replace && space.contains(&key, now) {
        return KeyRestoreResponse::failure(ErrorCode::NoResult);
    }
    let value: TypedValue = match serde_json::from_slice(&params.value) {
        Ok(value) => value,
        Err(e) => {
            return KeyRestoreResponse::failure_with(
                ErrorCode::ValueCannotBeCalculated,
                format!("invalid dump payload: {}", e),
            );
        }
    };
    let mut stored = StoredValue::new(value);
    stored.expiry = params
        .expiration
        .as_ref()
        .and_then(|e| Expiry::from_policy(e, now));
    space.insert(key, stored);
    KeyRestoreResponse::success()
}

pub(super) fn scan(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyScanParams,
) -> KeyScanResponse {
    let keys = space.keys(now);
    let (cursor, keys) = pattern::scan_page(
        &keys,
        |key| key.as_str(),
        params.pattern.as_deref(),
        params.cursor,
        params.page_size,
    );
    KeyScanResponse {
        cursor,
        keys,
        ..KeyScanResponse::success()
    }
}

/// Shared body of `SORT` and `SORT ... STORE`
struct SortRequest<'a> {
    key: &'a CacheKey,
    order: SortOrder,
    alpha: bool,
    offset: usize,
    count: Option<usize>,
    external: bool,
}

fn sorted_elements(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    request: &SortRequest<'_>,
) -> Result<Vec<String>, ErrorCode> {
    if request.external {
        return Err(ErrorCode::OperationUnsupported);
    }
    let text = crate::provider::key_text(request.key).ok_or(ErrorCode::KeyIsNullOrEmpty)?;
    let mut elements: Vec<String> = match space.get_mut(&text, now).map(|s| &s.value) {
        None => Vec::new(),
        Some(TypedValue::List(list)) => list.iter().cloned().collect(),
        Some(TypedValue::Set(set)) => set.iter().cloned().collect(),
        Some(TypedValue::SortedSet(zset)) => zset.keys().cloned().collect(),
        Some(_) => return Err(ErrorCode::ValueIsNotList),
    };

    if request.alpha {
        elements.sort();
    } else {
        let mut numbered = Vec::with_capacity(elements.len());
        for element in elements {
            let number: f64 = element
                .trim()
                .parse()
                .map_err(|_| ErrorCode::ValueCannotBeCalculated)?;
            numbered.push((number, element));
        }
        numbered.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        elements = numbered.into_iter().map(|(_, element)| element).collect();
    }
    if request.order == SortOrder::Descending {
        elements.reverse();
    }
    Ok(elements
        .into_iter()
        .skip(request.offset)
        .take(request.count.unwrap_or(usize::MAX))
        .collect())
}

pub(super) fn sort(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeySortParams,
) -> KeySortResponse {
    let request = SortRequest {
        key: &params.key,
        order: params.order,
        alpha: params.alpha,
        offset: params.offset,
        count: params.count,
        external: params.by_pattern.is_some() || !params.get_patterns.is_empty(),
    };
    KeySortResponse {
        values: value_or_fail!(sorted_elements(space, now, &request)),
        ..KeySortResponse::success()
    }
}

pub(super) fn sort_and_store(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeySortAndStoreParams,
) -> KeySortAndStoreResponse {
    let destination = key_or_fail!(&params.destination_key);
    let request = SortRequest {
        key: &params.key,
        order: params.order,
        alpha: params.alpha,
        offset: params.offset,
        count: params.count,
        external: params.by_pattern.is_some() || !params.get_patterns.is_empty(),
    };
    let values = value_or_fail!(sorted_elements(space, now, &request));
    let length = values.len() as i64;
    space.remove(&destination, now);
    if !values.is_empty() {
        space.insert(destination, StoredValue::new(TypedValue::List(VecDeque::from(values))));
    }
    KeySortAndStoreResponse {
        length,
        ..KeySortAndStoreResponse::success()
    }
}

pub(super) fn key_type(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyTypeParams,
) -> KeyTypeResponse {
    let key = key_or_fail!(&params.key);
    KeyTypeResponse {
        value_type: space.get_mut(&key, now).map(|s| s.value.value_type()),
        ..KeyTypeResponse::success()
    }
}

pub(super) fn time_to_live(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &KeyTimeToLiveParams,
) -> KeyTimeToLiveResponse {
    let key = key_or_fail!(&params.key);
    match space.get_mut(&key, now) {
        Some(stored) => KeyTimeToLiveResponse {
            time_to_live: stored.time_to_live(now),
            ..KeyTimeToLiveResponse::success()
        },
        None => KeyTimeToLiveResponse::failure(ErrorCode::KeyNotExist),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn list_space(values: &[&str]) -> Keyspace {
        let mut space = Keyspace::default();
        let list = values.iter().map(|v| v.to_string()).collect();
        space.insert("nums", StoredValue::new(TypedValue::List(list)));
        space
    }

    #[test]
    fn test_numeric_sort_rejects_text() {
        let mut space = list_space(&["10", "2", "x"]);
        let params = KeySortParams::new(CacheKey::constant("nums"));
        let response = sort(&mut space, now(), &params);
        assert_eq!(response.code(), Some(ErrorCode::ValueCannotBeCalculated));
    }

    #[test]
    fn test_sort_orders_numbers_and_pages() {
        let mut space = list_space(&["10", "2", "33", "4"]);
        let params = KeySortParams::new(CacheKey::constant("nums"))
            .with_order(SortOrder::Descending)
            .with_limit(1, 2);
        let response = sort(&mut space, now(), &params);
        assert!(response.is_success());
        assert_eq!(response.values, vec!["10", "4"]);
    }

    #[test]
    fn test_dump_restore_keeps_value() {
        let mut space = list_space(&["a", "b"]);
        let dumped =
            dump(&mut space, now(), &KeyDumpParams::new(CacheKey::constant("nums"))).unwrap();
        let restore_params = KeyRestoreParams::new(CacheKey::constant("copy"), dumped.value);
        assert!(restore(&mut space, now(), &restore_params).is_success());
        assert_eq!(
            space.get_mut("copy", now()).map(|s| s.value.clone()),
            space.get_mut("nums", now()).map(|s| s.value.clone())
        );

        // Second restore without replace collides with the existing key
        let again = restore(&mut space, now(), &restore_params);
        assert_eq!(again.code(), Some(ErrorCode::NoResult));
    }
}
