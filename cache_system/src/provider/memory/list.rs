use super::keyspace::Keyspace;
use crate::command::CacheResponse;
use crate::command::list::*;
use crate::entry::CacheExpiration;
use crate::errors::ErrorCode;
use crate::values::{normalize_index, normalize_range};
use chrono::{DateTime, Utc};

fn insert(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    key: &str,
    pivot: &str,
    value: &str,
    after: bool,
    expiration: Option<&CacheExpiration>,
) -> Result<i64, ErrorCode> {
    let Some(list) = space.list(key, now)? else {
        return Ok(0);
    };
    let Some(position) = list.iter().position(|v| v == pivot) else {
        return Ok(-1);
    };
    list.insert(if after { position + 1 } else { position }, value.to_string());
    let length = list.len() as i64;
    space.set_expiration(key, expiration, now);
    Ok(length)
}

pub(super) fn insert_before(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListInsertBeforeParams,
) -> ListInsertBeforeResponse {
    let key = key_or_fail!(&params.key);
    let new_length = value_or_fail!(insert(
        space,
        now,
        &key,
        &params.pivot,
        &params.value,
        false,
        params.expiration.as_ref()
    ));
    ListInsertBeforeResponse {
        new_length,
        ..ListInsertBeforeResponse::success()
    }
}

pub(super) fn insert_after(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListInsertAfterParams,
) -> ListInsertAfterResponse {
    let key = key_or_fail!(&params.key);
    let new_length = value_or_fail!(insert(
        space,
        now,
        &key,
        &params.pivot,
        &params.value,
        true,
        params.expiration.as_ref()
    ));
    ListInsertAfterResponse {
        new_length,
        ..ListInsertAfterResponse::success()
    }
}

pub(super) fn get_by_index(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListGetByIndexParams,
) -> ListGetByIndexResponse {
    let key = key_or_fail!(&params.key);
    let value = value_or_fail!(space.list(&key, now))
        .and_then(|list| {
            normalize_index(params.index, list.len()).and_then(|i| list.get(i).cloned())
        });
    ListGetByIndexResponse {
        value,
        ..ListGetByIndexResponse::success()
    }
}

pub(super) fn left_pop(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListLeftPopParams,
) -> ListLeftPopResponse {
    let key = key_or_fail!(&params.key);
    let value = value_or_fail!(space.list(&key, now)).and_then(|list| list.pop_front());
    space.remove_if_empty(&key);
    ListLeftPopResponse {
        value,
        ..ListLeftPopResponse::success()
    }
}

pub(super) fn left_push(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListLeftPushParams,
) -> ListLeftPushResponse {
    let key = key_or_fail!(&params.key);
    if params.values.is_empty() {
        return ListLeftPushResponse::failure(ErrorCode::ValuesIsNullOrEmpty);
    }
    let list = value_or_fail!(space.list_or_create(&key, now));
    for value in &params.values {
        list.push_front(value.clone());
    }
    let new_length = list.len() as i64;
    space.set_expiration(&key, params.expiration.as_ref(), now);
    ListLeftPushResponse {
        new_length,
        ..ListLeftPushResponse::success()
    }
}

pub(super) fn length(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListLengthParams,
) -> ListLengthResponse {
    let key = key_or_fail!(&params.key);
    let length = value_or_fail!(space.list(&key, now)).map_or(0, |list| list.len() as i64);
    ListLengthResponse {
        length,
        ..ListLengthResponse::success()
    }
}

pub(super) fn range(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListRangeParams,
) -> ListRangeResponse {
    let key = key_or_fail!(&params.key);
    let values = value_or_fail!(space.list(&key, now))
        .and_then(|list| {
            normalize_range(params.start, params.end, list.len())
                .map(|(start, end)| list.range(start..=end).cloned().collect::<Vec<_>>())
        })
        .unwrap_or_default();
    ListRangeResponse {
        values,
        ..ListRangeResponse::success()
    }
}

pub(super) fn remove(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListRemoveParams,
) -> ListRemoveResponse {
    let key = key_or_fail!(&params.key);
    let Some(list) = value_or_fail!(space.list(&key, now)) else {
        return ListRemoveResponse::success();
    };
    let limit = if params.count == 0 {
        usize::MAX
    } else {
        usize::try_from(params.count.unsigned_abs()).unwrap_or(usize::MAX)
    };
    let mut positions: Vec<usize> = list
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == params.value)
        .map(|(i, _)| i)
        .collect();
    if params.count < 0 {
        positions.reverse();
    }
    positions.truncate(limit);
    positions.sort_unstable_by(|a, b| b.cmp(a));
    for position in &positions {
        list.remove(*position);
    }
    space.remove_if_empty(&key);
    ListRemoveResponse {
        removed: positions.len() as i64,
        ..ListRemoveResponse::success()
    }
}

pub(super) fn right_pop(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListRightPopParams,
) -> ListRightPopResponse {
    let key = key_or_fail!(&params.key);
    let value = value_or_fail!(space.list(&key, now)).and_then(|list| list.pop_back());
    space.remove_if_empty(&key);
    ListRightPopResponse {
        value,
        ..ListRightPopResponse::success()
    }
}

pub(super) fn right_pop_left_push(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListRightPopLeftPushParams,
) -> ListRightPopLeftPushResponse {
    let source = key_or_fail!(&params.source_key);
    let destination = key_or_fail!(&params.destination_key);
    // Check the destination type before touching the source
    value_or_fail!(space.list(&destination, now));
    let popped = value_or_fail!(space.list(&source, now)).and_then(|list| list.pop_back());
    let Some(value) = popped else {
        return ListRightPopLeftPushResponse::success();
    };
    space.remove_if_empty(&source);
    let list = value_or_fail!(space.list_or_create(&destination, now));
    list.push_front(value.clone());
    space.set_expiration(&destination, params.expiration.as_ref(), now);
    ListRightPopLeftPushResponse {
        value: Some(value),
        ..ListRightPopLeftPushResponse::success()
    }
}

pub(super) fn right_push(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListRightPushParams,
) -> ListRightPushResponse {
    let key = key_or_fail!(&params.key);
    if params.values.is_empty() {
        return ListRightPushResponse::failure(ErrorCode::ValuesIsNullOrEmpty);
    }
    let list = value_or_fail!(space.list_or_create(&key, now));
    list.extend(params.values.iter().cloned());
    let new_length = list.len() as i64;
    space.set_expiration(&key, params.expiration.as_ref(), now);
    ListRightPushResponse {
        new_length,
        ..ListRightPushResponse::success()
    }
}

pub(super) fn set_by_index(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListSetByIndexParams,
) -> ListSetByIndexResponse {
    let key = key_or_fail!(&params.key);
    let Some(list) = value_or_fail!(space.list(&key, now)) else {
        return ListSetByIndexResponse::failure(ErrorCode::KeyNotExist);
    };
    let Some(index) = normalize_index(params.index, list.len()) else {
        return ListSetByIndexResponse::failure(ErrorCode::OffsetInvalid);
    };
    list[index] = params.value.clone();
    ListSetByIndexResponse::success()
}

pub(super) fn trim(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &ListTrimParams,
) -> ListTrimResponse {
    let key = key_or_fail!(&params.key);
    if let Some(list) = value_or_fail!(space.list(&key, now)) {
        match normalize_range(params.start, params.end, list.len()) {
            Some((start, end)) => {
                list.truncate(end + 1);
                list.drain(..start);
            }
            None => list.clear(),
        }
    }
    space.remove_if_empty(&key);
    ListTrimResponse::success()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::CacheKey;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn key() -> CacheKey {
        CacheKey::constant("l")
    }

    fn list_space(values: &[&str]) -> Keyspace {
        let mut space = Keyspace::default();
        let values = values.iter().map(|v| v.to_string()).collect();
        assert!(
            right_push(&mut space, now(), &ListRightPushParams::new(key(), values)).is_success()
        );
        space
    }

    fn contents(space: &mut Keyspace) -> Vec<String> {
        range(space, now(), &ListRangeParams::new(key(), 0, -1)).values
    }

    #[test]
    fn test_insert_around_pivot() {
        let mut space = list_space(&["a", "c"]);
        let before =
            insert_before(&mut space, now(), &ListInsertBeforeParams::new(key(), "c", "b"));
        assert_eq!(before.new_length, 3);
        let after = insert_after(&mut space, now(), &ListInsertAfterParams::new(key(), "c", "d"));
        assert_eq!(after.new_length, 4);
        assert_eq!(contents(&mut space), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_insert_with_missing_pivot_or_key() {
        let mut space = list_space(&["a"]);
        let missing_pivot =
            insert_before(&mut space, now(), &ListInsertBeforeParams::new(key(), "zz", "b"));
        assert!(missing_pivot.is_success());
        assert_eq!(missing_pivot.new_length, -1);

        let params = ListInsertAfterParams::new(CacheKey::constant("none"), "a", "b");
        assert_eq!(insert_after(&mut space, now(), &params).new_length, 0);
        assert!(!space.contains("none", now()));
    }

    #[test]
    fn test_remove_counts_from_head_or_tail() {
        let mut space = list_space(&["a", "x", "b", "x", "c", "x"]);
        let params = ListRemoveParams::new(key(), "x", -2);
        assert_eq!(remove(&mut space, now(), &params).removed, 2);
        assert_eq!(contents(&mut space), vec!["a", "x", "b", "c"]);

        let mut space = list_space(&["a", "x", "b", "x", "c", "x"]);
        let params = ListRemoveParams::new(key(), "x", 1);
        assert_eq!(remove(&mut space, now(), &params).removed, 1);
        assert_eq!(contents(&mut space), vec!["a", "b", "x", "c", "x"]);

        let params = ListRemoveParams::new(key(), "x", 0);
        assert_eq!(remove(&mut space, now(), &params).removed, 2);
        assert_eq!(contents(&mut space), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_with_extreme_count_clears_matches() {
        let mut space = list_space(&["x", "x"]);
        let params = ListRemoveParams::new(key(), "x", i64::MIN);
        assert_eq!(remove(&mut space, now(), &params).removed, 2);
        assert!(!space.contains("l", now()));
    }

    #[test]
    fn test_trim_keeps_normalized_range() {
        let mut space = list_space(&["a", "b", "c", "d", "e"]);
        assert!(trim(&mut space, now(), &ListTrimParams::new(key(), 1, -2)).is_success());
        assert_eq!(contents(&mut space), vec!["b", "c", "d"]);

        // Empty range removes the key
        assert!(trim(&mut space, now(), &ListTrimParams::new(key(), 5, 10)).is_success());
        assert!(!space.contains("l", now()));
    }

    #[test]
    fn test_set_by_index() {
        let mut space = list_space(&["a", "b", "c"]);
        assert!(
            set_by_index(&mut space, now(), &ListSetByIndexParams::new(key(), -1, "z")).is_success()
        );
        assert_eq!(contents(&mut space), vec!["a", "b", "z"]);

        let out_of_range =
            set_by_index(&mut space, now(), &ListSetByIndexParams::new(key(), 3, "q"));
        assert_eq!(out_of_range.code(), Some(ErrorCode::OffsetInvalid));

        let params = ListSetByIndexParams::new(CacheKey::constant("none"), 0, "q");
        assert_eq!(set_by_index(&mut space, now(), &params).code(), Some(ErrorCode::KeyNotExist));
    }

    #[test]
    fn test_right_pop_left_push_rotates() {
        let mut space = list_space(&["a", "b"]);
        let params = ListRightPopLeftPushParams::new(key(), key());
        assert_eq!(right_pop_left_push(&mut space, now(), &params).value.as_deref(), Some("b"));
        assert_eq!(contents(&mut space), vec!["b", "a"]);
    }
}
