use super::keyspace::Keyspace;
use crate::command::CacheResponse;
use crate::command::set::*;
use crate::errors::ErrorCode;
use crate::keys::CacheKey;
use crate::provider::key_text;
use crate::values::CombineOperation;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Combine the sets stored under `keys` in argument order; missing keys are empty
fn combine_sets(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    keys: &[CacheKey],
    operation: CombineOperation,
) -> Result<HashSet<String>, ErrorCode> {
    let mut combined: Option<HashSet<String>> = None;
    for key in keys {
        let text = key_text(key).ok_or(ErrorCode::KeyIsNullOrEmpty)?;
        let members = space.set(&text, now)?.map(|set| set.clone()).unwrap_or_default();
        combined = Some(match combined {
            None => members,
            Some(acc) => match operation {
                CombineOperation::Union => acc.union(&members).cloned().collect(),
                CombineOperation::Intersect => acc.intersection(&members).cloned().collect(),
                CombineOperation::Difference => acc.difference(&members).cloned().collect(),
            },
        });
    }
    combined.ok_or(ErrorCode::KeyIsNullOrEmpty)
}

fn sorted(members: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut members: Vec<String> = members.into_iter().collect();
    members.sort();
    members
}

pub(super) fn add(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetAddParams,
) -> SetAddResponse {
    let key = key_or_fail!(&params.key);
    if params.members.is_empty() {
        return SetAddResponse::failure(ErrorCode::ValuesIsNullOrEmpty);
    }
    let set = value_or_fail!(space.set_or_create(&key, now));
    let added = params
        .members
        .iter()
        .filter(|member| set.insert((*member).clone()))
        .count() as i64;
    space.set_expiration(&key, params.expiration.as_ref(), now);
    SetAddResponse {
        added,
        ..SetAddResponse::success()
    }
}

pub(super) fn combine(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetCombineParams,
) -> SetCombineResponse {
    let members = value_or_fail!(combine_sets(space, now, &params.keys, params.operation));
    SetCombineResponse {
        members: sorted(members),
        ..SetCombineResponse::success()
    }
}

pub(super) fn combine_and_store(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetCombineAndStoreParams,
) -> SetCombineAndStoreResponse {
    let destination = key_or_fail!(&params.destination_key);
    let members = value_or_fail!(combine_sets(space, now, &params.keys, params.operation));
    let count = members.len() as i64;
    space.remove(&destination, now);
    if !members.is_empty() {
        let stored = value_or_fail!(space.set_or_create(&destination, now));
        *stored = members;
        space.set_expiration(&destination, params.expiration.as_ref(), now);
    }
    SetCombineAndStoreResponse {
        count,
        ..SetCombineAndStoreResponse::success()
    }
}

pub(super) fn contains(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetContainsParams,
) -> SetContainsResponse {
    let key = key_or_fail!(&params.key);
    let contains =
        value_or_fail!(space.set(&key, now)).is_some_and(|set| set.contains(&params.member));
    SetContainsResponse {
        contains,
        ..SetContainsResponse::success()
    }
}

pub(super) fn length(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetLengthParams,
) -> SetLengthResponse {
    let key = key_or_fail!(&params.key);
    let length = value_or_fail!(space.set(&key, now)).map_or(0, |set| set.len() as i64);
    SetLengthResponse {
        length,
        ..SetLengthResponse::success()
    }
}

pub(super) fn members(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetMembersParams,
) -> SetMembersResponse {
    let key = key_or_fail!(&params.key);
    let members = value_or_fail!(space.set(&key, now))
        .map(|set| sorted(set.iter().cloned()))
        .unwrap_or_default();
    SetMembersResponse {
        members,
        ..SetMembersResponse::success()
    }
}

pub(super) fn move_member(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetMoveParams,
) -> SetMoveResponse {
    let source = key_or_fail!(&params.source_key);
    let destination = key_or_fail!(&params.destination_key);
    value_or_fail!(space.set(&destination, now));
    let removed =
        value_or_fail!(space.set(&source, now)).is_some_and(|set| set.remove(&params.member));
    if !removed {
        return SetMoveResponse::success();
    }
    space.remove_if_empty(&source);
    value_or_fail!(space.set_or_create(&destination, now)).insert(params.member.clone());
    space.set_expiration(&destination, params.expiration.as_ref(), now);
    SetMoveResponse {
        moved: true,
        ..SetMoveResponse::success()
    }
}

pub(super) fn pop(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetPopParams,
) -> SetPopResponse {
    let key = key_or_fail!(&params.key);
    let Some(set) = value_or_fail!(space.set(&key, now)) else {
        return SetPopResponse::success();
    };
    let mut candidates = sorted(set.iter().cloned());
    let mut members = Vec::with_capacity(params.count.min(candidates.len()));
    while members.len() < params.count && !candidates.is_empty() {
        let picked = candidates.swap_remove(rand::random_range(0..candidates.len()));
        set.remove(&picked);
        members.push(picked);
    }
    space.remove_if_empty(&key);
    SetPopResponse {
        members,
        ..SetPopResponse::success()
    }
}

/// Positive counts return distinct members, negative counts may repeat
pub(super) fn random_members(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetRandomMembersParams,
) -> SetRandomMembersResponse {
    let key = key_or_fail!(&params.key);
    if params.exceeds_sample_limit() {
        return SetRandomMembersResponse::failure(ErrorCode::OffsetInvalid);
    }
    let mut candidates = value_or_fail!(space.set(&key, now))
        .map(|set| sorted(set.iter().cloned()))
        .unwrap_or_default();
    if candidates.is_empty() {
        return SetRandomMembersResponse::success();
    }
    let wanted = params.count.unsigned_abs() as usize;
    let members: Vec<String> = if params.count < 0 {
        (0..wanted)
            .map(|_| candidates[rand::random_range(0..candidates.len())].clone())
            .collect()
    } else {
        let mut picked = Vec::with_capacity(wanted.min(candidates.len()));
        while picked.len() < wanted && !candidates.is_empty() {
            picked.push(candidates.swap_remove(rand::random_range(0..candidates.len())));
        }
        picked
    };
    SetRandomMembersResponse {
        members,
        ..SetRandomMembersResponse::success()
    }
}

pub(super) fn remove(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SetRemoveParams,
) -> SetRemoveResponse {
    let key = key_or_fail!(&params.key);
    let removed = value_or_fail!(space.set(&key, now)).map_or(0, |set| {
        params
            .members
            .iter()
            .filter(|member| set.remove(member.as_str()))
            .count() as i64
    });
    space.remove_if_empty(&key);
    SetRemoveResponse {
        removed,
        ..SetRemoveResponse::success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn names(members: &[&str]) -> Vec<String> {
        members.iter().map(|m| m.to_string()).collect()
    }

    fn seeded() -> Keyspace {
        let mut space = Keyspace::default();
        let a = SetAddParams::new(CacheKey::constant("a"), names(&["1", "2", "3"]));
        let b = SetAddParams::new(CacheKey::constant("b"), names(&["2", "3", "4"]));
        assert_eq!(add(&mut space, now(), &a).added, 3);
        assert_eq!(add(&mut space, now(), &b).added, 3);
        space
    }

    #[test]
    fn test_combine_in_argument_order() {
        let mut space = seeded();
        let keys =
            vec![CacheKey::constant("a"), CacheKey::constant("b"), CacheKey::constant("missing")];

        let union = combine(
            &mut space,
            now(),
            &SetCombineParams::new(keys.clone(), CombineOperation::Union),
        );
        assert_eq!(union.members, names(&["1", "2", "3", "4"]));

        let inter = combine(
            &mut space,
            now(),
            &SetCombineParams::new(keys.clone(), CombineOperation::Intersect),
        );
        assert!(inter.is_success());
        assert!(inter.members.is_empty());

        let diff = SetCombineParams::new(keys[..2].to_vec(), CombineOperation::Difference);
        assert_eq!(combine(&mut space, now(), &diff).members, names(&["1"]));
    }

    #[test]
    fn test_combine_and_store_replaces_destination() {
        let mut space = seeded();
        let params = SetCombineAndStoreParams::new(
            vec![CacheKey::constant("a"), CacheKey::constant("b")],
            CacheKey::constant("a"),
            CombineOperation::Intersect,
        );
        assert_eq!(combine_and_store(&mut space, now(), &params).count, 2);
        let stored = members(&mut space, now(), &SetMembersParams::new(CacheKey::constant("a")));
        assert_eq!(stored.members, names(&["2", "3"]));
    }

    #[test]
    fn test_move_member_between_sets() {
        let mut space = seeded();
        let params = SetMoveParams::new(CacheKey::constant("a"), CacheKey::constant("c"), "1");
        assert!(move_member(&mut space, now(), &params).moved);
        let check = SetContainsParams::new(CacheKey::constant("c"), "1");
        assert!(contains(&mut space, now(), &check).contains);

        // Member no longer in the source
        let again = move_member(&mut space, now(), &params);
        assert!(again.is_success());
        assert!(!again.moved);
    }

    #[test]
    fn test_move_into_other_type_fails() {
        let mut space = seeded();
        space.list_or_create("l", now()).unwrap().push_back("x".into());
        let params = SetMoveParams::new(CacheKey::constant("a"), CacheKey::constant("l"), "1");
        assert_eq!(move_member(&mut space, now(), &params).code(), Some(ErrorCode::ValueIsNotSet));
        let check = SetContainsParams::new(CacheKey::constant("a"), "1");
        assert!(contains(&mut space, now(), &check).contains);
    }

    #[test]
    fn test_pop_removes_members_and_key() {
        let mut space = seeded();
        let popped = pop(&mut space, now(), &SetPopParams::new(CacheKey::constant("a"), 2));
        assert_eq!(popped.members.len(), 2);
        assert_eq!(
            length(&mut space, now(), &SetLengthParams::new(CacheKey::constant("a"))).length,
            1
        );

        let rest = pop(&mut space, now(), &SetPopParams::new(CacheKey::constant("a"), 10));
        assert_eq!(rest.members.len(), 1);
        assert!(!space.contains("a", now()));
    }

    #[test]
    fn test_random_members_positive_count_is_distinct() {
        let mut space = seeded();
        let response = random_members(
            &mut space,
            now(),
            &SetRandomMembersParams::new(CacheKey::constant("a"), 10),
        );
        let mut picked = response.members;
        picked.sort();
        assert_eq!(picked, names(&["1", "2", "3"]));
    }

    #[test]
    fn test_random_members_negative_count_repeats() {
        let mut space = Keyspace::default();
        add(&mut space, now(), &SetAddParams::new(CacheKey::constant("one"), names(&["x"])));
        let response = random_members(
            &mut space,
            now(),
            &SetRandomMembersParams::new(CacheKey::constant("one"), -5),
        );
        assert_eq!(response.members, names(&["x", "x", "x", "x", "x"]));
        assert_eq!(
            length(&mut space, now(), &SetLengthParams::new(CacheKey::constant("one"))).length,
            1
        );
    }

    #[test]
    fn test_random_members_rejects_oversized_sample() {
        let mut space = Keyspace::default();
        add(&mut space, now(), &SetAddParams::new(CacheKey::constant("one"), names(&["x"])));

        let params = SetRandomMembersParams::new(CacheKey::constant("one"), i64::MIN);
        let response = random_members(&mut space, now(), &params);
        assert_eq!(response.code(), Some(ErrorCode::OffsetInvalid));
        assert!(response.members.is_empty());

        let limit = -(MAX_RANDOM_MEMBERS as i64) - 1;
        let params = SetRandomMembersParams::new(CacheKey::constant("one"), limit);
        assert_eq!(
            random_members(&mut space, now(), &params).code(),
            Some(ErrorCode::OffsetInvalid)
        );
    }

    #[test]
    fn test_remove_drops_empty_set() {
        let mut space = seeded();
        let params = SetRemoveParams::new(CacheKey::constant("b"), names(&["2", "3", "4", "9"]));
        assert_eq!(remove(&mut space, now(), &params).removed, 3);
        assert!(!space.contains("b", now()));
    }
}
