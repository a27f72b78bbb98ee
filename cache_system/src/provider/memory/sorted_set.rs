use super::keyspace::Keyspace;
use crate::command::CacheResponse;
use crate::command::sorted_set::*;
use crate::errors::ErrorCode;
use crate::values::{
    CombineOperation, LexBound, ScoreBound, SortOrder, SortedSetMember, normalize_range,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

fn in_order(mut members: Vec<(String, f64)>, order: SortOrder) -> Vec<(String, f64)> {
    if order == SortOrder::Descending {
        members.reverse();
    }
    members
}

fn paged<T>(items: Vec<T>, offset: usize, count: Option<usize>) -> Vec<T> {
    items
        .into_iter()
        .skip(offset)
        .take(count.unwrap_or(usize::MAX))
        .collect()
}

fn within_scores(score: f64, min: &ScoreBound, max: &ScoreBound) -> bool {
    min.admits_from_below(score) && max.admits_from_above(score)
}

fn within_values(value: &str, min: &LexBound, max: &LexBound) -> bool {
    min.admits_from_below(value) && max.admits_from_above(value)
}

fn to_members(members: Vec<(String, f64)>) -> Vec<SortedSetMember> {
    members
        .into_iter()
        .map(|(value, score)| SortedSetMember { value, score })
        .collect()
}

/// Remove the members selected by `select` from the ordered set under `key`
fn remove_where(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    key: &str,
    select: impl Fn(usize, &str, f64) -> bool,
) -> Result<i64, ErrorCode> {
    let members = space.ordered_members(key, now)?;
    let Some(zset) = space.sorted_set(key, now)? else {
        return Ok(0);
    };
    let mut removed = 0;
    for (rank, (member, score)) in members.iter().enumerate() {
        if select(rank, member, *score) && zset.remove(member).is_some() {
            removed += 1;
        }
    }
    space.remove_if_empty(key);
    Ok(removed)
}

pub(super) fn add(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetAddParams,
) -> SortedSetAddResponse {
    let key = key_or_fail!(&params.key);
    if params.members.is_empty() {
        return SortedSetAddResponse::failure(ErrorCode::ValuesIsNullOrEmpty);
    }
    if params.members.iter().any(|m| m.score.is_nan()) {
        return SortedSetAddResponse::failure(ErrorCode::ValueCannotBeCalculated);
    }
    let zset = value_or_fail!(space.sorted_set_or_create(&key, now));
    let added = params
        .members
        .iter()
        .filter(|m| zset.insert(m.value.clone(), m.score).is_none())
        .count() as i64;
    space.set_expiration(&key, params.expiration.as_ref(), now);
    SortedSetAddResponse {
        added,
        ..SortedSetAddResponse::success()
    }
}

pub(super) fn combine_and_store(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetCombineAndStoreParams,
) -> SortedSetCombineAndStoreResponse {
    let destination = key_or_fail!(&params.destination_key);
    if params.keys.is_empty() {
        return SortedSetCombineAndStoreResponse::failure(ErrorCode::KeyIsNullOrEmpty);
    }
    let mut sources = Vec::with_capacity(params.keys.len());
    for (index, key) in params.keys.iter().enumerate() {
        let key = key_or_fail!(key);
        let weight = params.weights.get(index).copied().unwrap_or(1.0);
        let zset = value_or_fail!(space.sorted_set(&key, now))
            .map(|zset| zset.clone())
            .unwrap_or_default();
        sources.push((zset, weight));
    }

    let mut combined: HashMap<String, f64> = HashMap::new();
    for (index, (zset, weight)) in sources.iter().enumerate() {
        match params.operation {
            CombineOperation::Union => {
                for (member, score) in zset {
                    let weighted = score * weight;
                    combined
                        .entry(member.clone())
                        .and_modify(|current| *current = params.aggregate.apply(*current, weighted))
                        .or_insert(weighted);
                }
            }
            CombineOperation::Intersect if index == 0 => {
                combined = zset.iter().map(|(m, s)| (m.clone(), s * weight)).collect();
            }
            CombineOperation::Intersect => {
                combined.retain(|member, _| zset.contains_key(member));
                for (member, current) in combined.iter_mut() {
                    if let Some(score) = zset.get(member) {
                        *current = params.aggregate.apply(*current, score * weight);
                    }
                }
            }
            CombineOperation::Difference if index == 0 => {
                combined = zset.iter().map(|(m, s)| (m.clone(), s * weight)).collect();
            }
            CombineOperation::Difference => {
                combined.retain(|member, _| !zset.contains_key(member));
            }
        }
    }

    let count = combined.len() as i64;
    space.remove(&destination, now);
    if !combined.is_empty() {
        let stored = value_or_fail!(space.sorted_set_or_create(&destination, now));
        *stored = combined;
        space.set_expiration(&destination, params.expiration.as_ref(), now);
    }
    SortedSetCombineAndStoreResponse {
        count,
        ..SortedSetCombineAndStoreResponse::success()
    }
}

fn add_score(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    key: &str,
    member: &str,
    delta: f64,
) -> Result<f64, ErrorCode> {
    let zset = space.sorted_set_or_create(key, now)?;
    let score = zset.get(member).copied().unwrap_or(0.0) + delta;
    if score.is_nan() {
        return Err(ErrorCode::ValueCannotBeCalculated);
    }
    zset.insert(member.to_string(), score);
    Ok(score)
}

pub(super) fn increment(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetIncrementParams,
) -> SortedSetIncrementResponse {
    let key = key_or_fail!(&params.key);
    let outcome = add_score(space, now, &key, &params.member, params.value);
    space.remove_if_empty(&key);
    SortedSetIncrementResponse {
        new_score: value_or_fail!(outcome),
        ..SortedSetIncrementResponse::success()
    }
}

pub(super) fn decrement(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetDecrementParams,
) -> SortedSetDecrementResponse {
    let key = key_or_fail!(&params.key);
    let outcome = add_score(space, now, &key, &params.member, -params.value);
    space.remove_if_empty(&key);
    SortedSetDecrementResponse {
        new_score: value_or_fail!(outcome),
        ..SortedSetDecrementResponse::success()
    }
}

pub(super) fn length(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetLengthParams,
) -> SortedSetLengthResponse {
    let key = key_or_fail!(&params.key);
    let length = value_or_fail!(space.sorted_set(&key, now)).map_or(0, |zset| zset.len() as i64);
    SortedSetLengthResponse {
        length,
        ..SortedSetLengthResponse::success()
    }
}

pub(super) fn length_by_value(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetLengthByValueParams,
) -> SortedSetLengthByValueResponse {
    let key = key_or_fail!(&params.key);
    let length = value_or_fail!(space.sorted_set(&key, now)).map_or(0, |zset| {
        zset.keys()
            .filter(|member| within_values(member, &params.min, &params.max))
            .count() as i64
    });
    SortedSetLengthByValueResponse {
        length,
        ..SortedSetLengthByValueResponse::success()
    }
}

pub(super) fn range_by_rank(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetRangeByRankParams,
) -> SortedSetRangeByRankResponse {
    let key = key_or_fail!(&params.key);
    let members = in_order(value_or_fail!(space.ordered_members(&key, now)), params.order);
    let members = match normalize_range(params.start, params.end, members.len()) {
        Some((start, end)) => members[start..=end].to_vec(),
        None => Vec::new(),
    };
    SortedSetRangeByRankResponse {
        members: to_members(members),
        ..SortedSetRangeByRankResponse::success()
    }
}

pub(super) fn range_by_score(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetRangeByScoreParams,
) -> SortedSetRangeByScoreResponse {
    let key = key_or_fail!(&params.key);
    let mut members = value_or_fail!(space.ordered_members(&key, now));
    members.retain(|(_, score)| within_scores(*score, &params.min, &params.max));
    let members = paged(in_order(members, params.order), params.offset, params.count);
    SortedSetRangeByScoreResponse {
        members: to_members(members),
        ..SortedSetRangeByScoreResponse::success()
    }
}

pub(super) fn range_by_value(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetRangeByValueParams,
) -> SortedSetRangeByValueResponse {
    let key = key_or_fail!(&params.key);
    let mut members = value_or_fail!(space.ordered_members(&key, now));
    members.retain(|(member, _)| within_values(member, &params.min, &params.max));
    let values = paged(in_order(members, params.order), params.offset, params.count)
        .into_iter()
        .map(|(member, _)| member)
        .collect();
    SortedSetRangeByValueResponse {
        values,
        ..SortedSetRangeByValueResponse::success()
    }
}

pub(super) fn rank(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetRankParams,
) -> SortedSetRankResponse {
    let key = key_or_fail!(&params.key);
    let members = in_order(value_or_fail!(space.ordered_members(&key, now)), params.order);
    let rank = members
        .iter()
        .position(|(member, _)| *member == params.member)
        .map(|position| position as i64);
    SortedSetRankResponse {
        rank,
        ..SortedSetRankResponse::success()
    }
}

pub(super) fn remove(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetRemoveParams,
) -> SortedSetRemoveResponse {
    let key = key_or_fail!(&params.key);
    let removed = value_or_fail!(space.sorted_set(&key, now)).map_or(0, |zset| {
        params
            .members
            .iter()
            .filter(|member| zset.remove(member.as_str()).is_some())
            .count() as i64
    });
    space.remove_if_empty(&key);
    SortedSetRemoveResponse {
        removed,
        ..SortedSetRemoveResponse::success()
    }
}

pub(super) fn remove_range_by_rank(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetRemoveRangeByRankParams,
) -> SortedSetRemoveRangeByRankResponse {
    let key = key_or_fail!(&params.key);
    let length = value_or_fail!(space.sorted_set(&key, now)).map_or(0, |zset| zset.len());
    let Some((start, end)) = normalize_range(params.start, params.end, length) else {
        return SortedSetRemoveRangeByRankResponse::success();
    };
    let removed =
        value_or_fail!(remove_where(space, now, &key, |rank, _, _| (start..=end).contains(&rank)));
    SortedSetRemoveRangeByRankResponse {
        removed,
        ..SortedSetRemoveRangeByRankResponse::success()
    }
}

pub(super) fn remove_range_by_score(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetRemoveRangeByScoreParams,
) -> SortedSetRemoveRangeByScoreResponse {
    let key = key_or_fail!(&params.key);
    let removed = value_or_fail!(remove_where(space, now, &key, |_, _, score| within_scores(
        score,
        &params.min,
        &params.max
    )));
    SortedSetRemoveRangeByScoreResponse {
        removed,
        ..SortedSetRemoveRangeByScoreResponse::success()
    }
}

pub(super) fn remove_range_by_value(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetRemoveRangeByValueParams,
) -> SortedSetRemoveRangeByValueResponse {
    let key = key_or_fail!(&params.key);
    let removed = value_or_fail!(remove_where(space, now, &key, |_, member, _| within_values(
        member,
        &params.min,
        &params.max
    )));
    SortedSetRemoveRangeByValueResponse {
        removed,
        ..SortedSetRemoveRangeByValueResponse::success()
    }
}

pub(super) fn score(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &SortedSetScoreParams,
) -> SortedSetScoreResponse {
    let key = key_or_fail!(&params.key);
    let score = value_or_fail!(space.sorted_set(&key, now))
        .and_then(|zset| zset.get(&params.member).copied());
    SortedSetScoreResponse {
        score,
        ..SortedSetScoreResponse::success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_and_ordering_helpers() {
        let members = vec![("a".to_string(), 1.0), ("b".to_string(), 2.0), ("c".to_string(), 3.0)];
        let reversed = in_order(members.clone(), SortOrder::Descending);
        assert_eq!(reversed[0].0, "c");
        assert_eq!(paged(members, 1, Some(1)), vec![("b".to_string(), 2.0)]);
    }
}
