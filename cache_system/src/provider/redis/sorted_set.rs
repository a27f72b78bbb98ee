use super::{Connection, write_with_expiration};
use crate::command::CacheResponse;
use crate::command::sorted_set::*;
use crate::errors::ErrorCode;
use crate::values::{
    CombineOperation, LexBound, ScoreBound, SetAggregate, SortOrder, SortedSetMember,
};
use redis::{Cmd, RedisResult};

fn score_arg(bound: &ScoreBound) -> String {
    let (value, exclusive) = match bound {
        ScoreBound::Inclusive(value) => (*value, false),
        ScoreBound::Exclusive(value) => (*value, true),
    };
    let text = if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        value.to_string()
    };
    if exclusive { format!("({}", text) } else { text }
}

/// Lexicographic bound; `lower` picks the open end used for `Unbounded`
fn lex_arg(bound: &LexBound, lower: bool) -> String {
    match bound {
        LexBound::Unbounded if lower => "-".to_string(),
        LexBound::Unbounded => "+".to_string(),
        LexBound::Inclusive(value) => format!("[{}", value),
        LexBound::Exclusive(value) => format!("({}", value),
    }
}

/// Append `LIMIT offset count` when paging was requested
fn limit(command: &mut Cmd, offset: usize, count: Option<usize>) {
    if offset > 0 || count.is_some() {
        command
            .arg("LIMIT")
            .arg(offset)
            .arg(count.map_or(-1, |count| count as i64));
    }
}

fn to_members(members: Vec<(String, f64)>) -> Vec<SortedSetMember> {
    members
        .into_iter()
        .map(|(value, score)| SortedSetMember::new(value, score))
        .collect()
}

pub(super) async fn add(
    conn: &mut Connection,
    params: &SortedSetAddParams,
) -> RedisResult<SortedSetAddResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.members.is_empty() {
        return Ok(SortedSetAddResponse::failure(ErrorCode::ValuesIsNullOrEmpty));
    }
    if params.members.iter().any(|m| m.score.is_nan()) {
        return Ok(SortedSetAddResponse::failure(ErrorCode::ValueCannotBeCalculated));
    }
    let mut command = redis::cmd("ZADD");
    command.arg(&key);
    for member in &params.members {
        command.arg(score_arg(&ScoreBound::Inclusive(member.score))).arg(&member.value);
    }
    let added: i64 = write_with_expiration(conn, command, &key, params.expiration.as_ref()).await?;
    Ok(SortedSetAddResponse {
        added,
        ..SortedSetAddResponse::success()
    })
}

/// ZUNIONSTORE, ZINTERSTORE or ZDIFFSTORE; the last one ignores weights
pub(super) async fn combine_and_store(
    conn: &mut Connection,
    params: &SortedSetCombineAndStoreParams,
) -> RedisResult<SortedSetCombineAndStoreResponse> {
    let destination = key_or_fail!(&params.destination_key, Ok);
    if params.keys.is_empty() {
        return Ok(SortedSetCombineAndStoreResponse::failure(ErrorCode::KeyIsNullOrEmpty));
    }
    let mut sources = Vec::with_capacity(params.keys.len());
    for key in &params.keys {
        sources.push(key_or_fail!(key, Ok));
    }

    let name = match params.operation {
        CombineOperation::Union => "ZUNIONSTORE",
        CombineOperation::Intersect => "ZINTERSTORE",
        CombineOperation::Difference => "ZDIFFSTORE",
    };
    let mut command = redis::cmd(name);
    command.arg(&destination).arg(sources.len()).arg(&sources);
    if params.operation != CombineOperation::Difference {
        let weights: Vec<f64> = (0..sources.len())
            .map(|i| params.weights.get(i).copied().unwrap_or(1.0))
            .collect();
        command.arg("WEIGHTS").arg(weights);
        command.arg("AGGREGATE").arg(match params.aggregate {
            SetAggregate::Sum => "SUM",
            SetAggregate::Min => "MIN",
            SetAggregate::Max => "MAX",
        });
    }
    let count: i64 =
        write_with_expiration(conn, command, &destination, params.expiration.as_ref()).await?;
    Ok(SortedSetCombineAndStoreResponse {
        count,
        ..SortedSetCombineAndStoreResponse::success()
    })
}

async fn add_score(conn: &mut Connection, key: &str, member: &str, delta: f64) -> RedisResult<f64> {
    redis::cmd("ZINCRBY").arg(key).arg(delta).arg(member).query_async(conn).await
}

pub(super) async fn increment(
    conn: &mut Connection,
    params: &SortedSetIncrementParams,
) -> RedisResult<SortedSetIncrementResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let new_score = add_score(conn, &key, &params.member, params.value).await?;
    Ok(SortedSetIncrementResponse {
        new_score,
        ..SortedSetIncrementResponse::success()
    })
}

pub(super) async fn decrement(
    conn: &mut Connection,
    params: &SortedSetDecrementParams,
) -> RedisResult<SortedSetDecrementResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let new_score = add_score(conn, &key, &params.member, -params.value).await?;
    Ok(SortedSetDecrementResponse {
        new_score,
        ..SortedSetDecrementResponse::success()
    })
}

pub(super) async fn length(
    conn: &mut Connection,
    params: &SortedSetLengthParams,
) -> RedisResult<SortedSetLengthResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let length: i64 = redis::cmd("ZCARD").arg(&key).query_async(conn).await?;
    Ok(SortedSetLengthResponse {
        length,
        ..SortedSetLengthResponse::success()
    })
}

pub(super) async fn length_by_value(
    conn: &mut Connection,
    params: &SortedSetLengthByValueParams,
) -> RedisResult<SortedSetLengthByValueResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let length: i64 = redis::cmd("ZLEXCOUNT")
        .arg(&key)
        .arg(lex_arg(&params.min, true))
        .arg(lex_arg(&params.max, false))
        .query_async(conn)
        .await?;
    Ok(SortedSetLengthByValueResponse {
        length,
        ..SortedSetLengthByValueResponse::success()
    })
}

pub(super) async fn range_by_rank(
    conn: &mut Connection,
    params: &SortedSetRangeByRankParams,
) -> RedisResult<SortedSetRangeByRankResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let name = match params.order {
        SortOrder::Ascending => "ZRANGE",
        SortOrder::Descending => "ZREVRANGE",
    };
    let members: Vec<(String, f64)> = redis::cmd(name)
        .arg(&key)
        .arg(params.start)
        .arg(params.end)
        .arg("WITHSCORES")
        .query_async(conn)
        .await?;
    Ok(SortedSetRangeByRankResponse {
        members: to_members(members),
        ..SortedSetRangeByRankResponse::success()
    })
}

pub(super) async fn range_by_score(
    conn: &mut Connection,
    params: &SortedSetRangeByScoreParams,
) -> RedisResult<SortedSetRangeByScoreResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let (min, max) = (score_arg(&params.min), score_arg(&params.max));
    let mut command = match params.order {
        SortOrder::Ascending => {
            let mut command = redis::cmd("ZRANGEBYSCORE");
            command.arg(&key).arg(min).arg(max);
            command
        }
        SortOrder::Descending => {
            let mut command = redis::cmd("ZREVRANGEBYSCORE");
            command.arg(&key).arg(max).arg(min);
            command
        }
    };
    command.arg("WITHSCORES");
    limit(&mut command, params.offset, params.count);
    let members: Vec<(String, f64)> = command.query_async(conn).await?;
    Ok(SortedSetRangeByScoreResponse {
        members: to_members(members),
        ..SortedSetRangeByScoreResponse::success()
    })
}

pub(super) async fn range_by_value(
    conn: &mut Connection,
    params: &SortedSetRangeByValueParams,
) -> RedisResult<SortedSetRangeByValueResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let (min, max) = (lex_arg(&params.min, true), lex_arg(&params.max, false));
    let mut command = match params.order {
        SortOrder::Ascending => {
            let mut command = redis::cmd("ZRANGEBYLEX");
            command.arg(&key).arg(min).arg(max);
            command
        }
        SortOrder::Descending => {
            let mut command = redis::cmd("ZREVRANGEBYLEX");
            command.arg(&key).arg(max).arg(min);
            command
        }
    };
    limit(&mut command, params.offset, params.count);
    let values: Vec<String> = command.query_async(conn).await?;
    Ok(SortedSetRangeByValueResponse {
        values,
        ..SortedSetRangeByValueResponse::success()
    })
}

pub(super) async fn rank(
    conn: &mut Connection,
    params: &SortedSetRankParams,
) -> RedisResult<SortedSetRankResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let name = match params.order {
        SortOrder::Ascending => "ZRANK",
        SortOrder::Descending => "ZREVRANK",
    };
    let rank: Option<i64> = redis::cmd(name).arg(&key).arg(&params.member).query_async(conn).await?;
    Ok(SortedSetRankResponse {
        rank,
        ..SortedSetRankResponse::success()
    })
}

pub(super) async fn remove(
    conn: &mut Connection,
    params: &SortedSetRemoveParams,
) -> RedisResult<SortedSetRemoveResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.members.is_empty() {
        return Ok(SortedSetRemoveResponse::success());
    }
    let removed: i64 = redis::cmd("ZREM").arg(&key).arg(&params.members).query_async(conn).await?;
    Ok(SortedSetRemoveResponse {
        removed,
        ..SortedSetRemoveResponse::success()
    })
}

pub(super) async fn remove_range_by_rank(
    conn: &mut Connection,
    params: &SortedSetRemoveRangeByRankParams,
) -> RedisResult<SortedSetRemoveRangeByRankResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let removed: i64 = redis::cmd("ZREMRANGEBYRANK")
        .arg(&key)
        .arg(params.start)
        .arg(params.end)
        .query_async(conn)
        .await?;
    Ok(SortedSetRemoveRangeByRankResponse {
        removed,
        ..SortedSetRemoveRangeByRankResponse::success()
    })
}

pub(super) async fn remove_range_by_score(
    conn: &mut Connection,
    params: &SortedSetRemoveRangeByScoreParams,
) -> RedisResult<SortedSetRemoveRangeByScoreResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let removed: i64 = redis::cmd("ZREMRANGEBYSCORE")
        .arg(&key)
        .arg(score_arg(&params.min))
        .arg(score_arg(&params.max))
        .query_async(conn)
        .await?;
    Ok(SortedSetRemoveRangeByScoreResponse {
        removed,
        ..SortedSetRemoveRangeByScoreResponse::success()
    })
}

pub(super) async fn remove_range_by_value(
    conn: &mut Connection,
    params: &SortedSetRemoveRangeByValueParams,
) -> RedisResult<SortedSetRemoveRangeByValueResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let removed: i64 = redis::cmd("ZREMRANGEBYLEX")
        .arg(&key)
        .arg(lex_arg(&params.min, true))
        .arg(lex_arg(&params.max, false))
        .query_async(conn)
        .await?;
    Ok(SortedSetRemoveRangeByValueResponse {
        removed,
        ..SortedSetRemoveRangeByValueResponse::success()
    })
}

pub(super) async fn score(
    conn: &mut Connection,
    params: &SortedSetScoreParams,
) -> RedisResult<SortedSetScoreResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let score: Option<f64> = redis::cmd("ZSCORE")
        .arg(&key)
        .arg(&params.member)
        .query_async(conn)
        .await?;
    Ok(SortedSetScoreResponse {
        score,
        ..SortedSetScoreResponse::success()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_arguments() {
        assert_eq!(score_arg(&ScoreBound::Inclusive(1.5)), "1.5");
        assert_eq!(score_arg(&ScoreBound::Exclusive(2.0)), "(2");
        assert_eq!(score_arg(&ScoreBound::negative_infinity()), "-inf");
        assert_eq!(score_arg(&ScoreBound::positive_infinity()), "+inf");

        assert_eq!(lex_arg(&LexBound::Unbounded, true), "-");
        assert_eq!(lex_arg(&LexBound::Unbounded, false), "+");
        assert_eq!(lex_arg(&LexBound::Inclusive("a".into()), true), "[a");
        assert_eq!(lex_arg(&LexBound::Exclusive("z".into()), false), "(z");
    }
}
