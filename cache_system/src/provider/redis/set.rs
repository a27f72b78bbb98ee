use super::{Connection, write_with_expiration};
use crate::command::CacheResponse;
use crate::command::set::*;
use crate::errors::ErrorCode;
use crate::keys::CacheKey;
use crate::values::CombineOperation;
use redis::RedisResult;

fn combine_command(operation: CombineOperation, store: bool) -> &'static str {
    match (operation, store) {
        (CombineOperation::Union, false) => "SUNION",
        (CombineOperation::Intersect, false) => "SINTER",
        (CombineOperation::Difference, false) => "SDIFF",
        (CombineOperation::Union, true) => "SUNIONSTORE",
        (CombineOperation::Intersect, true) => "SINTERSTORE",
        (CombineOperation::Difference, true) => "SDIFFSTORE",
    }
}

/// Composed source keys, `None` when any of them is empty
fn source_keys(keys: &[CacheKey]) -> Option<Vec<String>> {
    if keys.is_empty() {
        return None;
    }
    keys.iter().map(crate::provider::key_text).collect()
}

pub(super) async fn add(
    conn: &mut Connection,
    params: &SetAddParams,
) -> RedisResult<SetAddResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.members.is_empty() {
        return Ok(SetAddResponse::failure(ErrorCode::ValuesIsNullOrEmpty));
    }
    let mut command = redis::cmd("SADD");
    command.arg(&key).arg(&params.members);
    let added: i64 = write_with_expiration(conn, command, &key, params.expiration.as_ref()).await?;
    Ok(SetAddResponse {
        added,
        ..SetAddResponse::success()
    })
}

pub(super) async fn combine(
    conn: &mut Connection,
    params: &SetCombineParams,
) -> RedisResult<SetCombineResponse> {
    let Some(keys) = source_keys(&params.keys) else {
        return Ok(SetCombineResponse::failure(ErrorCode::KeyIsNullOrEmpty));
    };
    let mut members: Vec<String> = redis::cmd(combine_command(params.operation, false))
        .arg(&keys)
        .query_async(conn)
        .await?;
    members.sort();
    Ok(SetCombineResponse {
        members,
        ..SetCombineResponse::success()
    })
}

pub(super) async fn combine_and_store(
    conn: &mut Connection,
    params: &SetCombineAndStoreParams,
) -> RedisResult<SetCombineAndStoreResponse> {
    let destination = key_or_fail!(&params.destination_key, Ok);
    let Some(keys) = source_keys(&params.keys) else {
        return Ok(SetCombineAndStoreResponse::failure(ErrorCode::KeyIsNullOrEmpty));
    };
    let mut command = redis::cmd(combine_command(params.operation, true));
    command.arg(&destination).arg(&keys);
    let count: i64 =
        write_with_expiration(conn, command, &destination, params.expiration.as_ref()).await?;
    Ok(SetCombineAndStoreResponse {
        count,
        ..SetCombineAndStoreResponse::success()
    })
}

pub(super) async fn contains(
    conn: &mut Connection,
    params: &SetContainsParams,
) -> RedisResult<SetContainsResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let contains: bool = redis::cmd("SISMEMBER")
        .arg(&key)
        .arg(&params.member)
        .query_async(conn)
        .await?;
    Ok(SetContainsResponse {
        contains,
        ..SetContainsResponse::success()
    })
}

pub(super) async fn length(
    conn: &mut Connection,
    params: &SetLengthParams,
) -> RedisResult<SetLengthResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let length: i64 = redis::cmd("SCARD").arg(&key).query_async(conn).await?;
    Ok(SetLengthResponse {
        length,
        ..SetLengthResponse::success()
    })
}

pub(super) async fn members(
    conn: &mut Connection,
    params: &SetMembersParams,
) -> RedisResult<SetMembersResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let mut members: Vec<String> = redis::cmd("SMEMBERS").arg(&key).query_async(conn).await?;
    members.sort();
    Ok(SetMembersResponse {
        members,
        ..SetMembersResponse::success()
    })
}

pub(super) async fn move_member(
    conn: &mut Connection,
    params: &SetMoveParams,
) -> RedisResult<SetMoveResponse> {
    let source = key_or_fail!(&params.source_key, Ok);
    let destination = key_or_fail!(&params.destination_key, Ok);
    let mut command = redis::cmd("SMOVE");
    command.arg(&source).arg(&destination).arg(&params.member);
    let moved: bool =
        write_with_expiration(conn, command, &destination, params.expiration.as_ref()).await?;
    Ok(SetMoveResponse {
        moved,
        ..SetMoveResponse::success()
    })
}

pub(super) async fn pop(
    conn: &mut Connection,
    params: &SetPopParams,
) -> RedisResult<SetPopResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.count == 0 {
        return Ok(SetPopResponse::success());
    }
    let members: Vec<String> = redis::cmd("SPOP")
        .arg(&key)
        .arg(params.count)
        .query_async(conn)
        .await?;
    Ok(SetPopResponse {
        members,
        ..SetPopResponse::success()
    })
}

pub(super) async fn random_members(
    conn: &mut Connection,
    params: &SetRandomMembersParams,
) -> RedisResult<SetRandomMembersResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.exceeds_sample_limit() {
        return Ok(SetRandomMembersResponse::failure(ErrorCode::OffsetInvalid));
    }
    let members: Vec<String> = redis::cmd("SRANDMEMBER")
        .arg(&key)
        .arg(params.count)
        .query_async(conn)
        .await?;
    Ok(SetRandomMembersResponse {
        members,
        ..SetRandomMembersResponse::success()
    })
}

pub(super) async fn remove(
    conn: &mut Connection,
    params: &SetRemoveParams,
) -> RedisResult<SetRemoveResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.members.is_empty() {
        return Ok(SetRemoveResponse::success());
    }
    let removed: i64 = redis::cmd("SREM").arg(&key).arg(&params.members).query_async(conn).await?;
    Ok(SetRemoveResponse {
        removed,
        ..SetRemoveResponse::success()
    })
}
