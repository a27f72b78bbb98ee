use super::{Connection, write_with_expiration};
use crate::command::CacheResponse;
use crate::command::list::*;
use crate::entry::CacheExpiration;
use crate::errors::ErrorCode;
use chrono::Utc;
use redis::RedisResult;

async fn insert(
    conn: &mut Connection,
    key: &str,
    position: &str,
    pivot: &str,
    value: &str,
    expiration: Option<&CacheExpiration>,
) -> RedisResult<i64> {
    let length: i64 = redis::cmd("LINSERT")
        .arg(key)
        .arg(position)
        .arg(pivot)
        .arg(value)
        .query_async(conn)
        .await?;
    // Only refresh the expiration when something was inserted
    if length > 0 {
        if let Some(ttl) = expiration.and_then(|e| e.ttl_millis(Utc::now())) {
            let _: i64 = redis::cmd("PEXPIRE").arg(key).arg(ttl).query_async(conn).await?;
        }
    }
    Ok(length)
}

pub(super) async fn insert_before(
    conn: &mut Connection,
    params: &ListInsertBeforeParams,
) -> RedisResult<ListInsertBeforeResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let expiration = params.expiration.as_ref();
    let new_length = insert(conn, &key, "BEFORE", &params.pivot, &params.value, expiration).await?;
    Ok(ListInsertBeforeResponse {
        new_length,
        ..ListInsertBeforeResponse::success()
    })
}

pub(super) async fn insert_after(
    conn: &mut Connection,
    params: &ListInsertAfterParams,
) -> RedisResult<ListInsertAfterResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let expiration = params.expiration.as_ref();
    let new_length = insert(conn, &key, "AFTER", &params.pivot, &params.value, expiration).await?;
    Ok(ListInsertAfterResponse {
        new_length,
        ..ListInsertAfterResponse::success()
    })
}

pub(super) async fn get_by_index(
    conn: &mut Connection,
    params: &ListGetByIndexParams,
) -> RedisResult<ListGetByIndexResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let value: Option<String> = redis::cmd("LINDEX")
        .arg(&key)
        .arg(params.index)
        .query_async(conn)
        .await?;
    Ok(ListGetByIndexResponse {
        value,
        ..ListGetByIndexResponse::success()
    })
}

pub(super) async fn left_pop(
    conn: &mut Connection,
    params: &ListLeftPopParams,
) -> RedisResult<ListLeftPopResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let value: Option<String> = redis::cmd("LPOP").arg(&key).query_async(conn).await?;
    Ok(ListLeftPopResponse {
        value,
        ..ListLeftPopResponse::success()
    })
}

pub(super) async fn left_push(
    conn: &mut Connection,
    params: &ListLeftPushParams,
) -> RedisResult<ListLeftPushResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.values.is_empty() {
        return Ok(ListLeftPushResponse::failure(ErrorCode::ValuesIsNullOrEmpty));
    }
    let mut command = redis::cmd("LPUSH");
    command.arg(&key).arg(&params.values);
    let new_length: i64 =
        write_with_expiration(conn, command, &key, params.expiration.as_ref()).await?;
    Ok(ListLeftPushResponse {
        new_length,
        ..ListLeftPushResponse::success()
    })
}

pub(super) async fn length(
    conn: &mut Connection,
    params: &ListLengthParams,
) -> RedisResult<ListLengthResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let length: i64 = redis::cmd("LLEN").arg(&key).query_async(conn).await?;
    Ok(ListLengthResponse {
        length,
        ..ListLengthResponse::success()
    })
}

pub(super) async fn range(
    conn: &mut Connection,
    params: &ListRangeParams,
) -> RedisResult<ListRangeResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let values: Vec<String> = redis::cmd("LRANGE")
        .arg(&key)
        .arg(params.start)
        .arg(params.end)
        .query_async(conn)
        .await?;
    Ok(ListRangeResponse {
        values,
        ..ListRangeResponse::success()
    })
}

pub(super) async fn remove(
    conn: &mut Connection,
    params: &ListRemoveParams,
) -> RedisResult<ListRemoveResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let removed: i64 = redis::cmd("LREM")
        .arg(&key)
        .arg(params.count)
        .arg(&params.value)
        .query_async(conn)
        .await?;
    Ok(ListRemoveResponse {
        removed,
        ..ListRemoveResponse::success()
    })
}

pub(super) async fn right_pop(
    conn: &mut Connection,
    params: &ListRightPopParams,
) -> RedisResult<ListRightPopResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let value: Option<String> = redis::cmd("RPOP").arg(&key).query_async(conn).await?;
    Ok(ListRightPopResponse {
        value,
        ..ListRightPopResponse::success()
    })
}

pub(super) async fn right_pop_left_push(
    conn: &mut Connection,
    params: &ListRightPopLeftPushParams,
) -> RedisResult<ListRightPopLeftPushResponse> {
    let source = key_or_fail!(&params.source_key, Ok);
    let destination = key_or_fail!(&params.destination_key, Ok);
    let mut command = redis::cmd("RPOPLPUSH");
    command.arg(&source).arg(&destination);
    let value: Option<String> =
        write_with_expiration(conn, command, &destination, params.expiration.as_ref()).await?;
    Ok(ListRightPopLeftPushResponse {
        value,
        ..ListRightPopLeftPushResponse::success()
    })
}

pub(super) async fn right_push(
    conn: &mut Connection,
    params: &ListRightPushParams,
) -> RedisResult<ListRightPushResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.values.is_empty() {
        return Ok(ListRightPushResponse::failure(ErrorCode::ValuesIsNullOrEmpty));
    }
    let mut command = redis::cmd("RPUSH");
    command.arg(&key).arg(&params.values);
    let new_length: i64 =
        write_with_expiration(conn, command, &key, params.expiration.as_ref()).await?;
    Ok(ListRightPushResponse {
        new_length,
        ..ListRightPushResponse::success()
    })
}

pub(super) async fn set_by_index(
    conn: &mut Connection,
    params: &ListSetByIndexParams,
) -> RedisResult<ListSetByIndexResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let () = redis::cmd("LSET")
        .arg(&key)
        .arg(params.index)
        .arg(&params.value)
        .query_async(conn)
        .await?;
    Ok(ListSetByIndexResponse::success())
}

pub(super) async fn trim(
    conn: &mut Connection,
    params: &ListTrimParams,
) -> RedisResult<ListTrimResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let () = redis::cmd("LTRIM")
        .arg(&key)
        .arg(params.start)
        .arg(params.end)
        .query_async(conn)
        .await?;
    Ok(ListTrimResponse::success())
}
