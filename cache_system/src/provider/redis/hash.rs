use super::{Connection, write_with_expiration};
use crate::command::CacheResponse;
use crate::command::hash::*;
use crate::entry::CacheExpiration;
use crate::errors::ErrorCode;
use crate::values::CacheNumber;
use redis::RedisResult;
use std::collections::HashMap;

pub(super) async fn delete(
    conn: &mut Connection,
    params: &HashDeleteParams,
) -> RedisResult<HashDeleteResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.fields.is_empty() {
        return Ok(HashDeleteResponse::success());
    }
    let deleted: i64 = redis::cmd("HDEL").arg(&key).arg(&params.fields).query_async(conn).await?;
    Ok(HashDeleteResponse {
        deleted,
        ..HashDeleteResponse::success()
    })
}

pub(super) async fn exist(
    conn: &mut Connection,
    params: &HashExistParams,
) -> RedisResult<HashExistResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let exists: bool = redis::cmd("HEXISTS").arg(&key).arg(&params.field).query_async(conn).await?;
    Ok(HashExistResponse {
        exists,
        ..HashExistResponse::success()
    })
}

pub(super) async fn get(
    conn: &mut Connection,
    params: &HashGetParams,
) -> RedisResult<HashGetResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let value: Option<String> = redis::cmd("HGET")
        .arg(&key)
        .arg(&params.field)
        .query_async(conn)
        .await?;
    Ok(HashGetResponse {
        value,
        ..HashGetResponse::success()
    })
}

pub(super) async fn get_all(
    conn: &mut Connection,
    params: &HashGetAllParams,
) -> RedisResult<HashGetAllResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let values: HashMap<String, String> = redis::cmd("HGETALL").arg(&key).query_async(conn).await?;
    Ok(HashGetAllResponse {
        values,
        ..HashGetAllResponse::success()
    })
}

/// HINCRBY for integers, HINCRBYFLOAT otherwise
async fn add_to_field(
    conn: &mut Connection,
    key: &str,
    field: &str,
    delta: CacheNumber,
    expiration: Option<&CacheExpiration>,
) -> RedisResult<Option<CacheNumber>> {
    match delta {
        CacheNumber::Integer(value) => {
            let mut command = redis::cmd("HINCRBY");
            command.arg(key).arg(field).arg(value);
            let total: i64 = write_with_expiration(conn, command, key, expiration).await?;
            Ok(Some(CacheNumber::Integer(total)))
        }
        CacheNumber::Float(value) => {
            let mut command = redis::cmd("HINCRBYFLOAT");
            command.arg(key).arg(field).arg(value);
            let total: String = write_with_expiration(conn, command, key, expiration).await?;
            Ok(CacheNumber::parse(&total))
        }
    }
}

pub(super) async fn increment(
    conn: &mut Connection,
    params: &HashIncrementParams,
) -> RedisResult<HashIncrementResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let expiration = params.expiration.as_ref();
    let Some(new_value) = add_to_field(conn, &key, &params.field, params.value, expiration).await?
    else {
        return Ok(HashIncrementResponse::failure(ErrorCode::ValueCannotBeCalculated));
    };
    Ok(HashIncrementResponse {
        new_value,
        ..HashIncrementResponse::success()
    })
}

pub(super) async fn decrement(
    conn: &mut Connection,
    params: &HashDecrementParams,
) -> RedisResult<HashDecrementResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let Some(delta) = params.value.checked_neg() else {
        return Ok(HashDecrementResponse::failure(ErrorCode::ValueCannotBeCalculated));
    };
    let expiration = params.expiration.as_ref();
    let Some(new_value) = add_to_field(conn, &key, &params.field, delta, expiration).await? else {
        return Ok(HashDecrementResponse::failure(ErrorCode::ValueCannotBeCalculated));
    };
    Ok(HashDecrementResponse {
        new_value,
        ..HashDecrementResponse::success()
    })
}

pub(super) async fn keys(
    conn: &mut Connection,
    params: &HashKeysParams,
) -> RedisResult<HashKeysResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let mut fields: Vec<String> = redis::cmd("HKEYS").arg(&key).query_async(conn).await?;
    fields.sort();
    Ok(HashKeysResponse {
        fields,
        ..HashKeysResponse::success()
    })
}

pub(super) async fn length(
    conn: &mut Connection,
    params: &HashLengthParams,
) -> RedisResult<HashLengthResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let length: i64 = redis::cmd("HLEN").arg(&key).query_async(conn).await?;
    Ok(HashLengthResponse {
        length,
        ..HashLengthResponse::success()
    })
}

pub(super) async fn set(
    conn: &mut Connection,
    params: &HashSetParams,
) -> RedisResult<HashSetResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.items.is_empty() {
        return Ok(HashSetResponse::failure(ErrorCode::ValuesIsNullOrEmpty));
    }
    let mut command = redis::cmd("HSET");
    command.arg(&key);
    for (field, value) in &params.items {
        command.arg(field).arg(value);
    }
    let _: i64 = write_with_expiration(conn, command, &key, params.expiration.as_ref()).await?;
    Ok(HashSetResponse::success())
}

/// Values ordered by field, matching `keys`
pub(super) async fn values(
    conn: &mut Connection,
    params: &HashValuesParams,
) -> RedisResult<HashValuesResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let all: HashMap<String, String> = redis::cmd("HGETALL").arg(&key).query_async(conn).await?;
    let mut fields: Vec<(String, String)> = all.into_iter().collect();
    fields.sort();
    Ok(HashValuesResponse {
        values: fields.into_iter().map(|(_, value)| value).collect(),
        ..HashValuesResponse::success()
    })
}

pub(super) async fn scan(
    conn: &mut Connection,
    params: &HashScanParams,
) -> RedisResult<HashScanResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let mut command = redis::cmd("HSCAN");
    command.arg(&key).arg(params.cursor);
    if let Some(pattern) = &params.pattern {
        command.arg("MATCH").arg(pattern);
    }
    if params.page_size > 0 {
        command.arg("COUNT").arg(params.page_size);
    }
    let (cursor, values): (u64, HashMap<String, String>) = command.query_async(conn).await?;
    Ok(HashScanResponse {
        cursor,
        values,
        ..HashScanResponse::success()
    })
}
