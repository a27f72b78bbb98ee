use super::{Connection, lossy, write_with_expiration};
use crate::command::CacheResponse;
use crate::command::string::*;
use crate::entry::{CacheEntry, CacheExpiration, SetCondition};
use crate::errors::ErrorCode;
use crate::provider::key_text;
use crate::values::{BitOperation, CacheNumber};
use chrono::Utc;
use redis::{RedisResult, Script};
use std::sync::LazyLock;

/// Largest bit offset accepted by bit writes (512 MiB values)
const MAX_BIT_OFFSET: i64 = (1 << 32) - 1;

/// Compare-and-set: `ARGV[2] == "1"` writes on equality, otherwise on difference
static CONDITIONAL_SET: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local current = redis.call('GET', KEYS[1])
local same = current == ARGV[1]
if (ARGV[2] == '1') ~= same then
    return 0
end
if tonumber(ARGV[4]) > 0 then
    redis.call('SET', KEYS[1], ARGV[3], 'PX', ARGV[4])
else
    redis.call('SET', KEYS[1], ARGV[3])
end
return 1
"#,
    )
});

/// Write one entry, returning the failure code when its condition blocked it
async fn set_entry(
    conn: &mut Connection,
    key: &str,
    entry: &CacheEntry,
) -> RedisResult<Option<ErrorCode>> {
    let ttl = entry
        .expiration
        .as_ref()
        .and_then(|e| e.ttl_millis(Utc::now()))
        .unwrap_or(0);

    let (expected, on_equal) = match &entry.when {
        SetCondition::Equal(expected) => (expected, true),
        SetCondition::NotEqual(expected) => (expected, false),
        condition => {
            let mut command = redis::cmd("SET");
            command.arg(key).arg(&entry.value);
            if ttl > 0 {
                command.arg("PX").arg(ttl);
            }
            match condition {
                SetCondition::IfExists => {
                    command.arg("XX");
                }
                SetCondition::IfNotExists => {
                    command.arg("NX");
                }
                _ => {}
            }
            let reply: Option<String> = command.query_async(conn).await?;
            return Ok(match (reply, condition) {
                (Some(_), _) => None,
                (None, SetCondition::IfExists) => Some(ErrorCode::KeyNotExist),
                (None, _) => Some(ErrorCode::NoResult),
            });
        }
    };

    let written: i64 = CONDITIONAL_SET
        .key(key)
        .arg(expected)
        .arg(if on_equal { "1" } else { "0" })
        .arg(&entry.value)
        .arg(ttl)
        .invoke_async(conn)
        .await?;
    Ok((written == 0).then_some(ErrorCode::NoResult))
}

pub(super) async fn set(
    conn: &mut Connection,
    params: &StringSetParams,
) -> RedisResult<StringSetResponse> {
    if params.entries.is_empty() {
        return Ok(StringSetResponse::failure(ErrorCode::ValuesIsNullOrEmpty));
    }
    let mut response = StringSetResponse::success();
    let mut first_failure = None;
    for entry in &params.entries {
        let outcome = match key_text(&entry.key) {
            Some(key) => set_entry(conn, &key, entry).await?,
            None => Some(ErrorCode::KeyIsNullOrEmpty),
        };
        if let Some(code) = outcome {
            first_failure.get_or_insert(code);
        }
        response.results.push(StringSetResult {
            key: entry.key.to_text(),
            stored: outcome.is_none(),
        });
    }
    if let Some(code) = first_failure {
        response.fail(code);
    }
    Ok(response)
}

pub(super) async fn get(
    conn: &mut Connection,
    params: &StringGetParams,
) -> RedisResult<StringGetResponse> {
    let keys: Vec<String> = params.keys.iter().filter_map(key_text).collect();
    if keys.is_empty() {
        return Ok(StringGetResponse::failure(ErrorCode::KeyIsNullOrEmpty));
    }
    let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET").arg(&keys).query_async(conn).await?;
    let mut response = StringGetResponse {
        values: keys
            .into_iter()
            .zip(values)
            .map(|(key, value)| StringValue {
                key,
                value: value.map(lossy),
            })
            .collect(),
        ..StringGetResponse::success()
    };
    if response.values.iter().all(|v| v.value.is_none()) {
        response.fail(ErrorCode::KeyNotExist);
    }
    Ok(response)
}

pub(super) async fn append(
    conn: &mut Connection,
    params: &StringAppendParams,
) -> RedisResult<StringAppendResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let mut command = redis::cmd("APPEND");
    command.arg(&key).arg(&params.value);
    let new_length: i64 =
        write_with_expiration(conn, command, &key, params.expiration.as_ref()).await?;
    Ok(StringAppendResponse {
        new_length,
        ..StringAppendResponse::success()
    })
}

pub(super) async fn bit_count(
    conn: &mut Connection,
    params: &StringBitCountParams,
) -> RedisResult<StringBitCountResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let bit_count: i64 = redis::cmd("BITCOUNT")
        .arg(&key)
        .arg(params.start)
        .arg(params.end)
        .query_async(conn)
        .await?;
    Ok(StringBitCountResponse {
        bit_count,
        ..StringBitCountResponse::success()
    })
}

pub(super) async fn bit_operation(
    conn: &mut Connection,
    params: &StringBitOperationParams,
) -> RedisResult<StringBitOperationResponse> {
    let destination = key_or_fail!(&params.destination_key, Ok);
    if params.keys.is_empty() {
        return Ok(StringBitOperationResponse::failure(ErrorCode::ValuesIsNullOrEmpty));
    }
    if params.operation == BitOperation::Not && params.keys.len() != 1 {
        return Ok(StringBitOperationResponse::failure_with(
            ErrorCode::OperationUnsupported,
            "bitwise NOT takes exactly one source key",
        ));
    }
    let mut sources = Vec::with_capacity(params.keys.len());
    for key in &params.keys {
        sources.push(key_or_fail!(key, Ok));
    }
    let operation = match params.operation {
        BitOperation::And => "AND",
        BitOperation::Or => "OR",
        BitOperation::Xor => "XOR",
        BitOperation::Not => "NOT",
    };
    let mut command = redis::cmd("BITOP");
    command.arg(operation).arg(&destination).arg(&sources);
    let length: i64 =
        write_with_expiration(conn, command, &destination, params.expiration.as_ref()).await?;
    Ok(StringBitOperationResponse {
        length,
        ..StringBitOperationResponse::success()
    })
}

pub(super) async fn bit_position(
    conn: &mut Connection,
    params: &StringBitPositionParams,
) -> RedisResult<StringBitPositionResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let mut command = redis::cmd("BITPOS");
    command.arg(&key).arg(u8::from(params.bit)).arg(params.start);
    // An explicit end changes how a missing clear bit is reported
    if params.end != -1 {
        command.arg(params.end);
    }
    let position: i64 = command.query_async(conn).await?;
    Ok(StringBitPositionResponse {
        position,
        ..StringBitPositionResponse::success()
    })
}

/// INCRBY for integers, INCRBYFLOAT otherwise
async fn add_number(
    conn: &mut Connection,
    key: &str,
    delta: CacheNumber,
    expiration: Option<&CacheExpiration>,
) -> RedisResult<Option<CacheNumber>> {
    match delta {
        CacheNumber::Integer(value) => {
            let mut command = redis::cmd("INCRBY");
            command.arg(key).arg(value);
            let total: i64 = write_with_expiration(conn, command, key, expiration).await?;
            Ok(Some(CacheNumber::Integer(total)))
        }
        CacheNumber::Float(value) => {
            let mut command = redis::cmd("INCRBYFLOAT");
            command.arg(key).arg(value);
            let total: String = write_with_expiration(conn, command, key, expiration).await?;
            Ok(CacheNumber::parse(&total))
        }
    }
}

pub(super) async fn increment(
    conn: &mut Connection,
    params: &StringIncrementParams,
) -> RedisResult<StringIncrementResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let expiration = params.expiration.as_ref();
    let Some(new_value) = add_number(conn, &key, params.value, expiration).await? else {
        return Ok(StringIncrementResponse::failure(ErrorCode::ValueCannotBeCalculated));
    };
    Ok(StringIncrementResponse {
        new_value,
        ..StringIncrementResponse::success()
    })
}

pub(super) async fn decrement(
    conn: &mut Connection,
    params: &StringDecrementParams,
) -> RedisResult<StringDecrementResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let Some(delta) = params.value.checked_neg() else {
        return Ok(StringDecrementResponse::failure(ErrorCode::ValueCannotBeCalculated));
    };
    let Some(new_value) = add_number(conn, &key, delta, params.expiration.as_ref()).await? else {
        return Ok(StringDecrementResponse::failure(ErrorCode::ValueCannotBeCalculated));
    };
    Ok(StringDecrementResponse {
        new_value,
        ..StringDecrementResponse::success()
    })
}

pub(super) async fn get_bit(
    conn: &mut Connection,
    params: &StringGetBitParams,
) -> RedisResult<StringGetBitResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.offset < 0 {
        return Ok(StringGetBitResponse::failure(ErrorCode::OffsetLessThanZero));
    }
    let bit: u8 = redis::cmd("GETBIT").arg(&key).arg(params.offset).query_async(conn).await?;
    Ok(StringGetBitResponse {
        bit: bit == 1,
        ..StringGetBitResponse::success()
    })
}

pub(super) async fn get_range(
    conn: &mut Connection,
    params: &StringGetRangeParams,
) -> RedisResult<StringGetRangeResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let bytes: Vec<u8> = redis::cmd("GETRANGE")
        .arg(&key)
        .arg(params.start)
        .arg(params.end)
        .query_async(conn)
        .await?;
    Ok(StringGetRangeResponse {
        value: lossy(bytes),
        ..StringGetRangeResponse::success()
    })
}

pub(super) async fn get_set(
    conn: &mut Connection,
    params: &StringGetSetParams,
) -> RedisResult<StringGetSetResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let old: Option<Vec<u8>> = redis::cmd("GETSET")
        .arg(&key)
        .arg(&params.new_value)
        .query_async(conn)
        .await?;
    Ok(StringGetSetResponse {
        old_value: old.map(lossy),
        ..StringGetSetResponse::success()
    })
}

pub(super) async fn length(
    conn: &mut Connection,
    params: &StringLengthParams,
) -> RedisResult<StringLengthResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let length: i64 = redis::cmd("STRLEN").arg(&key).query_async(conn).await?;
    Ok(StringLengthResponse {
        length,
        ..StringLengthResponse::success()
    })
}

pub(super) async fn set_bit(
    conn: &mut Connection,
    params: &StringSetBitParams,
) -> RedisResult<StringSetBitResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.offset < 0 {
        return Ok(StringSetBitResponse::failure(ErrorCode::OffsetLessThanZero));
    }
    if params.offset > MAX_BIT_OFFSET {
        return Ok(StringSetBitResponse::failure(ErrorCode::OffsetInvalid));
    }
    let mut command = redis::cmd("SETBIT");
    command.arg(&key).arg(params.offset).arg(u8::from(params.bit));
    let old: u8 = write_with_expiration(conn, command, &key, params.expiration.as_ref()).await?;
    Ok(StringSetBitResponse {
        old_bit: old == 1,
        ..StringSetBitResponse::success()
    })
}

pub(super) async fn set_range(
    conn: &mut Connection,
    params: &StringSetRangeParams,
) -> RedisResult<StringSetRangeResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.offset < 0 {
        return Ok(StringSetRangeResponse::failure(ErrorCode::OffsetLessThanZero));
    }
    if params.offset > MAX_BIT_OFFSET / 8 {
        return Ok(StringSetRangeResponse::failure(ErrorCode::OffsetInvalid));
    }
    let mut command = redis::cmd("SETRANGE");
    command.arg(&key).arg(params.offset).arg(&params.value);
    let new_length: i64 =
        write_with_expiration(conn, command, &key, params.expiration.as_ref()).await?;
    Ok(StringSetRangeResponse {
        new_length,
        ..StringSetRangeResponse::success()
    })
}
