use super::Connection;
use crate::command::CacheResponse;
use crate::command::keys::*;
use crate::entry::{CacheValueType, SetCondition};
use crate::errors::ErrorCode;
use crate::keys::CacheKey;
use crate::provider::key_text;
use crate::values::SortOrder;
use chrono::Utc;
use redis::{Cmd, RedisResult};
use std::time::Duration;

/// Composed keys of a multi-key command, `None` when any of them is empty
fn all_keys(keys: &[CacheKey]) -> Option<Vec<String>> {
    if keys.is_empty() {
        return None;
    }
    keys.iter().map(key_text).collect()
}

pub(super) async fn delete(
    conn: &mut Connection,
    params: &KeyDeleteParams,
) -> RedisResult<KeyDeleteResponse> {
    let Some(keys) = all_keys(&params.keys) else {
        return Ok(KeyDeleteResponse::failure(ErrorCode::KeyIsNullOrEmpty));
    };
    let deleted: i64 = redis::cmd("DEL").arg(&keys).query_async(conn).await?;
    Ok(KeyDeleteResponse {
        deleted,
        ..KeyDeleteResponse::success()
    })
}

pub(super) async fn dump(
    conn: &mut Connection,
    params: &KeyDumpParams,
) -> RedisResult<KeyDumpResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let value: Option<Vec<u8>> = redis::cmd("DUMP").arg(&key).query_async(conn).await?;
    Ok(match value {
        Some(value) => KeyDumpResponse {
            value,
            ..KeyDumpResponse::success()
        },
        None => KeyDumpResponse::failure(ErrorCode::KeyNotExist),
    })
}

pub(super) async fn exist(
    conn: &mut Connection,
    params: &KeyExistParams,
) -> RedisResult<KeyExistResponse> {
    let Some(keys) = all_keys(&params.keys) else {
        return Ok(KeyExistResponse::failure(ErrorCode::KeyIsNullOrEmpty));
    };
    let count: i64 = redis::cmd("EXISTS").arg(&keys).query_async(conn).await?;
    Ok(KeyExistResponse {
        count,
        ..KeyExistResponse::success()
    })
}

/// Drop the expiration of `key`, reporting whether the key exists
async fn persist_existing(conn: &mut Connection, key: &str) -> RedisResult<bool> {
    let (exists, _): (bool, i64) = redis::pipe()
        .atomic()
        .cmd("EXISTS")
        .arg(key)
        .cmd("PERSIST")
        .arg(key)
        .query_async(conn)
        .await?;
    Ok(exists)
}

pub(super) async fn expire(
    conn: &mut Connection,
    params: &KeyExpireParams,
) -> RedisResult<KeyExpireResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let applied = match params.expiration.ttl_millis(Utc::now()) {
        Some(ttl) => {
            let updated: bool = redis::cmd("PEXPIRE").arg(&key).arg(ttl).query_async(conn).await?;
            updated
        }
        None => persist_existing(conn, &key).await?,
    };
    Ok(if applied {
        KeyExpireResponse::success()
    } else {
        KeyExpireResponse::failure(ErrorCode::KeyNotExist)
    })
}

pub(super) async fn migrate(
    conn: &mut Connection,
    params: &KeyMigrateParams,
) -> RedisResult<KeyMigrateResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let destination = &params.destination;
    let Some(endpoint) = destination.endpoints.first() else {
        return Ok(KeyMigrateResponse::failure_with(
            ErrorCode::ServerNotConfigured,
            format!("migration target '{}' has no endpoint", destination.name),
        ));
    };

    let mut command = redis::cmd("MIGRATE");
    command
        .arg(&endpoint.host)
        .arg(endpoint.port)
        .arg(&key)
        .arg(destination.database_or_default())
        .arg(params.timeout_ms);
    if params.copy {
        command.arg("COPY");
    }
    if params.replace {
        command.arg("REPLACE");
    }
    match (&destination.username, &destination.password) {
        (Some(user), Some(password)) => {
            command.arg("AUTH2").arg(user).arg(password);
        }
        (None, Some(password)) => {
            command.arg("AUTH").arg(password);
        }
        _ => {}
    }
    let reply: String = command.query_async(conn).await?;
    Ok(if reply.eq_ignore_ascii_case("NOKEY") {
        KeyMigrateResponse::failure(ErrorCode::KeyNotExist)
    } else {
        KeyMigrateResponse::success()
    })
}

pub(super) async fn move_to_database(
    conn: &mut Connection,
    params: &KeyMoveParams,
) -> RedisResult<KeyMoveResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let moved: bool = redis::cmd("MOVE").arg(&key).arg(params.database).query_async(conn).await?;
    Ok(KeyMoveResponse {
        moved,
        ..KeyMoveResponse::success()
    })
}

pub(super) async fn persist(
    conn: &mut Connection,
    params: &KeyPersistParams,
) -> RedisResult<KeyPersistResponse> {
    let key = key_or_fail!(&params.key, Ok);
    Ok(if persist_existing(conn, &key).await? {
        KeyPersistResponse::success()
    } else {
        KeyPersistResponse::failure(ErrorCode::KeyNotExist)
    })
}

pub(super) async fn random(
    conn: &mut Connection,
    _params: &KeyRandomParams,
) -> RedisResult<KeyRandomResponse> {
    let key: Option<String> = redis::cmd("RANDOMKEY").query_async(conn).await?;
    Ok(KeyRandomResponse {
        key,
        ..KeyRandomResponse::success()
    })
}

pub(super) async fn rename(
    conn: &mut Connection,
    params: &KeyRenameParams,
) -> RedisResult<KeyRenameResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let new_key = key_or_fail!(&params.new_key, Ok);
    match &params.when {
        SetCondition::Always => {
            let () = redis::cmd("RENAME").arg(&key).arg(&new_key).query_async(conn).await?;
            Ok(KeyRenameResponse::success())
        }
        SetCondition::IfNotExists => {
            let renamed: bool = redis::cmd("RENAMENX")
                .arg(&key)
                .arg(&new_key)
                .query_async(conn)
                .await?;
            Ok(if renamed {
                KeyRenameResponse::success()
            } else {
                KeyRenameResponse::failure(ErrorCode::NoResult)
            })
        }
        _ => Ok(KeyRenameResponse::failure_with(
            ErrorCode::OperationUnsupported,
            "rename supports only Always and IfNotExists",
        )),
    }
}

pub(super) async fn restore(
    conn: &mut Connection,
    params: &KeyRestoreParams,
) -> RedisResult<KeyRestoreResponse> {
    let key = key_or_fail!(&params.key, Ok);
    if params.value.is_empty() {
        return Ok(KeyRestoreResponse::failure(ErrorCode::ValuesIsNullOrEmpty));
    }
    let ttl = params
        .expiration
        .as_ref()
        .and_then(|e| e.ttl_millis(Utc::now()))
        .unwrap_or(0);
    let mut command = redis::cmd("RESTORE");
    command.arg(&key).arg(ttl).arg(&params.value);
    if params.replace {
        command.arg("REPLACE");
    }
    let () = command.query_async(conn).await?;
    Ok(KeyRestoreResponse::success())
}

pub(super) async fn scan(
    conn: &mut Connection,
    params: &KeyScanParams,
) -> RedisResult<KeyScanResponse> {
    let mut command = redis::cmd("SCAN");
    command.arg(params.cursor);
    if let Some(pattern) = &params.pattern {
        command.arg("MATCH").arg(pattern);
    }
    if params.page_size > 0 {
        command.arg("COUNT").arg(params.page_size);
    }
    let (cursor, keys): (u64, Vec<String>) = command.query_async(conn).await?;
    Ok(KeyScanResponse {
        cursor,
        keys,
        ..KeyScanResponse::success()
    })
}

/// `SORT key [BY] [LIMIT] [GET...] [DESC] [ALPHA]` without the STORE clause
fn sort_command(
    key: &str,
    order: SortOrder,
    alpha: bool,
    offset: usize,
    count: Option<usize>,
    by_pattern: Option<&str>,
    get_patterns: &[String],
) -> Cmd {
    let mut command = redis::cmd("SORT");
    command.arg(key);
    if let Some(pattern) = by_pattern {
        command.arg("BY").arg(pattern);
    }
    if offset > 0 || count.is_some() {
        command
            .arg("LIMIT")
            .arg(offset)
            .arg(count.map_or(-1, |count| count as i64));
    }
    for pattern in get_patterns {
        command.arg("GET").arg(pattern);
    }
    if order == SortOrder::Descending {
        command.arg("DESC");
    }
    if alpha {
        command.arg("ALPHA");
    }
    command
}

pub(super) async fn sort(
    conn: &mut Connection,
    params: &KeySortParams,
) -> RedisResult<KeySortResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let command = sort_command(
        &key,
        params.order,
        params.alpha,
        params.offset,
        params.count,
        params.by_pattern.as_deref(),
        &params.get_patterns,
    );
    let values: Vec<Option<String>> = command.query_async(conn).await?;
    Ok(KeySortResponse {
        // GET patterns that match nothing yield nil elements
        values: values.into_iter().map(Option::unwrap_or_default).collect(),
        ..KeySortResponse::success()
    })
}

pub(super) async fn sort_and_store(
    conn: &mut Connection,
    params: &KeySortAndStoreParams,
) -> RedisResult<KeySortAndStoreResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let destination = key_or_fail!(&params.destination_key, Ok);
    let mut command = sort_command(
        &key,
        params.order,
        params.alpha,
        params.offset,
        params.count,
        params.by_pattern.as_deref(),
        &params.get_patterns,
    );
    command.arg("STORE").arg(&destination);
    let length: i64 = command.query_async(conn).await?;
    Ok(KeySortAndStoreResponse {
        length,
        ..KeySortAndStoreResponse::success()
    })
}

pub(super) async fn key_type(
    conn: &mut Connection,
    params: &KeyTypeParams,
) -> RedisResult<KeyTypeResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let name: String = redis::cmd("TYPE").arg(&key).query_async(conn).await?;
    Ok(KeyTypeResponse {
        value_type: CacheValueType::from_type_name(&name),
        ..KeyTypeResponse::success()
    })
}

pub(super) async fn time_to_live(
    conn: &mut Connection,
    params: &KeyTimeToLiveParams,
) -> RedisResult<KeyTimeToLiveResponse> {
    let key = key_or_fail!(&params.key, Ok);
    let millis: i64 = redis::cmd("PTTL").arg(&key).query_async(conn).await?;
    Ok(match millis {
        -2 => KeyTimeToLiveResponse::failure(ErrorCode::KeyNotExist),
        millis if millis < 0 => KeyTimeToLiveResponse::success(),
        millis => KeyTimeToLiveResponse {
            time_to_live: Some(Duration::from_millis(millis as u64)),
            ..KeyTimeToLiveResponse::success()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &Cmd) -> Vec<String> {
        command
            .args_iter()
            .filter_map(|arg| match arg {
                redis::Arg::Simple(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                redis::Arg::Cursor => None,
            })
            .collect()
    }

    #[test]
    fn test_sort_command_arguments() {
        let gets = vec!["user:*->name".to_string()];
        let command =
            sort_command("ids", SortOrder::Descending, true, 2, Some(5), Some("w_*"), &gets);
        assert_eq!(
            args(&command),
            vec![
                "SORT",
                "ids",
                "BY",
                "w_*",
                "LIMIT",
                "2",
                "5",
                "GET",
                "user:*->name",
                "DESC",
                "ALPHA"
            ]
        );

        let command = sort_command("ids", SortOrder::Ascending, false, 3, None, None, &[]);
        assert_eq!(args(&command), vec!["SORT", "ids", "LIMIT", "3", "-1"]);
    }
}
