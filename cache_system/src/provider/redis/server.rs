use super::{Connection, RedisProvider};
use crate::command::server::*;
use crate::command::{CacheResponse, CommandDescriptor};
use crate::errors::{CacheError, ErrorCode};
use crate::server::CacheServer;
use chrono::DateTime;
use redis::RedisResult;
use std::collections::{BTreeMap, HashMap};

/// Failure for administrative commands on servers that do not allow them
fn admin_denied<R: CacheResponse>(server: &CacheServer, operation: &str) -> Option<R> {
    (!server.allow_admin).then(|| {
        R::failure_with(
            ErrorCode::OperationUnsupported,
            format!("{} requires admin mode on server '{}'", operation, server.name),
        )
    })
}

/// Key counts per database index from an `INFO keyspace` reply
fn parse_keyspace(info: &str) -> BTreeMap<u32, u64> {
    info.lines()
        .filter_map(|line| {
            let (name, fields) = line.trim().split_once(':')?;
            let index = name.strip_prefix("db")?.parse().ok()?;
            let keys = fields
                .split(',')
                .find_map(|field| field.strip_prefix("keys="))?
                .parse()
                .ok()?;
            Some((index, keys))
        })
        .collect()
}

/// FLUSHDB on every listed database; databases other than the server's own
/// are flushed over a short-lived connection
pub(super) async fn clear_data(
    provider: &RedisProvider,
    server: &CacheServer,
    params: &ClearDataParams,
) -> Result<ClearDataResponse, CacheError> {
    if let Some(denied) = admin_denied(server, "clear data") {
        return Ok(denied);
    }
    let own = server.database_or_default();
    let targets = if params.databases.is_empty() {
        vec![own]
    } else {
        params.databases.clone()
    };

    for index in targets {
        let target = server.clone().with_database(index);
        let mut conn = if index == own {
            provider.connection(server).await?
        } else {
            provider.open(&target).await?
        };
        let flushed = provider
            .finish(&target, params.operation(), async {
                let () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
                Ok::<_, redis::RedisError>(ClearDataResponse::success())
            })
            .await?;
        if !flushed.is_success() {
            return Ok(flushed);
        }
        debug_log!("Flushed database {} of server '{}'", index, server.name);
    }
    Ok(ClearDataResponse::success())
}

/// Databases holding keys plus the server's own database
pub(super) async fn get_all_databases(
    conn: &mut Connection,
    server: &CacheServer,
    _params: &GetAllDatabasesParams,
) -> RedisResult<GetAllDatabasesResponse> {
    let info: String = redis::cmd("INFO").arg("keyspace").query_async(conn).await?;
    let mut counts = parse_keyspace(&info);
    counts.entry(server.database_or_default()).or_insert(0);
    Ok(GetAllDatabasesResponse {
        databases: counts
            .into_iter()
            .map(|(index, key_count)| CacheDatabase {
                index,
                name: format!("db{}", index),
                key_count,
            })
            .collect(),
        ..GetAllDatabasesResponse::success()
    })
}

pub(super) async fn get_keys(
    conn: &mut Connection,
    _server: &CacheServer,
    params: &GetKeysParams,
) -> RedisResult<GetKeysResponse> {
    let mut keys: Vec<String> = redis::cmd("KEYS")
        .arg(params.pattern.as_deref().unwrap_or("*"))
        .query_async(conn)
        .await?;
    keys.sort();
    Ok(GetKeysResponse {
        keys,
        ..GetKeysResponse::success()
    })
}

pub(super) async fn get_last_save(
    conn: &mut Connection,
    _server: &CacheServer,
    _params: &GetLastSaveParams,
) -> RedisResult<GetLastSaveResponse> {
    let seconds: i64 = redis::cmd("LASTSAVE").query_async(conn).await?;
    Ok(GetLastSaveResponse {
        last_save: DateTime::from_timestamp(seconds, 0),
        ..GetLastSaveResponse::success()
    })
}

pub(super) async fn get_config(
    conn: &mut Connection,
    server: &CacheServer,
    params: &GetConfigParams,
) -> RedisResult<GetConfigResponse> {
    if let Some(denied) = admin_denied(server, "get config") {
        return Ok(denied);
    }
    let config: HashMap<String, String> = redis::cmd("CONFIG")
        .arg("GET")
        .arg(params.pattern.as_deref().unwrap_or("*"))
        .query_async(conn)
        .await?;
    Ok(GetConfigResponse {
        config,
        ..GetConfigResponse::success()
    })
}

/// The server closes the connection on success, so a dropped connection
/// counts as a completed shutdown
pub(super) async fn shutdown(
    conn: &mut Connection,
    server: &CacheServer,
    params: &ShutdownParams,
) -> RedisResult<ShutdownResponse> {
    if let Some(denied) = admin_denied(server, "shutdown") {
        return Ok(denied);
    }
    let reply: RedisResult<()> = redis::cmd("SHUTDOWN")
        .arg(if params.save { "SAVE" } else { "NOSAVE" })
        .query_async(conn)
        .await;
    match reply {
        Ok(()) => Ok(ShutdownResponse::success()),
        Err(e) if e.is_io_error() || e.is_connection_dropped() => {
            tracing::info!("Redis server '{}' shut down", server.name);
            Ok(ShutdownResponse::success())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerType;

    #[test]
    fn test_parse_keyspace() {
        let info =
            "# Keyspace\r\ndb0:keys=12,expires=1,avg_ttl=0\r\ndb3:keys=4,expires=0,avg_ttl=0\r\n";
        let counts = parse_keyspace(info);
        assert_eq!(counts.get(&0), Some(&12));
        assert_eq!(counts.get(&3), Some(&4));
        assert_eq!(counts.len(), 2);
        assert!(parse_keyspace("# Keyspace\r\n").is_empty());
    }

    #[test]
    fn test_admin_commands_need_admin_mode() {
        let server = CacheServer::new("locked", ServerType::Redis);
        let denied: Option<ShutdownResponse> = admin_denied(&server, "shutdown");
        assert_eq!(denied.and_then(|r| r.code()), Some(ErrorCode::OperationUnsupported));

        let admin = server.with_allow_admin(true);
        assert!(admin_denied::<ShutdownResponse>(&admin, "shutdown").is_none());
    }
}
