use super::DatabaseId;
use super::keyspace::Keyspace;
use super::pattern;
use crate::command::CacheResponse;
use crate::command::server::*;
use crate::server::CacheServer;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Clear the listed databases of the server, or its own database when none are listed
pub(super) fn clear_data(
    databases: &mut HashMap<DatabaseId, Keyspace>,
    server: &CacheServer,
    params: &ClearDataParams,
) -> ClearDataResponse {
    let targets = if params.databases.is_empty() {
        vec![server.database_or_default()]
    } else {
        params.databases.clone()
    };
    for index in targets {
        if let Some(space) = databases.get_mut(&DatabaseId::new(server, index)) {
            space.clear();
        }
    }
    ClearDataResponse::success()
}

pub(super) fn get_all_databases(
    databases: &mut HashMap<DatabaseId, Keyspace>,
    server: &CacheServer,
    now: DateTime<Utc>,
) -> GetAllDatabasesResponse {
    databases.entry(DatabaseId::of(server)).or_default();
    let identity = server.identity();
    let mut found: Vec<CacheDatabase> = databases
        .iter_mut()
        .filter(|(id, _)| id.server == identity)
        .map(|(id, space)| CacheDatabase {
            index: id.index,
            name: format!("db{}", id.index),
            key_count: space.len(now) as u64,
        })
        .collect();
    found.sort_by_key(|db| db.index);
    GetAllDatabasesResponse {
        databases: found,
        ..GetAllDatabasesResponse::success()
    }
}

pub(super) fn get_keys(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &GetKeysParams,
) -> GetKeysResponse {
    let keys = space
        .keys(now)
        .into_iter()
        .filter(|key| pattern::matches(params.pattern.as_deref(), key))
        .collect();
    GetKeysResponse {
        keys,
        ..GetKeysResponse::success()
    }
}
