//! Process-local provider
//!
//! Every `(server, database)` pair owns a `Keyspace` behind one
//! `parking_lot::RwLock`. Commands take the write lock for their whole run,
//! so each command is atomic with respect to the others. Expired values are
//! purged lazily when touched.

mod hash;
mod keys;
mod keyspace;
mod list;
mod pattern;
mod server;
mod set;
mod sorted_set;
mod string;

use crate::command::CacheResponse;
use crate::command::hash::*;
use crate::command::keys::*;
use crate::command::list::*;
use crate::command::server::*;
use crate::command::set::*;
use crate::command::sorted_set::*;
use crate::command::string::*;
use crate::errors::{CacheError, ErrorCode};
use crate::provider::CacheProvider;
use crate::server::CacheServer;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyspace::Keyspace;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DatabaseId {
    /// Server identity (lowercased name)
    server: String,
    index: u32,
}

impl DatabaseId {
    fn new(server: &CacheServer, index: u32) -> Self {
        Self {
            server: server.identity(),
            index,
        }
    }

    /// The database the server is configured for
    fn of(server: &CacheServer) -> Self {
        Self::new(server, server.database_or_default())
    }
}

fn unsupported<R: CacheResponse>(operation: &str) -> R {
    R::failure_with(
        ErrorCode::OperationUnsupported,
        format!("{} is not supported by the in-memory provider", operation),
    )
}

/// Reference backend holding all data in process memory
#[derive(Debug, Default)]
pub struct MemoryProvider {
    databases: RwLock<HashMap<DatabaseId, Keyspace>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the server's configured database
    fn with_keyspace<R>(
        &self,
        server: &CacheServer,
        f: impl FnOnce(&mut Keyspace, DateTime<Utc>) -> R,
    ) -> R {
        let mut databases = self.databases.write();
        let space = databases.entry(DatabaseId::of(server)).or_default();
        f(space, Utc::now())
    }

    /// Run `f` against every database, for cross-database commands
    fn with_databases<R>(
        &self,
        f: impl FnOnce(&mut HashMap<DatabaseId, Keyspace>, DateTime<Utc>) -> R,
    ) -> R {
        let mut databases = self.databases.write();
        f(&mut databases, Utc::now())
    }
}

#[async_trait]
impl CacheProvider for MemoryProvider {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    // String
    async fn string_set(
        &self,
        server: &CacheServer,
        params: &StringSetParams,
    ) -> Result<StringSetResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::set(space, now, params)))
    }

    async fn string_get(
        &self,
        server: &CacheServer,
        params: &StringGetParams,
    ) -> Result<StringGetResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::get(space, now, params)))
    }

    async fn string_append(
        &self,
        server: &CacheServer,
        params: &StringAppendParams,
    ) -> Result<StringAppendResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::append(space, now, params)))
    }

    async fn string_bit_count(
        &self,
        server: &CacheServer,
        params: &StringBitCountParams,
    ) -> Result<StringBitCountResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::bit_count(space, now, params)))
    }

    async fn string_bit_operation(
        &self,
        server: &CacheServer,
        params: &StringBitOperationParams,
    ) -> Result<StringBitOperationResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::bit_operation(space, now, params)))
    }

    async fn string_bit_position(
        &self,
        server: &CacheServer,
        params: &StringBitPositionParams,
    ) -> Result<StringBitPositionResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::bit_position(space, now, params)))
    }

    async fn string_decrement(
        &self,
        server: &CacheServer,
        params: &StringDecrementParams,
    ) -> Result<StringDecrementResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::decrement(space, now, params)))
    }

    async fn string_increment(
        &self,
        server: &CacheServer,
        params: &StringIncrementParams,
    ) -> Result<StringIncrementResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::increment(space, now, params)))
    }

    async fn string_get_bit(
        &self,
        server: &CacheServer,
        params: &StringGetBitParams,
    ) -> Result<StringGetBitResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::get_bit(space, now, params)))
    }

    async fn string_get_range(
        &self,
        server: &CacheServer,
        params: &StringGetRangeParams,
    ) -> Result<StringGetRangeResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::get_range(space, now, params)))
    }

    async fn string_get_set(
        &self,
        server: &CacheServer,
        params: &StringGetSetParams,
    ) -> Result<StringGetSetResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::get_set(space, now, params)))
    }

    async fn string_length(
        &self,
        server: &CacheServer,
        params: &StringLengthParams,
    ) -> Result<StringLengthResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::length(space, now, params)))
    }

    async fn string_set_bit(
        &self,
        server: &CacheServer,
        params: &StringSetBitParams,
    ) -> Result<StringSetBitResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::set_bit(space, now, params)))
    }

    async fn string_set_range(
        &self,
        server: &CacheServer,
        params: &StringSetRangeParams,
    ) -> Result<StringSetRangeResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| string::set_range(space, now, params)))
    }

    // List
    async fn list_insert_before(
        &self,
        server: &CacheServer,
        params: &ListInsertBeforeParams,
    ) -> Result<ListInsertBeforeResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::insert_before(space, now, params)))
    }

    async fn list_insert_after(
        &self,
        server: &CacheServer,
        params: &ListInsertAfterParams,
    ) -> Result<ListInsertAfterResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::insert_after(space, now, params)))
    }

    async fn list_get_by_index(
        &self,
        server: &CacheServer,
        params: &ListGetByIndexParams,
    ) -> Result<ListGetByIndexResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::get_by_index(space, now, params)))
    }

    async fn list_left_pop(
        &self,
        server: &CacheServer,
        params: &ListLeftPopParams,
    ) -> Result<ListLeftPopResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::left_pop(space, now, params)))
    }

    async fn list_left_push(
        &self,
        server: &CacheServer,
        params: &ListLeftPushParams,
    ) -> Result<ListLeftPushResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::left_push(space, now, params)))
    }

    async fn list_length(
        &self,
        server: &CacheServer,
        params: &ListLengthParams,
    ) -> Result<ListLengthResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::length(space, now, params)))
    }

    async fn list_range(
        &self,
        server: &CacheServer,
        params: &ListRangeParams,
    ) -> Result<ListRangeResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::range(space, now, params)))
    }

    async fn list_remove(
        &self,
        server: &CacheServer,
        params: &ListRemoveParams,
    ) -> Result<ListRemoveResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::remove(space, now, params)))
    }

    async fn list_right_pop(
        &self,
        server: &CacheServer,
        params: &ListRightPopParams,
    ) -> Result<ListRightPopResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::right_pop(space, now, params)))
    }

    async fn list_right_pop_left_push(
        &self,
        server: &CacheServer,
        params: &ListRightPopLeftPushParams,
    ) -> Result<ListRightPopLeftPushResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::right_pop_left_push(space, now, params)))
    }

    async fn list_right_push(
        &self,
        server: &CacheServer,
        params: &ListRightPushParams,
    ) -> Result<ListRightPushResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::right_push(space, now, params)))
    }

    async fn list_set_by_index(
        &self,
        server: &CacheServer,
        params: &ListSetByIndexParams,
    ) -> Result<ListSetByIndexResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::set_by_index(space, now, params)))
    }

    async fn list_trim(
        &self,
        server: &CacheServer,
        params: &ListTrimParams,
    ) -> Result<ListTrimResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| list::trim(space, now, params)))
    }

    // Hash
    async fn hash_delete(
        &self,
        server: &CacheServer,
        params: &HashDeleteParams,
    ) -> Result<HashDeleteResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::delete(space, now, params)))
    }

    async fn hash_exist(
        &self,
        server: &CacheServer,
        params: &HashExistParams,
    ) -> Result<HashExistResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::exist(space, now, params)))
    }

    async fn hash_get(
        &self,
        server: &CacheServer,
        params: &HashGetParams,
    ) -> Result<HashGetResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::get(space, now, params)))
    }

    async fn hash_get_all(
        &self,
        server: &CacheServer,
        params: &HashGetAllParams,
    ) -> Result<HashGetAllResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::get_all(space, now, params)))
    }

    async fn hash_increment(
        &self,
        server: &CacheServer,
        params: &HashIncrementParams,
    ) -> Result<HashIncrementResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::increment(space, now, params)))
    }

    async fn hash_decrement(
        &self,
        server: &CacheServer,
        params: &HashDecrementParams,
    ) -> Result<HashDecrementResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::decrement(space, now, params)))
    }

    async fn hash_keys(
        &self,
        server: &CacheServer,
        params: &HashKeysParams,
    ) -> Result<HashKeysResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::keys(space, now, params)))
    }

    async fn hash_length(
        &self,
        server: &CacheServer,
        params: &HashLengthParams,
    ) -> Result<HashLengthResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::length(space, now, params)))
    }

    async fn hash_set(
        &self,
        server: &CacheServer,
        params: &HashSetParams,
    ) -> Result<HashSetResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::set(space, now, params)))
    }

    async fn hash_values(
        &self,
        server: &CacheServer,
        params: &HashValuesParams,
    ) -> Result<HashValuesResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::values(space, now, params)))
    }

    async fn hash_scan(
        &self,
        server: &CacheServer,
        params: &HashScanParams,
    ) -> Result<HashScanResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| hash::scan(space, now, params)))
    }

    // Set
    async fn set_add(
        &self,
        server: &CacheServer,
        params: &SetAddParams,
    ) -> Result<SetAddResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::add(space, now, params)))
    }

    async fn set_combine(
        &self,
        server: &CacheServer,
        params: &SetCombineParams,
    ) -> Result<SetCombineResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::combine(space, now, params)))
    }

    async fn set_combine_and_store(
        &self,
        server: &CacheServer,
        params: &SetCombineAndStoreParams,
    ) -> Result<SetCombineAndStoreResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::combine_and_store(space, now, params)))
    }

    async fn set_contains(
        &self,
        server: &CacheServer,
        params: &SetContainsParams,
    ) -> Result<SetContainsResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::contains(space, now, params)))
    }

    async fn set_length(
        &self,
        server: &CacheServer,
        params: &SetLengthParams,
    ) -> Result<SetLengthResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::length(space, now, params)))
    }

    async fn set_members(
        &self,
        server: &CacheServer,
        params: &SetMembersParams,
    ) -> Result<SetMembersResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::members(space, now, params)))
    }

    async fn set_move(
        &self,
        server: &CacheServer,
        params: &SetMoveParams,
    ) -> Result<SetMoveResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::move_member(space, now, params)))
    }

    async fn set_pop(
        &self,
        server: &CacheServer,
        params: &SetPopParams,
    ) -> Result<SetPopResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::pop(space, now, params)))
    }

    async fn set_random_members(
        &self,
        server: &CacheServer,
        params: &SetRandomMembersParams,
    ) -> Result<SetRandomMembersResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::random_members(space, now, params)))
    }

    async fn set_remove(
        &self,
        server: &CacheServer,
        params: &SetRemoveParams,
    ) -> Result<SetRemoveResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| set::remove(space, now, params)))
    }

    // SortedSet
    async fn sorted_set_add(
        &self,
        server: &CacheServer,
        params: &SortedSetAddParams,
    ) -> Result<SortedSetAddResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::add(space, now, params)))
    }

    async fn sorted_set_combine_and_store(
        &self,
        server: &CacheServer,
        params: &SortedSetCombineAndStoreParams,
    ) -> Result<SortedSetCombineAndStoreResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| {
            sorted_set::combine_and_store(space, now, params)
        }))
    }

    async fn sorted_set_decrement(
        &self,
        server: &CacheServer,
        params: &SortedSetDecrementParams,
    ) -> Result<SortedSetDecrementResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::decrement(space, now, params)))
    }

    async fn sorted_set_increment(
        &self,
        server: &CacheServer,
        params: &SortedSetIncrementParams,
    ) -> Result<SortedSetIncrementResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::increment(space, now, params)))
    }

    async fn sorted_set_length(
        &self,
        server: &CacheServer,
        params: &SortedSetLengthParams,
    ) -> Result<SortedSetLengthResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::length(space, now, params)))
    }

    async fn sorted_set_length_by_value(
        &self,
        server: &CacheServer,
        params: &SortedSetLengthByValueParams,
    ) -> Result<SortedSetLengthByValueResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::length_by_value(space, now, params)))
    }

    async fn sorted_set_range_by_rank(
        &self,
        server: &CacheServer,
        params: &SortedSetRangeByRankParams,
    ) -> Result<SortedSetRangeByRankResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::range_by_rank(space, now, params)))
    }

    async fn sorted_set_range_by_score(
        &self,
        server: &CacheServer,
        params: &SortedSetRangeByScoreParams,
    ) -> Result<SortedSetRangeByScoreResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::range_by_score(space, now, params)))
    }

    async fn sorted_set_range_by_value(
        &self,
        server: &CacheServer,
        params: &SortedSetRangeByValueParams,
    ) -> Result<SortedSetRangeByValueResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::range_by_value(space, now, params)))
    }

    async fn sorted_set_rank(
        &self,
        server: &CacheServer,
        params: &SortedSetRankParams,
    ) -> Result<SortedSetRankResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::rank(space, now, params)))
    }

    async fn sorted_set_remove(
        &self,
        server: &CacheServer,
        params: &SortedSetRemoveParams,
    ) -> Result<SortedSetRemoveResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::remove(space, now, params)))
    }

    async fn sorted_set_remove_range_by_rank(
        &self,
        server: &CacheServer,
        params: &SortedSetRemoveRangeByRankParams,
    ) -> Result<SortedSetRemoveRangeByRankResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| {
            sorted_set::remove_range_by_rank(space, now, params)
        }))
    }

    async fn sorted_set_remove_range_by_score(
        &self,
        server: &CacheServer,
        params: &SortedSetRemoveRangeByScoreParams,
    ) -> Result<SortedSetRemoveRangeByScoreResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| {
            sorted_set::remove_range_by_score(space, now, params)
        }))
    }

    async fn sorted_set_remove_range_by_value(
        &self,
        server: &CacheServer,
        params: &SortedSetRemoveRangeByValueParams,
    ) -> Result<SortedSetRemoveRangeByValueResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| {
            sorted_set::remove_range_by_value(space, now, params)
        }))
    }

    async fn sorted_set_score(
        &self,
        server: &CacheServer,
        params: &SortedSetScoreParams,
    ) -> Result<SortedSetScoreResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| sorted_set::score(space, now, params)))
    }

    // Keys
    async fn key_delete(
        &self,
        server: &CacheServer,
        params: &KeyDeleteParams,
    ) -> Result<KeyDeleteResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::delete(space, now, params)))
    }

    async fn key_dump(
        &self,
        server: &CacheServer,
        params: &KeyDumpParams,
    ) -> Result<KeyDumpResponse, CacheError> {
        self.with_keyspace(server, |space, now| keys::dump(space, now, params))
    }

    async fn key_exist(
        &self,
        server: &CacheServer,
        params: &KeyExistParams,
    ) -> Result<KeyExistResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::exist(space, now, params)))
    }

    async fn key_expire(
        &self,
        server: &CacheServer,
        params: &KeyExpireParams,
    ) -> Result<KeyExpireResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::expire(space, now, params)))
    }

    async fn key_migrate(
        &self,
        _server: &CacheServer,
        _params: &KeyMigrateParams,
    ) -> Result<KeyMigrateResponse, CacheError> {
        Ok(unsupported("key_migrate"))
    }

    async fn key_move(
        &self,
        server: &CacheServer,
        params: &KeyMoveParams,
    ) -> Result<KeyMoveResponse, CacheError> {
        Ok(self.with_databases(|databases, now| {
            keys::move_to_database(databases, server, now, params)
        }))
    }

    async fn key_persist(
        &self,
        server: &CacheServer,
        params: &KeyPersistParams,
    ) -> Result<KeyPersistResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::persist(space, now, params)))
    }

    async fn key_random(
        &self,
        server: &CacheServer,
        _params: &KeyRandomParams,
    ) -> Result<KeyRandomResponse, CacheError> {
        Ok(self.with_keyspace(server, keys::random))
    }

    async fn key_rename(
        &self,
        server: &CacheServer,
        params: &KeyRenameParams,
    ) -> Result<KeyRenameResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::rename(space, now, params)))
    }

    async fn key_restore(
        &self,
        server: &CacheServer,
        params: &KeyRestoreParams,
    ) -> Result<KeyRestoreResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::restore(space, now, params)))
    }

    async fn key_scan(
        &self,
        server: &CacheServer,
        params: &KeyScanParams,
    ) -> Result<KeyScanResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::scan(space, now, params)))
    }

    async fn key_sort(
        &self,
        server: &CacheServer,
        params: &KeySortParams,
    ) -> Result<KeySortResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::sort(space, now, params)))
    }

    async fn key_sort_and_store(
        &self,
        server: &CacheServer,
        params: &KeySortAndStoreParams,
    ) -> Result<KeySortAndStoreResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::sort_and_store(space, now, params)))
    }

    async fn key_type(
        &self,
        server: &CacheServer,
        params: &KeyTypeParams,
    ) -> Result<KeyTypeResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::key_type(space, now, params)))
    }

    async fn key_time_to_live(
        &self,
        server: &CacheServer,
        params: &KeyTimeToLiveParams,
    ) -> Result<KeyTimeToLiveResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| keys::time_to_live(space, now, params)))
    }

    // Server
    async fn clear_data(
        &self,
        server: &CacheServer,
        params: &ClearDataParams,
    ) -> Result<ClearDataResponse, CacheError> {
        Ok(self.with_databases(|databases, _| server::clear_data(databases, server, params)))
    }

    async fn get_all_databases(
        &self,
        server: &CacheServer,
        _params: &GetAllDatabasesParams,
    ) -> Result<GetAllDatabasesResponse, CacheError> {
        Ok(self.with_databases(|databases, now| server::get_all_databases(databases, server, now)))
    }

    async fn get_keys(
        &self,
        server: &CacheServer,
        params: &GetKeysParams,
    ) -> Result<GetKeysResponse, CacheError> {
        Ok(self.with_keyspace(server, |space, now| server::get_keys(space, now, params)))
    }

    async fn get_last_save(
        &self,
        _server: &CacheServer,
        _params: &GetLastSaveParams,
    ) -> Result<GetLastSaveResponse, CacheError> {
        Ok(unsupported("get_last_save"))
    }

    async fn get_config(
        &self,
        _server: &CacheServer,
        _params: &GetConfigParams,
    ) -> Result<GetConfigResponse, CacheError> {
        Ok(unsupported("get_config"))
    }

    async fn shutdown(
        &self,
        _server: &CacheServer,
        _params: &ShutdownParams,
    ) -> Result<ShutdownResponse, CacheError> {
        Ok(unsupported("shutdown"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::CacheEntry;
    use crate::keys::CacheKey;
    use crate::server::ServerType;

    fn key(text: &str) -> CacheKey {
        CacheKey::constant(text)
    }

    #[tokio::test]
    async fn test_servers_and_databases_are_isolated() {
        let provider = MemoryProvider::new();
        let primary = CacheServer::new("primary", ServerType::InMemory);
        let other_db = CacheServer::new("primary", ServerType::InMemory).with_database(1);
        let other_server = CacheServer::new("secondary", ServerType::InMemory);

        provider
            .string_set(&primary, &StringSetParams::single(key("k"), "v"))
            .await
            .unwrap();

        let get = StringGetParams::new(key("k"));
        assert_eq!(provider.string_get(&primary, &get).await.unwrap().value(), "v");
        assert!(!provider.string_get(&other_db, &get).await.unwrap().is_success());
        assert!(!provider.string_get(&other_server, &get).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_move_between_databases() {
        let provider = MemoryProvider::new();
        let db0 = CacheServer::new("local", ServerType::InMemory);
        let db2 = CacheServer::new("local", ServerType::InMemory).with_database(2);
        provider
            .string_set(&db0, &StringSetParams::single(key("k"), "v"))
            .await
            .unwrap();

        let moved = provider.key_move(&db0, &KeyMoveParams::new(key("k"), 2)).await.unwrap();
        assert!(moved.moved);
        let get = StringGetParams::new(key("k"));
        assert_eq!(provider.string_get(&db2, &get).await.unwrap().value(), "v");
        assert!(!provider.string_get(&db0, &get).await.unwrap().is_success());

        let same = provider.key_move(&db2, &KeyMoveParams::new(key("k"), 2)).await.unwrap();
        assert_eq!(same.code(), Some(ErrorCode::OperationUnsupported));
    }

    #[tokio::test]
    async fn test_clear_data_and_database_listing() {
        let provider = MemoryProvider::new();
        let db0 = CacheServer::new("local", ServerType::InMemory);
        let db1 = CacheServer::new("local", ServerType::InMemory).with_database(1);
        let params =
            StringSetParams::single(key("a"), "1").add_entry(CacheEntry::new(key("b"), "2"));
        for server in [&db0, &db1] {
            provider.string_set(server, &params).await.unwrap();
        }

        let listed = provider.get_all_databases(&db0, &GetAllDatabasesParams::new()).await.unwrap();
        let counts: Vec<(u32, u64)> = listed
            .databases
            .iter()
            .map(|d| (d.index, d.key_count))
            .collect();
        assert_eq!(counts, vec![(0, 2), (1, 2)]);

        provider
            .clear_data(&db0, &ClearDataParams::new().with_databases(vec![1]))
            .await
            .unwrap();
        let keys = provider.get_keys(&db1, &GetKeysParams::new()).await.unwrap();
        assert!(keys.keys.is_empty());
        let keys = provider.get_keys(&db0, &GetKeysParams::new().with_pattern("a*")).await.unwrap();
        assert_eq!(keys.keys, vec!["a"]);
    }

    #[tokio::test]
    async fn test_admin_commands_are_unsupported() {
        let provider = MemoryProvider::new();
        let server = CacheServer::default_in_memory();
        let response = provider.shutdown(&server, &ShutdownParams::new(false)).await.unwrap();
        assert_eq!(response.code(), Some(ErrorCode::OperationUnsupported));
        let response = provider.get_last_save(&server, &GetLastSaveParams::new()).await.unwrap();
        assert_eq!(response.code(), Some(ErrorCode::OperationUnsupported));
    }
}
