//! Command table
//!
//! Each row binds a parameter type to its response type, the provider method
//! that executes it, and the async/blocking facade methods. Everything that
//! has to stay in sync across the operation set is generated from here.

use super::hash::*;
use super::keys::*;
use super::list::*;
use super::server::*;
use super::set::*;
use super::sorted_set::*;
use super::string::*;
use super::{CacheCommand, CommandDescriptor, CommandOptions};
use crate::dispatcher::Dispatcher;
use crate::errors::CacheError;
use crate::keys::CacheKey;
use crate::provider::CacheProvider;
use crate::server::CacheServer;
use async_trait::async_trait;
use std::fmt;
use std::iter;

macro_rules! cache_commands {
    (
        $(
            $family:ident, $handle:ident, $accessor:ident {
                $(
                    $op:ident($params:ty) -> $response:ty
                        => $provider_fn:ident, $method:ident, $blocking:ident,
                        |$p:ident| $keys:expr;
                )+
            }
        )+
    ) => {
        /// Operation groups, used for API ergonomics only
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CommandFamily {
            $($family),+
        }

        /// Every operation the layer can dispatch
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CacheOperation {
            $($($op),+),+
        }

        impl CacheOperation {
            pub const ALL: &'static [CacheOperation] = &[$($(CacheOperation::$op),+),+];

            pub fn family(&self) -> CommandFamily {
                match self {
                    $($(CacheOperation::$op => CommandFamily::$family,)+)+
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $($(CacheOperation::$op => stringify!($op),)+)+
                }
            }
        }

        $($(
            impl CommandDescriptor for $params {
                fn operation(&self) -> CacheOperation {
                    CacheOperation::$op
                }

                fn options(&self) -> &CommandOptions {
                    &self.options
                }

                fn options_mut(&mut self) -> &mut CommandOptions {
                    &mut self.options
                }

                fn keys(&self) -> Vec<&CacheKey> {
                    let $p = self;
                    $keys
                }
            }

            #[async_trait]
            impl CacheCommand for $params {
                type Response = $response;

                async fn execute(
                    &self,
                    provider: &dyn CacheProvider,
                    server: &CacheServer,
                ) -> Result<$response, CacheError> {
                    provider.$provider_fn(server, self).await
                }
            }
        )+)+

        $(
            #[doc = concat!("Facade over the ", stringify!($family), " family")]
            #[derive(Clone, Copy)]
            pub struct $handle<'a> {
                dispatcher: &'a Dispatcher,
            }

            impl<'a> $handle<'a> {
                $(
                    #[doc = concat!("Run `", stringify!($op), "`")]
                    pub async fn $method(&self, params: &$params) -> Result<$response, CacheError> {
                        self.dispatcher.execute(params).await
                    }

                    #[doc = concat!("Run `", stringify!($op), "` on the shared blocking runtime")]
                    pub fn $blocking(&self, params: &$params) -> Result<$response, CacheError> {
                        self.dispatcher.execute_blocking(params)
                    }
                )+
            }
        )+

        impl Dispatcher {
            $(
                pub fn $accessor(&self) -> $handle<'_> {
                    $handle { dispatcher: self }
                }
            )+
        }
    };
}

cache_commands! {
    String, StringCommands, string {
        StringSet(StringSetParams) -> StringSetResponse
            => string_set, set, set_blocking,
            |p| p.entries.iter().map(|e| &e.key).collect();
        StringGet(StringGetParams) -> StringGetResponse
            => string_get, get, get_blocking,
            |p| p.keys.iter().collect();
        StringAppend(StringAppendParams) -> StringAppendResponse
            => string_append, append, append_blocking,
            |p| vec![&p.key];
        StringBitCount(StringBitCountParams) -> StringBitCountResponse
            => string_bit_count, bit_count, bit_count_blocking,
            |p| vec![&p.key];
        StringBitOperation(StringBitOperationParams) -> StringBitOperationResponse
            => string_bit_operation, bit_operation, bit_operation_blocking,
            |p| iter::once(&p.destination_key).chain(p.keys.iter()).collect();
        StringBitPosition(StringBitPositionParams) -> StringBitPositionResponse
            => string_bit_position, bit_position, bit_position_blocking,
            |p| vec![&p.key];
        StringDecrement(StringDecrementParams) -> StringDecrementResponse
            => string_decrement, decrement, decrement_blocking,
            |p| vec![&p.key];
        StringIncrement(StringIncrementParams) -> StringIncrementResponse
            => string_increment, increment, increment_blocking,
            |p| vec![&p.key];
        StringGetBit(StringGetBitParams) -> StringGetBitResponse
            => string_get_bit, get_bit, get_bit_blocking,
            |p| vec![&p.key];
        StringGetRange(StringGetRangeParams) -> StringGetRangeResponse
            => string_get_range, get_range, get_range_blocking,
            |p| vec![&p.key];
        StringGetSet(StringGetSetParams) -> StringGetSetResponse
            => string_get_set, get_set, get_set_blocking,
            |p| vec![&p.key];
        StringLength(StringLengthParams) -> StringLengthResponse
            => string_length, length, length_blocking,
            |p| vec![&p.key];
        StringSetBit(StringSetBitParams) -> StringSetBitResponse
            => string_set_bit, set_bit, set_bit_blocking,
            |p| vec![&p.key];
        StringSetRange(StringSetRangeParams) -> StringSetRangeResponse
            => string_set_range, set_range, set_range_blocking,
            |p| vec![&p.key];
    }

    List, ListCommands, list {
        ListInsertBefore(ListInsertBeforeParams) -> ListInsertBeforeResponse
            => list_insert_before, insert_before, insert_before_blocking,
            |p| vec![&p.key];
        ListInsertAfter(ListInsertAfterParams) -> ListInsertAfterResponse
            => list_insert_after, insert_after, insert_after_blocking,
            |p| vec![&p.key];
        ListGetByIndex(ListGetByIndexParams) -> ListGetByIndexResponse
            => list_get_by_index, get_by_index, get_by_index_blocking,
            |p| vec![&p.key];
        ListLeftPop(ListLeftPopParams) -> ListLeftPopResponse
            => list_left_pop, left_pop, left_pop_blocking,
            |p| vec![&p.key];
        ListLeftPush(ListLeftPushParams) -> ListLeftPushResponse
            => list_left_push, left_push, left_push_blocking,
            |p| vec![&p.key];
        ListLength(ListLengthParams) -> ListLengthResponse
            => list_length, length, length_blocking,
            |p| vec![&p.key];
        ListRange(ListRangeParams) -> ListRangeResponse
            => list_range, range, range_blocking,
            |p| vec![&p.key];
        ListRemove(ListRemoveParams) -> ListRemoveResponse
            => list_remove, remove, remove_blocking,
            |p| vec![&p.key];
        ListRightPop(ListRightPopParams) -> ListRightPopResponse
            => list_right_pop, right_pop, right_pop_blocking,
            |p| vec![&p.key];
        ListRightPopLeftPush(ListRightPopLeftPushParams) -> ListRightPopLeftPushResponse
            => list_right_pop_left_push, right_pop_left_push, right_pop_left_push_blocking,
            |p| vec![&p.source_key, &p.destination_key];
        ListRightPush(ListRightPushParams) -> ListRightPushResponse
            => list_right_push, right_push, right_push_blocking,
            |p| vec![&p.key];
        ListSetByIndex(ListSetByIndexParams) -> ListSetByIndexResponse
            => list_set_by_index, set_by_index, set_by_index_blocking,
            |p| vec![&p.key];
        ListTrim(ListTrimParams) -> ListTrimResponse
            => list_trim, trim, trim_blocking,
            |p| vec![&p.key];
    }

    Hash, HashCommands, hash {
        HashDelete(HashDeleteParams) -> HashDeleteResponse
            => hash_delete, delete, delete_blocking,
            |p| vec![&p.key];
        HashExist(HashExistParams) -> HashExistResponse
            => hash_exist, exist, exist_blocking,
            |p| vec![&p.key];
        HashGet(HashGetParams) -> HashGetResponse
            => hash_get, get, get_blocking,
            |p| vec![&p.key];
        HashGetAll(HashGetAllParams) -> HashGetAllResponse
            => hash_get_all, get_all, get_all_blocking,
            |p| vec![&p.key];
        HashIncrement(HashIncrementParams) -> HashIncrementResponse
            => hash_increment, increment, increment_blocking,
            |p| vec![&p.key];
        HashDecrement(HashDecrementParams) -> HashDecrementResponse
            => hash_decrement, decrement, decrement_blocking,
            |p| vec![&p.key];
        HashKeys(HashKeysParams) -> HashKeysResponse
            => hash_keys, keys, keys_blocking,
            |p| vec![&p.key];
        HashLength(HashLengthParams) -> HashLengthResponse
            => hash_length, length, length_blocking,
            |p| vec![&p.key];
        HashSet(HashSetParams) -> HashSetResponse
            => hash_set, set, set_blocking,
            |p| vec![&p.key];
        HashValues(HashValuesParams) -> HashValuesResponse
            => hash_values, values, values_blocking,
            |p| vec![&p.key];
        HashScan(HashScanParams) -> HashScanResponse
            => hash_scan, scan, scan_blocking,
            |p| vec![&p.key];
    }

    Set, SetCommands, set {
        SetAdd(SetAddParams) -> SetAddResponse
            => set_add, add, add_blocking,
            |p| vec![&p.key];
        SetCombine(SetCombineParams) -> SetCombineResponse
            => set_combine, combine, combine_blocking,
            |p| p.keys.iter().collect();
        SetCombineAndStore(SetCombineAndStoreParams) -> SetCombineAndStoreResponse
            => set_combine_and_store, combine_and_store, combine_and_store_blocking,
            |p| iter::once(&p.destination_key).chain(p.keys.iter()).collect();
        SetContains(SetContainsParams) -> SetContainsResponse
            => set_contains, contains, contains_blocking,
            |p| vec![&p.key];
        SetLength(SetLengthParams) -> SetLengthResponse
            => set_length, length, length_blocking,
            |p| vec![&p.key];
        SetMembers(SetMembersParams) -> SetMembersResponse
            => set_members, members, members_blocking,
            |p| vec![&p.key];
        SetMove(SetMoveParams) -> SetMoveResponse
            => set_move, move_member, move_member_blocking,
            |p| vec![&p.source_key, &p.destination_key];
        SetPop(SetPopParams) -> SetPopResponse
            => set_pop, pop, pop_blocking,
            |p| vec![&p.key];
        SetRandomMembers(SetRandomMembersParams) -> SetRandomMembersResponse
            => set_random_members, random_members, random_members_blocking,
            |p| vec![&p.key];
        SetRemove(SetRemoveParams) -> SetRemoveResponse
            => set_remove, remove, remove_blocking,
            |p| vec![&p.key];
    }

    SortedSet, SortedSetCommands, sorted_set {
        SortedSetAdd(SortedSetAddParams) -> SortedSetAddResponse
            => sorted_set_add, add, add_blocking,
            |p| vec![&p.key];
        SortedSetCombineAndStore(SortedSetCombineAndStoreParams) -> SortedSetCombineAndStoreResponse
            => sorted_set_combine_and_store, combine_and_store, combine_and_store_blocking,
            |p| iter::once(&p.destination_key).chain(p.keys.iter()).collect();
        SortedSetDecrement(SortedSetDecrementParams) -> SortedSetDecrementResponse
            => sorted_set_decrement, decrement, decrement_blocking,
            |p| vec![&p.key];
        SortedSetIncrement(SortedSetIncrementParams) -> SortedSetIncrementResponse
            => sorted_set_increment, increment, increment_blocking,
            |p| vec![&p.key];
        SortedSetLength(SortedSetLengthParams) -> SortedSetLengthResponse
            => sorted_set_length, length, length_blocking,
            |p| vec![&p.key];
        SortedSetLengthByValue(SortedSetLengthByValueParams) -> SortedSetLengthByValueResponse
            => sorted_set_length_by_value, length_by_value, length_by_value_blocking,
            |p| vec![&p.key];
        SortedSetRangeByRank(SortedSetRangeByRankParams) -> SortedSetRangeByRankResponse
            => sorted_set_range_by_rank, range_by_rank, range_by_rank_blocking,
            |p| vec![&p.key];
        SortedSetRangeByScore(SortedSetRangeByScoreParams) -> SortedSetRangeByScoreResponse
            => sorted_set_range_by_score, range_by_score, range_by_score_blocking,
            |p| vec![&p.key];
        SortedSetRangeByValue(SortedSetRangeByValueParams) -> SortedSetRangeByValueResponse
            => sorted_set_range_by_value, range_by_value, range_by_value_blocking,
            |p| vec![&p.key];
        SortedSetRank(SortedSetRankParams) -> SortedSetRankResponse
            => sorted_set_rank, rank, rank_blocking,
            |p| vec![&p.key];
        SortedSetRemove(SortedSetRemoveParams) -> SortedSetRemoveResponse
            => sorted_set_remove, remove, remove_blocking,
            |p| vec![&p.key];
        SortedSetRemoveRangeByRank(SortedSetRemoveRangeByRankParams)
            -> SortedSetRemoveRangeByRankResponse
            => sorted_set_remove_range_by_rank,
               remove_range_by_rank, remove_range_by_rank_blocking,
            |p| vec![&p.key];
        SortedSetRemoveRangeByScore(SortedSetRemoveRangeByScoreParams)
            -> SortedSetRemoveRangeByScoreResponse
            => sorted_set_remove_range_by_score,
               remove_range_by_score, remove_range_by_score_blocking,
            |p| vec![&p.key];
        SortedSetRemoveRangeByValue(SortedSetRemoveRangeByValueParams)
            -> SortedSetRemoveRangeByValueResponse
            => sorted_set_remove_range_by_value,
               remove_range_by_value, remove_range_by_value_blocking,
            |p| vec![&p.key];
        SortedSetScore(SortedSetScoreParams) -> SortedSetScoreResponse
            => sorted_set_score, score, score_blocking,
            |p| vec![&p.key];
    }

    Keys, KeyCommands, keys {
        KeyDelete(KeyDeleteParams) -> KeyDeleteResponse
            => key_delete, delete, delete_blocking,
            |p| p.keys.iter().collect();
        KeyDump(KeyDumpParams) -> KeyDumpResponse
            => key_dump, dump, dump_blocking,
            |p| vec![&p.key];
        KeyExist(KeyExistParams) -> KeyExistResponse
            => key_exist, exist, exist_blocking,
            |p| p.keys.iter().collect();
        KeyExpire(KeyExpireParams) -> KeyExpireResponse
            => key_expire, expire, expire_blocking,
            |p| vec![&p.key];
        KeyMigrate(KeyMigrateParams) -> KeyMigrateResponse
            => key_migrate, migrate, migrate_blocking,
            |p| vec![&p.key];
        KeyMove(KeyMoveParams) -> KeyMoveResponse
            => key_move, move_to_database, move_to_database_blocking,
            |p| vec![&p.key];
        KeyPersist(KeyPersistParams) -> KeyPersistResponse
            => key_persist, persist, persist_blocking,
            |p| vec![&p.key];
        KeyRandom(KeyRandomParams) -> KeyRandomResponse
            => key_random, random, random_blocking,
            |_p| Vec::new();
        KeyRename(KeyRenameParams) -> KeyRenameResponse
            => key_rename, rename, rename_blocking,
            |p| vec![&p.key, &p.new_key];
        KeyRestore(KeyRestoreParams) -> KeyRestoreResponse
            => key_restore, restore, restore_blocking,
            |p| vec![&p.key];
        KeyScan(KeyScanParams) -> KeyScanResponse
            => key_scan, scan, scan_blocking,
            |_p| Vec::new();
        KeySort(KeySortParams) -> KeySortResponse
            => key_sort, sort, sort_blocking,
            |p| vec![&p.key];
        KeySortAndStore(KeySortAndStoreParams) -> KeySortAndStoreResponse
            => key_sort_and_store, sort_and_store, sort_and_store_blocking,
            |p| vec![&p.key, &p.destination_key];
        KeyType(KeyTypeParams) -> KeyTypeResponse
            => key_type, key_type, key_type_blocking,
            |p| vec![&p.key];
        KeyTimeToLive(KeyTimeToLiveParams) -> KeyTimeToLiveResponse
            => key_time_to_live, time_to_live, time_to_live_blocking,
            |p| vec![&p.key];
    }

    Server, ServerCommands, server {
        ClearData(ClearDataParams) -> ClearDataResponse
            => clear_data, clear_data, clear_data_blocking,
            |_p| Vec::new();
        GetAllDatabases(GetAllDatabasesParams) -> GetAllDatabasesResponse
            => get_all_databases, get_all_databases, get_all_databases_blocking,
            |_p| Vec::new();
        GetKeys(GetKeysParams) -> GetKeysResponse
            => get_keys, get_keys, get_keys_blocking,
            |_p| Vec::new();
        GetLastSave(GetLastSaveParams) -> GetLastSaveResponse
            => get_last_save, get_last_save, get_last_save_blocking,
            |_p| Vec::new();
        GetConfig(GetConfigParams) -> GetConfigResponse
            => get_config, get_config, get_config_blocking,
            |_p| Vec::new();
        Shutdown(ShutdownParams) -> ShutdownResponse
            => shutdown, shutdown, shutdown_blocking,
            |_p| Vec::new();
    }
}

impl fmt::Display for CacheOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::CacheObject;
    use std::collections::HashSet;

    #[test]
    fn test_every_operation_has_a_unique_name() {
        let names: HashSet<&str> = CacheOperation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), CacheOperation::ALL.len());
        assert_eq!(CacheOperation::ALL.len(), 84);
    }

    #[test]
    fn test_family_mapping() {
        assert_eq!(CacheOperation::ListTrim.family(), CommandFamily::List);
        assert_eq!(CacheOperation::SortedSetScore.family(), CommandFamily::SortedSet);
        assert_eq!(CacheOperation::KeyTimeToLive.family(), CommandFamily::Keys);
        assert_eq!(CacheOperation::Shutdown.family(), CommandFamily::Server);
        assert_eq!(CacheOperation::HashScan.to_string(), "HashScan");
    }

    #[test]
    fn test_keys_follow_argument_order() {
        let source = CacheKey::for_object(CacheObject::new("queue")).with_name("in");
        let destination = CacheKey::new().with_name("out");
        let params = ListRightPopLeftPushParams::new(source, destination);
        let keys: Vec<String> = params.keys().iter().map(|k| k.to_text()).collect();
        assert_eq!(keys, vec!["queue:in".to_string(), "out".to_string()]);
        assert_eq!(params.cache_object().map(|o| o.name.as_str()), Some("queue"));

        assert!(ShutdownParams::new(false).keys().is_empty());
    }
}
