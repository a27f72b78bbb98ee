//! Provider contract
//!
//! A provider executes commands against one family of physical backends.
//! Expected failures (missing key, wrong type, bad offset, non-numeric value)
//! come back as a failed response carrying an `ErrorCode`; `Err` is kept for
//! connection faults and other conditions the caller cannot act on.
//!
//! Keys arrive already composed: the dispatcher warms each key's memo with
//! the registry's composer, so `CacheKey::to_text` yields the final text.

/// Composed key text, or return a `KeyIsNullOrEmpty` failure from the
/// enclosing function. The optional second argument wraps the failure.
macro_rules! key_or_fail {
    ($key:expr) => {
        key_or_fail!($key, std::convert::identity)
    };
    ($key:expr, $wrap:expr) => {
        match $crate::provider::key_text($key) {
            Some(text) => text,
            None => {
                return $wrap($crate::command::CacheResponse::failure(
                    $crate::errors::ErrorCode::KeyIsNullOrEmpty,
                ));
            }
        }
    };
}

/// Unwrap a `Result<_, ErrorCode>`, or return a failure carrying its code
macro_rules! value_or_fail {
    ($result:expr) => {
        value_or_fail!($result, std::convert::identity)
    };
    ($result:expr, $wrap:expr) => {
        match $result {
            Ok(value) => value,
            Err(code) => return $wrap($crate::command::CacheResponse::failure(code)),
        }
    };
}

pub mod memory;
pub mod redis;

use crate::command::hash::*;
use crate::command::keys::*;
use crate::command::list::*;
use crate::command::server::*;
use crate::command::set::*;
use crate::command::sorted_set::*;
use crate::command::string::*;
use crate::errors::CacheError;
use crate::keys::CacheKey;
use crate::server::CacheServer;
use async_trait::async_trait;

pub use memory::MemoryProvider;
pub use self::redis::RedisProvider;

/// Composed key text, `None` when the key renders to nothing
pub(crate) fn key_text(key: &CacheKey) -> Option<String> {
    let text = key.to_text();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Human readable provider name, used in logs
    fn name(&self) -> &'static str;

    // String

    /// Write every entry, each gated by its own condition. The response fails
    /// with the code of the first entry that did not proceed.
    async fn string_set(
        &self,
        server: &CacheServer,
        params: &StringSetParams,
    ) -> Result<StringSetResponse, CacheError>;
    /// Read several keys; missing keys yield `None` values. Fails with
    /// `KeyNotExist` only when none of them exist
    async fn string_get(
        &self,
        server: &CacheServer,
        params: &StringGetParams,
    ) -> Result<StringGetResponse, CacheError>;
    async fn string_append(
        &self,
        server: &CacheServer,
        params: &StringAppendParams,
    ) -> Result<StringAppendResponse, CacheError>;
    async fn string_bit_count(
        &self,
        server: &CacheServer,
        params: &StringBitCountParams,
    ) -> Result<StringBitCountResponse, CacheError>;
    async fn string_bit_operation(
        &self,
        server: &CacheServer,
        params: &StringBitOperationParams,
    ) -> Result<StringBitOperationResponse, CacheError>;
    async fn string_bit_position(
        &self,
        server: &CacheServer,
        params: &StringBitPositionParams,
    ) -> Result<StringBitPositionResponse, CacheError>;
    async fn string_decrement(
        &self,
        server: &CacheServer,
        params: &StringDecrementParams,
    ) -> Result<StringDecrementResponse, CacheError>;
    /// An absent key starts at zero; a non-numeric value fails with
    /// `ValueCannotBeCalculated` and is left untouched
    async fn string_increment(
        &self,
        server: &CacheServer,
        params: &StringIncrementParams,
    ) -> Result<StringIncrementResponse, CacheError>;
    async fn string_get_bit(
        &self,
        server: &CacheServer,
        params: &StringGetBitParams,
    ) -> Result<StringGetBitResponse, CacheError>;
    async fn string_get_range(
        &self,
        server: &CacheServer,
        params: &StringGetRangeParams,
    ) -> Result<StringGetRangeResponse, CacheError>;
    async fn string_get_set(
        &self,
        server: &CacheServer,
        params: &StringGetSetParams,
    ) -> Result<StringGetSetResponse, CacheError>;
    async fn string_length(
        &self,
        server: &CacheServer,
        params: &StringLengthParams,
    ) -> Result<StringLengthResponse, CacheError>;
    async fn string_set_bit(
        &self,
        server: &CacheServer,
        params: &StringSetBitParams,
    ) -> Result<StringSetBitResponse, CacheError>;
    async fn string_set_range(
        &self,
        server: &CacheServer,
        params: &StringSetRangeParams,
    ) -> Result<StringSetRangeResponse, CacheError>;

    // List

    async fn list_insert_before(
        &self,
        server: &CacheServer,
        params: &ListInsertBeforeParams,
    ) -> Result<ListInsertBeforeResponse, CacheError>;
    async fn list_insert_after(
        &self,
        server: &CacheServer,
        params: &ListInsertAfterParams,
    ) -> Result<ListInsertAfterResponse, CacheError>;
    async fn list_get_by_index(
        &self,
        server: &CacheServer,
        params: &ListGetByIndexParams,
    ) -> Result<ListGetByIndexResponse, CacheError>;
    async fn list_left_pop(
        &self,
        server: &CacheServer,
        params: &ListLeftPopParams,
    ) -> Result<ListLeftPopResponse, CacheError>;
    async fn list_left_push(
        &self,
        server: &CacheServer,
        params: &ListLeftPushParams,
    ) -> Result<ListLeftPushResponse, CacheError>;
    async fn list_length(
        &self,
        server: &CacheServer,
        params: &ListLengthParams,
    ) -> Result<ListLengthResponse, CacheError>;
    async fn list_range(
        &self,
        server: &CacheServer,
        params: &ListRangeParams,
    ) -> Result<ListRangeResponse, CacheError>;
    async fn list_remove(
        &self,
        server: &CacheServer,
        params: &ListRemoveParams,
    ) -> Result<ListRemoveResponse, CacheError>;
    async fn list_right_pop(
        &self,
        server: &CacheServer,
        params: &ListRightPopParams,
    ) -> Result<ListRightPopResponse, CacheError>;
    async fn list_right_pop_left_push(
        &self,
        server: &CacheServer,
        params: &ListRightPopLeftPushParams,
    ) -> Result<ListRightPopLeftPushResponse, CacheError>;
    async fn list_right_push(
        &self,
        server: &CacheServer,
        params: &ListRightPushParams,
    ) -> Result<ListRightPushResponse, CacheError>;
    async fn list_set_by_index(
        &self,
        server: &CacheServer,
        params: &ListSetByIndexParams,
    ) -> Result<ListSetByIndexResponse, CacheError>;
    async fn list_trim(
        &self,
        server: &CacheServer,
        params: &ListTrimParams,
    ) -> Result<ListTrimResponse, CacheError>;

    // Hash

    async fn hash_delete(
        &self,
        server: &CacheServer,
        params: &HashDeleteParams,
    ) -> Result<HashDeleteResponse, CacheError>;
    async fn hash_exist(
        &self,
        server: &CacheServer,
        params: &HashExistParams,
    ) -> Result<HashExistResponse, CacheError>;
    async fn hash_get(
        &self,
        server: &CacheServer,
        params: &HashGetParams,
    ) -> Result<HashGetResponse, CacheError>;
    async fn hash_get_all(
        &self,
        server: &CacheServer,
        params: &HashGetAllParams,
    ) -> Result<HashGetAllResponse, CacheError>;
    async fn hash_increment(
        &self,
        server: &CacheServer,
        params: &HashIncrementParams,
    ) -> Result<HashIncrementResponse, CacheError>;
    async fn hash_decrement(
        &self,
        server: &CacheServer,
        params: &HashDecrementParams,
    ) -> Result<HashDecrementResponse, CacheError>;
    async fn hash_keys(
        &self,
        server: &CacheServer,
        params: &HashKeysParams,
    ) -> Result<HashKeysResponse, CacheError>;
    async fn hash_length(
        &self,
        server: &CacheServer,
        params: &HashLengthParams,
    ) -> Result<HashLengthResponse, CacheError>;
    async fn hash_set(
        &self,
        server: &CacheServer,
        params: &HashSetParams,
    ) -> Result<HashSetResponse, CacheError>;
    async fn hash_values(
        &self,
        server: &CacheServer,
        params: &HashValuesParams,
    ) -> Result<HashValuesResponse, CacheError>;
    async fn hash_scan(
        &self,
        server: &CacheServer,
        params: &HashScanParams,
    ) -> Result<HashScanResponse, CacheError>;

    // Set

    async fn set_add(
        &self,
        server: &CacheServer,
        params: &SetAddParams,
    ) -> Result<SetAddResponse, CacheError>;
    async fn set_combine(
        &self,
        server: &CacheServer,
        params: &SetCombineParams,
    ) -> Result<SetCombineResponse, CacheError>;
    async fn set_combine_and_store(
        &self,
        server: &CacheServer,
        params: &SetCombineAndStoreParams,
    ) -> Result<SetCombineAndStoreResponse, CacheError>;
    async fn set_contains(
        &self,
        server: &CacheServer,
        params: &SetContainsParams,
    ) -> Result<SetContainsResponse, CacheError>;
    async fn set_length(
        &self,
        server: &CacheServer,
        params: &SetLengthParams,
    ) -> Result<SetLengthResponse, CacheError>;
    async fn set_members(
        &self,
        server: &CacheServer,
        params: &SetMembersParams,
    ) -> Result<SetMembersResponse, CacheError>;
    async fn set_move(
        &self,
        server: &CacheServer,
        params: &SetMoveParams,
    ) -> Result<SetMoveResponse, CacheError>;
    async fn set_pop(
        &self,
        server: &CacheServer,
        params: &SetPopParams,
    ) -> Result<SetPopResponse, CacheError>;
    async fn set_random_members(
        &self,
        server: &CacheServer,
        params: &SetRandomMembersParams,
    ) -> Result<SetRandomMembersResponse, CacheError>;
    async fn set_remove(
        &self,
        server: &CacheServer,
        params: &SetRemoveParams,
    ) -> Result<SetRemoveResponse, CacheError>;

    // Sorted set

    async fn sorted_set_add(
        &self,
        server: &CacheServer,
        params: &SortedSetAddParams,
    ) -> Result<SortedSetAddResponse, CacheError>;
    async fn sorted_set_combine_and_store(
        &self,
        server: &CacheServer,
        params: &SortedSetCombineAndStoreParams,
    ) -> Result<SortedSetCombineAndStoreResponse, CacheError>;
    async fn sorted_set_decrement(
        &self,
        server: &CacheServer,
        params: &SortedSetDecrementParams,
    ) -> Result<SortedSetDecrementResponse, CacheError>;
    async fn sorted_set_increment(
        &self,
        server: &CacheServer,
        params: &SortedSetIncrementParams,
    ) -> Result<SortedSetIncrementResponse, CacheError>;
    async fn sorted_set_length(
        &self,
        server: &CacheServer,
        params: &SortedSetLengthParams,
    ) -> Result<SortedSetLengthResponse, CacheError>;
    async fn sorted_set_length_by_value(
        &self,
        server: &CacheServer,
        params: &SortedSetLengthByValueParams,
    ) -> Result<SortedSetLengthByValueResponse, CacheError>;
    async fn sorted_set_range_by_rank(
        &self,
        server: &CacheServer,
        params: &SortedSetRangeByRankParams,
    ) -> Result<SortedSetRangeByRankResponse, CacheError>;
    async fn sorted_set_range_by_score(
        &self,
        server: &CacheServer,
        params: &SortedSetRangeByScoreParams,
    ) -> Result<SortedSetRangeByScoreResponse, CacheError>;
    async fn sorted_set_range_by_value(
        &self,
        server: &CacheServer,
        params: &SortedSetRangeByValueParams,
    ) -> Result<SortedSetRangeByValueResponse, CacheError>;
    async fn sorted_set_rank(
        &self,
        server: &CacheServer,
        params: &SortedSetRankParams,
    ) -> Result<SortedSetRankResponse, CacheError>;
    async fn sorted_set_remove(
        &self,
        server: &CacheServer,
        params: &SortedSetRemoveParams,
    ) -> Result<SortedSetRemoveResponse, CacheError>;
    async fn sorted_set_remove_range_by_rank(
        &self,
        server: &CacheServer,
        params: &SortedSetRemoveRangeByRankParams,
    ) -> Result<SortedSetRemoveRangeByRankResponse, CacheError>;
    async fn sorted_set_remove_range_by_score(
        &self,
        server: &CacheServer,
        params: &SortedSetRemoveRangeByScoreParams,
    ) -> Result<SortedSetRemoveRangeByScoreResponse, CacheError>;
    async fn sorted_set_remove_range_by_value(
        &self,
        server: &CacheServer,
        params: &SortedSetRemoveRangeByValueParams,
    ) -> Result<SortedSetRemoveRangeByValueResponse, CacheError>;
    async fn sorted_set_score(
        &self,
        server: &CacheServer,
        params: &SortedSetScoreParams,
    ) -> Result<SortedSetScoreResponse, CacheError>;

    // Keys

    async fn key_delete(
        &self,
        server: &CacheServer,
        params: &KeyDeleteParams,
    ) -> Result<KeyDeleteResponse, CacheError>;
    async fn key_dump(
        &self,
        server: &CacheServer,
        params: &KeyDumpParams,
    ) -> Result<KeyDumpResponse, CacheError>;
    async fn key_exist(
        &self,
        server: &CacheServer,
        params: &KeyExistParams,
    ) -> Result<KeyExistResponse, CacheError>;
    async fn key_expire(
        &self,
        server: &CacheServer,
        params: &KeyExpireParams,
    ) -> Result<KeyExpireResponse, CacheError>;
    async fn key_migrate(
        &self,
        server: &CacheServer,
        params: &KeyMigrateParams,
    ) -> Result<KeyMigrateResponse, CacheError>;
    async fn key_move(
        &self,
        server: &CacheServer,
        params: &KeyMoveParams,
    ) -> Result<KeyMoveResponse, CacheError>;
    async fn key_persist(
        &self,
        server: &CacheServer,
        params: &KeyPersistParams,
    ) -> Result<KeyPersistResponse, CacheError>;
    async fn key_random(
        &self,
        server: &CacheServer,
        params: &KeyRandomParams,
    ) -> Result<KeyRandomResponse, CacheError>;
    async fn key_rename(
        &self,
        server: &CacheServer,
        params: &KeyRenameParams,
    ) -> Result<KeyRenameResponse, CacheError>;
    async fn key_restore(
        &self,
        server: &CacheServer,
        params: &KeyRestoreParams,
    ) -> Result<KeyRestoreResponse, CacheError>;
    async fn key_scan(
        &self,
        server: &CacheServer,
        params: &KeyScanParams,
    ) -> Result<KeyScanResponse, CacheError>;
    async fn key_sort(
        &self,
        server: &CacheServer,
        params: &KeySortParams,
    ) -> Result<KeySortResponse, CacheError>;
    async fn key_sort_and_store(
        &self,
        server: &CacheServer,
        params: &KeySortAndStoreParams,
    ) -> Result<KeySortAndStoreResponse, CacheError>;
    async fn key_type(
        &self,
        server: &CacheServer,
        params: &KeyTypeParams,
    ) -> Result<KeyTypeResponse, CacheError>;
    async fn key_time_to_live(
        &self,
        server: &CacheServer,
        params: &KeyTimeToLiveParams,
    ) -> Result<KeyTimeToLiveResponse, CacheError>;

    // Server

    async fn clear_data(
        &self,
        server: &CacheServer,
        params: &ClearDataParams,
    ) -> Result<ClearDataResponse, CacheError>;
    async fn get_all_databases(
        &self,
        server: &CacheServer,
        params: &GetAllDatabasesParams,
    ) -> Result<GetAllDatabasesResponse, CacheError>;
    async fn get_keys(
        &self,
        server: &CacheServer,
        params: &GetKeysParams,
    ) -> Result<GetKeysResponse, CacheError>;
    async fn get_last_save(
        &self,
        server: &CacheServer,
        params: &GetLastSaveParams,
    ) -> Result<GetLastSaveResponse, CacheError>;
    async fn get_config(
        &self,
        server: &CacheServer,
        params: &GetConfigParams,
    ) -> Result<GetConfigResponse, CacheError>;
    async fn shutdown(
        &self,
        server: &CacheServer,
        params: &ShutdownParams,
    ) -> Result<ShutdownResponse, CacheError>;
}
