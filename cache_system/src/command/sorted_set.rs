//! Sorted set commands

use super::{CacheStatus, CommandOptions};
use crate::entry::CacheExpiration;
use crate::keys::CacheKey;
use crate::values::{
    CombineOperation, LexBound, ScoreBound, SetAggregate, SortOrder, SortedSetMember,
};

/// Add members or update their scores
#[derive(Debug, Clone, Default)]
pub struct SortedSetAddParams {
    pub key: CacheKey,
    pub members: Vec<SortedSetMember>,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl SortedSetAddParams {
    pub fn new(key: CacheKey, members: Vec<SortedSetMember>) -> Self {
        Self {
            key,
            members,
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_expiration(mut self, expiration: CacheExpiration) -> Self {
        self.expiration = Some(expiration);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetAddResponse {
    pub status: CacheStatus,
    /// Members that were not present before
    pub added: i64,
}

/// Combine sorted sets into a destination. `weights` multiply the scores of
/// the source at the same position; missing weights count as 1.
#[derive(Debug, Clone)]
pub struct SortedSetCombineAndStoreParams {
    pub keys: Vec<CacheKey>,
    pub destination_key: CacheKey,
    pub operation: CombineOperation,
    pub weights: Vec<f64>,
    pub aggregate: SetAggregate,
    pub expiration: Option<CacheExpiration>,
    pub options: CommandOptions,
}

impl SortedSetCombineAndStoreParams {
    pub fn new(
        keys: Vec<CacheKey>,
        destination_key: CacheKey,
        operation: CombineOperation,
    ) -> Self {
        Self {
            keys,
            destination_key,
            operation,
            weights: Vec::new(),
            aggregate: SetAggregate::Sum,
            expiration: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_aggregate(mut self, aggregate: SetAggregate) -> Self {
        self.aggregate = aggregate;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetCombineAndStoreResponse {
    pub status: CacheStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetDecrementParams {
    pub key: CacheKey,
    pub member: String,
    pub value: f64,
    pub options: CommandOptions,
}

impl SortedSetDecrementParams {
    pub fn new(key: CacheKey, member: impl Into<String>, value: f64) -> Self {
        Self {
            key,
            member: member.into(),
            value,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetDecrementResponse {
    pub status: CacheStatus,
    pub new_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetIncrementParams {
    pub key: CacheKey,
    pub member: String,
    pub value: f64,
    pub options: CommandOptions,
}

impl SortedSetIncrementParams {
    pub fn new(key: CacheKey, member: impl Into<String>, value: f64) -> Self {
        Self {
            key,
            member: member.into(),
            value,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetIncrementResponse {
    pub status: CacheStatus,
    pub new_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetLengthParams {
    pub key: CacheKey,
    pub options: CommandOptions,
}

impl SortedSetLengthParams {
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetLengthResponse {
    pub status: CacheStatus,
    pub length: i64,
}

/// Count members between two lexicographic bounds
#[derive(Debug, Clone, Default)]
pub struct SortedSetLengthByValueParams {
    pub key: CacheKey,
    pub min: LexBound,
    pub max: LexBound,
    pub options: CommandOptions,
}

impl SortedSetLengthByValueParams {
    pub fn new(key: CacheKey, min: LexBound, max: LexBound) -> Self {
        Self {
            key,
            min,
            max,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetLengthByValueResponse {
    pub status: CacheStatus,
    pub length: i64,
}

/// Members in the inclusive rank range `[start, end]`
#[derive(Debug, Clone, Default)]
pub struct SortedSetRangeByRankParams {
    pub key: CacheKey,
    pub start: i64,
    pub end: i64,
    pub order: SortOrder,
    pub options: CommandOptions,
}

impl SortedSetRangeByRankParams {
    pub fn new(key: CacheKey, start: i64, end: i64) -> Self {
        Self {
            key,
            start,
            end,
            order: SortOrder::Ascending,
            options: CommandOptions::default(),
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRangeByRankResponse {
    pub status: CacheStatus,
    pub members: Vec<SortedSetMember>,
}

#[derive(Debug, Clone)]
pub struct SortedSetRangeByScoreParams {
    pub key: CacheKey,
    pub min: ScoreBound,
    pub max: ScoreBound,
    pub order: SortOrder,
    pub offset: usize,
    pub count: Option<usize>,
    pub options: CommandOptions,
}

impl SortedSetRangeByScoreParams {
    pub fn new(key: CacheKey, min: ScoreBound, max: ScoreBound) -> Self {
        Self {
            key,
            min,
            max,
            order: SortOrder::Ascending,
            offset: 0,
            count: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_limit(mut self, offset: usize, count: usize) -> Self {
        self.offset = offset;
        self.count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRangeByScoreResponse {
    pub status: CacheStatus,
    pub members: Vec<SortedSetMember>,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRangeByValueParams {
    pub key: CacheKey,
    pub min: LexBound,
    pub max: LexBound,
    pub order: SortOrder,
    pub offset: usize,
    pub count: Option<usize>,
    pub options: CommandOptions,
}

impl SortedSetRangeByValueParams {
    pub fn new(key: CacheKey, min: LexBound, max: LexBound) -> Self {
        Self {
            key,
            min,
            max,
            order: SortOrder::Ascending,
            offset: 0,
            count: None,
            options: CommandOptions::default(),
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_limit(mut self, offset: usize, count: usize) -> Self {
        self.offset = offset;
        self.count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRangeByValueResponse {
    pub status: CacheStatus,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRankParams {
    pub key: CacheKey,
    pub member: String,
    pub order: SortOrder,
    pub options: CommandOptions,
}

impl SortedSetRankParams {
    pub fn new(key: CacheKey, member: impl Into<String>) -> Self {
        Self {
            key,
            member: member.into(),
            order: SortOrder::Ascending,
            options: CommandOptions::default(),
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRankResponse {
    pub status: CacheStatus,
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRemoveParams {
    pub key: CacheKey,
    pub members: Vec<String>,
    pub options: CommandOptions,
}

impl SortedSetRemoveParams {
    pub fn new(key: CacheKey, members: Vec<String>) -> Self {
        Self {
            key,
            members,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRemoveResponse {
    pub status: CacheStatus,
    pub removed: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRemoveRangeByRankParams {
    pub key: CacheKey,
    pub start: i64,
    pub end: i64,
    pub options: CommandOptions,
}

impl SortedSetRemoveRangeByRankParams {
    pub fn new(key: CacheKey, start: i64, end: i64) -> Self {
        Self {
            key,
            start,
            end,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRemoveRangeByRankResponse {
    pub status: CacheStatus,
    pub removed: i64,
}

#[derive(Debug, Clone)]
pub struct SortedSetRemoveRangeByScoreParams {
    pub key: CacheKey,
    pub min: ScoreBound,
    pub max: ScoreBound,
    pub options: CommandOptions,
}

impl SortedSetRemoveRangeByScoreParams {
    pub fn new(key: CacheKey, min: ScoreBound, max: ScoreBound) -> Self {
        Self {
            key,
            min,
            max,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRemoveRangeByScoreResponse {
    pub status: CacheStatus,
    pub removed: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRemoveRangeByValueParams {
    pub key: CacheKey,
    pub min: LexBound,
    pub max: LexBound,
    pub options: CommandOptions,
}

impl SortedSetRemoveRangeByValueParams {
    pub fn new(key: CacheKey, min: LexBound, max: LexBound) -> Self {
        Self {
            key,
            min,
            max,
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetRemoveRangeByValueResponse {
    pub status: CacheStatus,
    pub removed: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetScoreParams {
    pub key: CacheKey,
    pub member: String,
    pub options: CommandOptions,
}

impl SortedSetScoreParams {
    pub fn new(key: CacheKey, member: impl Into<String>) -> Self {
        Self {
            key,
            member: member.into(),
            options: CommandOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SortedSetScoreResponse {
    pub status: CacheStatus,
    pub score: Option<f64>,
}

impl_response!(
    SortedSetAddResponse,
    SortedSetCombineAndStoreResponse,
    SortedSetDecrementResponse,
    SortedSetIncrementResponse,
    SortedSetLengthResponse,
    SortedSetLengthByValueResponse,
    SortedSetRangeByRankResponse,
    SortedSetRangeByScoreResponse,
    SortedSetRangeByValueResponse,
    SortedSetRankResponse,
    SortedSetRemoveResponse,
    SortedSetRemoveRangeByRankResponse,
    SortedSetRemoveRangeByScoreResponse,
    SortedSetRemoveRangeByValueResponse,
    SortedSetScoreResponse,
);
