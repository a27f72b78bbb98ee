use crate::entry::{CacheExpiration, CacheValueType};
use crate::errors::ErrorCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum TypedValue {
    String(Vec<u8>),
    List(VecDeque<String>),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
    SortedSet(HashMap<String, f64>),
}

impl TypedValue {
    pub(crate) fn value_type(&self) -> CacheValueType {
        match self {
            TypedValue::String(_) => CacheValueType::String,
            TypedValue::List(_) => CacheValueType::List,
            TypedValue::Hash(_) => CacheValueType::Hash,
            TypedValue::Set(_) => CacheValueType::Set,
            TypedValue::SortedSet(_) => CacheValueType::SortedSet,
        }
    }

    fn is_empty_collection(&self) -> bool {
        match self {
            TypedValue::String(_) => false,
            TypedValue::List(list) => list.is_empty(),
            TypedValue::Hash(hash) => hash.is_empty(),
            TypedValue::Set(set) => set.is_empty(),
            TypedValue::SortedSet(zset) => zset.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Expiry {
    pub(crate) at: DateTime<Utc>,
    /// Window re-applied on every access
    pub(crate) sliding: Option<Duration>,
}

impl Expiry {
    pub(crate) fn from_policy(expiration: &CacheExpiration, now: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            at: expiration.expires_at(now)?,
            sliding: expiration.sliding_window(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredValue {
    pub(crate) value: TypedValue,
    pub(crate) expiry: Option<Expiry>,
}

impl StoredValue {
    pub(crate) fn new(value: TypedValue) -> Self {
        Self {
            value,
            expiry: None,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|e| e.at <= now)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        if let Some(expiry) = self.expiry.as_mut() {
            if let Some(window) = expiry.sliding.and_then(|w| chrono::Duration::from_std(w).ok()) {
                expiry.at = now + window;
            }
        }
    }

    /// Remaining lifetime, `None` for persistent values
    pub(crate) fn time_to_live(&self, now: DateTime<Utc>) -> Option<Duration> {
        let expiry = self.expiry?;
        Some((expiry.at - now).to_std().unwrap_or_default())
    }
}

macro_rules! typed_access {
    ($get:ident, $get_or_create:ident, $variant:ident, $ty:ty, $code:ident) => {
        /// Live value of this type; `Err` when the key holds another type
        pub(crate) fn $get(
            &mut self,
            key: &str,
            now: DateTime<Utc>,
        ) -> Result<Option<&mut $ty>, ErrorCode> {
            match self.get_mut(key, now) {
                None => Ok(None),
                Some(StoredValue { value: TypedValue::$variant(v), .. }) => Ok(Some(v)),
                Some(_) => Err(ErrorCode::$code),
            }
        }

        /// Live value of this type, created empty when absent
        pub(crate) fn $get_or_create(
            &mut self,
            key: &str,
            now: DateTime<Utc>,
        ) -> Result<&mut $ty, ErrorCode> {
            if self.get_mut(key, now).is_none() {
                self.entries.insert(
                    key.to_string(),
                    StoredValue::new(TypedValue::$variant(Default::default())),
                );
            }
            match self.entries.get_mut(key) {
                Some(StoredValue { value: TypedValue::$variant(v), .. }) => Ok(v),
                _ => Err(ErrorCode::$code),
            }
        }
    };
}

/// One database of a server. Expired values are purged lazily on access.
#[derive(Debug, Default)]
pub(crate) struct Keyspace {
    entries: HashMap<String, StoredValue>,
}

impl Keyspace {
    /// Live value, refreshing a sliding expiration
    pub(crate) fn get_mut(&mut self, key: &str, now: DateTime<Utc>) -> Option<&mut StoredValue> {
        let expired = self.entries.get(key)?.is_expired(now);
        if expired {
            self.entries.remove(key);
            return None;
        }
        let stored = self.entries.get_mut(key)?;
        stored.touch(now);
        Some(stored)
    }

    pub(crate) fn contains(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        self.get_mut(key, now).is_some()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, stored: StoredValue) {
        self.entries.insert(key.into(), stored);
    }

    /// Remove a value, live or not; `None` when nothing live was removed
    pub(crate) fn remove(&mut self, key: &str, now: DateTime<Utc>) -> Option<StoredValue> {
        let stored = self.entries.remove(key)?;
        (!stored.is_expired(now)).then_some(stored)
    }

    /// Drop the key when its collection became empty
    pub(crate) fn remove_if_empty(&mut self, key: &str) {
        if self
            .entries
            .get(key)
            .is_some_and(|s| s.value.is_empty_collection())
        {
            self.entries.remove(key);
        }
    }

    pub(crate) fn set_expiration(
        &mut self,
        key: &str,
        expiration: Option<&CacheExpiration>,
        now: DateTime<Utc>,
    ) {
        let Some(expiration) = expiration else {
            return;
        };
        if let Some(stored) = self.entries.get_mut(key) {
            stored.expiry = Expiry::from_policy(expiration, now);
        }
    }

    /// Live keys in sorted order; purges expired values
    pub(crate) fn keys(&mut self, now: DateTime<Utc>) -> Vec<String> {
        self.entries.retain(|_, stored| !stored.is_expired(now));
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub(crate) fn len(&mut self, now: DateTime<Utc>) -> usize {
        self.entries.retain(|_, stored| !stored.is_expired(now));
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    typed_access!(string, string_or_create, String, Vec<u8>, ValueIsNotString);
    typed_access!(list, list_or_create, List, VecDeque<String>, ValueIsNotList);
    typed_access!(hash, hash_or_create, Hash, HashMap<String, String>, ValueIsNotHash);
    typed_access!(set, set_or_create, Set, HashSet<String>, ValueIsNotSet);
    typed_access!(
        sorted_set,
        sorted_set_or_create,
        SortedSet,
        HashMap<String, f64>,
        ValueIsNotSortedSet
    );

    /// Clone of the live sorted set members in `(score, member)` order
    pub(crate) fn ordered_members(
        &mut self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, f64)>, ErrorCode> {
        Ok(self
            .sorted_set(key, now)?
            .map(|zset| ordered(zset))
            .unwrap_or_default())
    }
}

/// Members of a sorted set ordered by score, then by member
pub(crate) fn ordered(zset: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut members: Vec<(String, f64)> = zset.iter().map(|(m, s)| (m.clone(), *s)).collect();
    members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, second).unwrap()
    }

    #[test]
    fn test_expired_value_is_purged_on_access() {
        let mut space = Keyspace::default();
        let mut stored = StoredValue::new(TypedValue::String(b"v".to_vec()));
        stored.expiry = Some(Expiry {
            at: at(10),
            sliding: None,
        });
        space.insert("k", stored);

        assert!(space.contains("k", at(9)));
        assert!(!space.contains("k", at(10)));
        assert_eq!(space.len(at(10)), 0);
    }

    #[test]
    fn test_sliding_expiration_is_refreshed() {
        let mut space = Keyspace::default();
        space.insert("k", StoredValue::new(TypedValue::String(b"v".to_vec())));
        space.set_expiration("k", Some(&CacheExpiration::sliding(Duration::from_secs(5))), at(0));

        assert!(space.contains("k", at(4)));
        assert!(space.contains("k", at(8)));
        assert!(!space.contains("k", at(14)));
    }

    #[test]
    fn test_typed_access_rejects_other_types() {
        let mut space = Keyspace::default();
        space.list_or_create("l", at(0)).unwrap().push_back("a".into());

        assert_eq!(space.string("l", at(0)), Err(ErrorCode::ValueIsNotString));
        assert_eq!(space.hash_or_create("l", at(0)).err(), Some(ErrorCode::ValueIsNotHash));
        assert_eq!(space.list("missing", at(0)), Ok(None));
    }

    #[test]
    fn test_empty_collections_are_dropped() {
        let mut space = Keyspace::default();
        space.set_or_create("s", at(0)).unwrap();
        space.remove_if_empty("s");
        assert!(!space.contains("s", at(0)));
    }

    #[test]
    fn test_sorted_members_tie_break_by_member() {
        let zset = HashMap::from([
            ("b".to_string(), 1.0),
            ("a".to_string(), 1.0),
            ("c".to_string(), 0.5),
        ]);
        let names: Vec<String> = ordered(&zset).into_iter().map(|(m, _)| m).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
