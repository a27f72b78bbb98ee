use super::keyspace::{Expiry, Keyspace, StoredValue, TypedValue};
use crate::command::CacheResponse;
use crate::command::string::*;
use crate::entry::SetCondition;
use crate::errors::ErrorCode;
use crate::values::{BitOperation, CacheNumber, normalize_range};
use chrono::{DateTime, Utc};

/// Largest bit offset accepted by bit writes (512 MiB values)
const MAX_BIT_OFFSET: i64 = (1 << 32) - 1;

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Whether a write gated by `when` may proceed, or the code it fails with
fn check_condition(
    space: &mut Keyspace,
    key: &str,
    when: &SetCondition,
    now: DateTime<Utc>,
) -> Result<(), ErrorCode> {
    let exists = space.contains(key, now);
    match when {
        SetCondition::Always => Ok(()),
        SetCondition::IfExists if !exists => Err(ErrorCode::KeyNotExist),
        SetCondition::IfExists => Ok(()),
        SetCondition::IfNotExists if exists => Err(ErrorCode::NoResult),
        SetCondition::IfNotExists => Ok(()),
        SetCondition::Equal(expected) => match space.string(key, now)? {
            Some(current) if current.as_slice() == expected.as_bytes() => Ok(()),
            _ => Err(ErrorCode::NoResult),
        },
        SetCondition::NotEqual(expected) => match space.string(key, now)? {
            Some(current) if current.as_slice() == expected.as_bytes() => Err(ErrorCode::NoResult),
            _ => Ok(()),
        },
    }
}

pub(super) fn set(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringSetParams,
) -> StringSetResponse {
    if params.entries.is_empty() {
        return StringSetResponse::failure(ErrorCode::ValuesIsNullOrEmpty);
    }
    let mut response = StringSetResponse::success();
    let mut first_failure = None;
    for entry in &params.entries {
        let key = entry.key.to_text();
        let outcome = if key.trim().is_empty() {
            Err(ErrorCode::KeyIsNullOrEmpty)
        } else {
            check_condition(space, &key, &entry.when, now)
        };
        match outcome {
            Ok(()) => {
                let mut stored =
                    StoredValue::new(TypedValue::String(entry.value.as_bytes().to_vec()));
                stored.expiry = entry
                    .expiration
                    .as_ref()
                    .and_then(|e| Expiry::from_policy(e, now));
                space.insert(key.clone(), stored);
                response.results.push(StringSetResult { key, stored: true });
            }
            Err(code) => {
                first_failure.get_or_insert(code);
                response.results.push(StringSetResult { key, stored: false });
            }
        }
    }
    if let Some(code) = first_failure {
        response.fail(code);
    }
    response
}

pub(super) fn get(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringGetParams,
) -> StringGetResponse {
    if params.keys.is_empty() {
        return StringGetResponse::failure(ErrorCode::KeyIsNullOrEmpty);
    }
    let mut response = StringGetResponse::success();
    for key in &params.keys {
        let key = key.to_text();
        let value = match space.string(&key, now) {
            Ok(Some(bytes)) => Some(lossy(bytes)),
            _ => None,
        };
        response.values.push(StringValue { key, value });
    }
    if response.values.iter().all(|v| v.value.is_none()) {
        response.fail(ErrorCode::KeyNotExist);
    }
    response
}

pub(super) fn append(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringAppendParams,
) -> StringAppendResponse {
    let key = key_or_fail!(&params.key);
    let bytes = value_or_fail!(space.string_or_create(&key, now));
    bytes.extend_from_slice(params.value.as_bytes());
    let new_length = bytes.len() as i64;
    space.set_expiration(&key, params.expiration.as_ref(), now);
    StringAppendResponse {
        new_length,
        ..StringAppendResponse::success()
    }
}

pub(super) fn bit_count(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringBitCountParams,
) -> StringBitCountResponse {
    let key = key_or_fail!(&params.key);
    let bytes = value_or_fail!(space.string(&key, now))
        .map(|b| b.as_slice())
        .unwrap_or_default();
    let bit_count = normalize_range(params.start, params.end, bytes.len())
        .map(|(s, e)| bytes[s..=e].iter().map(|b| b.count_ones() as i64).sum::<i64>())
        .unwrap_or(0);
    StringBitCountResponse {
        bit_count,
        ..StringBitCountResponse::success()
    }
}

pub(super) fn bit_operation(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringBitOperationParams,
) -> StringBitOperationResponse {
    let destination = key_or_fail!(&params.destination_key);
    if params.keys.is_empty() {
        return StringBitOperationResponse::failure(ErrorCode::ValuesIsNullOrEmpty);
    }
    if params.operation == BitOperation::Not && params.keys.len() != 1 {
        return StringBitOperationResponse::failure_with(
            ErrorCode::OperationUnsupported,
            "bitwise NOT takes exactly one source key",
        );
    }

    let mut sources = Vec::with_capacity(params.keys.len());
    for key in &params.keys {
        let key = key_or_fail!(key);
        let bytes = value_or_fail!(space.string(&key, now));
        sources.push(bytes.map(|b| b.clone()).unwrap_or_default());
    }

    let length = sources.iter().map(Vec::len).max().unwrap_or(0);
    let byte_at = |source: &Vec<u8>, i: usize| source.get(i).copied().unwrap_or(0);
    let result: Vec<u8> = (0..length)
        .map(|i| {
            let mut bytes = sources.iter().map(|s| byte_at(s, i));
            let first = bytes.next().unwrap_or(0);
            match params.operation {
                BitOperation::And => bytes.fold(first, |acc, b| acc & b),
                BitOperation::Or => bytes.fold(first, |acc, b| acc | b),
                BitOperation::Xor => bytes.fold(first, |acc, b| acc ^ b),
                BitOperation::Not => !first,
            }
        })
        .collect();

    if result.is_empty() {
        space.remove(&destination, now);
    } else {
        space.insert(destination.clone(), StoredValue::new(TypedValue::String(result)));
        space.set_expiration(&destination, params.expiration.as_ref(), now);
    }
    StringBitOperationResponse {
        length: length as i64,
        ..StringBitOperationResponse::success()
    }
}

pub(super) fn bit_position(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringBitPositionParams,
) -> StringBitPositionResponse {
    let key = key_or_fail!(&params.key);
    let bytes = value_or_fail!(space.string(&key, now));
    let bytes = bytes.map(|b| b.as_slice()).unwrap_or_default();

    let position = match normalize_range(params.start, params.end, bytes.len()) {
        None if bytes.is_empty() && !params.bit => 0,
        None => -1,
        Some((start, end)) => {
            let found = (start..=end)
                .flat_map(|i| (0..8).map(move |bit| (i, bit)))
                .find(|&(i, bit)| (bytes[i] & (0x80 >> bit) != 0) == params.bit);
            match found {
                Some((i, bit)) => (i * 8 + bit) as i64,
                // Looking for a clear bit past an all-ones value without an explicit end
                None if !params.bit && params.end == -1 => ((end + 1) * 8) as i64,
                None => -1,
            }
        }
    };
    StringBitPositionResponse {
        position,
        ..StringBitPositionResponse::success()
    }
}

/// Apply `delta` to the numeric value stored at `key`, starting from zero
fn add_number(
    space: &mut Keyspace,
    key: &str,
    delta: CacheNumber,
    now: DateTime<Utc>,
) -> Result<CacheNumber, ErrorCode> {
    let current = match space.string(key, now)? {
        None => CacheNumber::Integer(0),
        Some(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(CacheNumber::parse)
            .ok_or(ErrorCode::ValueCannotBeCalculated)?,
    };
    let result = current
        .checked_add(delta)
        .ok_or(ErrorCode::ValueCannotBeCalculated)?;
    let bytes = space.string_or_create(key, now)?;
    *bytes = result.to_string().into_bytes();
    Ok(result)
}

pub(super) fn increment(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringIncrementParams,
) -> StringIncrementResponse {
    let key = key_or_fail!(&params.key);
    let new_value = value_or_fail!(add_number(space, &key, params.value, now));
    space.set_expiration(&key, params.expiration.as_ref(), now);
    StringIncrementResponse {
        new_value,
        ..StringIncrementResponse::success()
    }
}

pub(super) fn decrement(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringDecrementParams,
) -> StringDecrementResponse {
    let key = key_or_fail!(&params.key);
    let Some(delta) = params.value.checked_neg() else {
        return StringDecrementResponse::failure(ErrorCode::ValueCannotBeCalculated);
    };
    let new_value = value_or_fail!(add_number(space, &key, delta, now));
    space.set_expiration(&key, params.expiration.as_ref(), now);
    StringDecrementResponse {
        new_value,
        ..StringDecrementResponse::success()
    }
}

pub(super) fn get_bit(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringGetBitParams,
) -> StringGetBitResponse {
    let key = key_or_fail!(&params.key);
    if params.offset < 0 {
        return StringGetBitResponse::failure(ErrorCode::OffsetLessThanZero);
    }
    let bytes = value_or_fail!(space.string(&key, now));
    let byte = (params.offset / 8) as usize;
    let bit = (params.offset % 8) as u32;
    let bit = bytes
        .and_then(|b| b.get(byte).copied())
        .is_some_and(|b| b & (0x80 >> bit) != 0);
    StringGetBitResponse {
        bit,
        ..StringGetBitResponse::success()
    }
}

pub(super) fn get_range(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringGetRangeParams,
) -> StringGetRangeResponse {
    let key = key_or_fail!(&params.key);
    let bytes = value_or_fail!(space.string(&key, now))
        .map(|b| b.as_slice())
        .unwrap_or_default();
    let value = normalize_range(params.start, params.end, bytes.len())
        .map(|(s, e)| lossy(&bytes[s..=e]))
        .unwrap_or_default();
    StringGetRangeResponse {
        value,
        ..StringGetRangeResponse::success()
    }
}

pub(super) fn get_set(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringGetSetParams,
) -> StringGetSetResponse {
    let key = key_or_fail!(&params.key);
    let old_value = value_or_fail!(space.string(&key, now)).map(|b| lossy(b));
    space.insert(
        key,
        StoredValue::new(TypedValue::String(params.new_value.as_bytes().to_vec())),
    );
    StringGetSetResponse {
        old_value,
        ..StringGetSetResponse::success()
    }
}

pub(super) fn length(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringLengthParams,
) -> StringLengthResponse {
    let key = key_or_fail!(&params.key);
    let length = value_or_fail!(space.string(&key, now)).map_or(0, |b| b.len() as i64);
    StringLengthResponse {
        length,
        ..StringLengthResponse::success()
    }
}

pub(super) fn set_bit(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringSetBitParams,
) -> StringSetBitResponse {
    let key = key_or_fail!(&params.key);
    if params.offset < 0 {
        return StringSetBitResponse::failure(ErrorCode::OffsetLessThanZero);
    }
    if params.offset > MAX_BIT_OFFSET {
        return StringSetBitResponse::failure(ErrorCode::OffsetInvalid);
    }
    let bytes = value_or_fail!(space.string_or_create(&key, now));
    let byte = (params.offset / 8) as usize;
    let mask = 0x80u8 >> (params.offset % 8);
    if bytes.len() <= byte {
        bytes.resize(byte + 1, 0);
    }
    let old_bit = bytes[byte] & mask != 0;
    if params.bit {
        bytes[byte] |= mask;
    } else {
        bytes[byte] &= !mask;
    }
    space.set_expiration(&key, params.expiration.as_ref(), now);
    StringSetBitResponse {
        old_bit,
        ..StringSetBitResponse::success()
    }
}

pub(super) fn set_range(
    space: &mut Keyspace,
    now: DateTime<Utc>,
    params: &StringSetRangeParams,
) -> StringSetRangeResponse {
    let key = key_or_fail!(&params.key);
    if params.offset < 0 {
        return StringSetRangeResponse::failure(ErrorCode::OffsetLessThanZero);
    }
    if params.offset > MAX_BIT_OFFSET / 8 {
        return StringSetRangeResponse::failure(ErrorCode::OffsetInvalid);
    }
    if params.value.is_empty() {
        let length = value_or_fail!(space.string(&key, now)).map_or(0, |b| b.len() as i64);
        return StringSetRangeResponse {
            new_length: length,
            ..StringSetRangeResponse::success()
        };
    }
    let bytes = value_or_fail!(space.string_or_create(&key, now));
    let offset = params.offset as usize;
    let end = offset + params.value.len();
    if bytes.len() < end {
        bytes.resize(end, 0);
    }
    bytes[offset..end].copy_from_slice(params.value.as_bytes());
    let new_length = bytes.len() as i64;
    space.set_expiration(&key, params.expiration.as_ref(), now);
    StringSetRangeResponse {
        new_length,
        ..StringSetRangeResponse::success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::CacheKey;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn seeded(values: &[(&str, &str)]) -> Keyspace {
        let mut space = Keyspace::default();
        for (key, value) in values {
            let params = StringSetParams::single(CacheKey::constant(*key), *value);
            assert!(set(&mut space, now(), &params).is_success());
        }
        space
    }

    fn raw(space: &mut Keyspace, key: &str) -> Option<Vec<u8>> {
        space.string(key, now()).unwrap().map(|b| b.clone())
    }

    #[test]
    fn test_set_bit_grows_value_and_reports_old_bit() {
        let mut space = Keyspace::default();
        let params = StringSetBitParams::new(CacheKey::constant("bits"), 7, true);
        assert!(!set_bit(&mut space, now(), &params).old_bit);
        assert!(set_bit(&mut space, now(), &params).old_bit);
        assert_eq!(raw(&mut space, "bits"), Some(vec![0x01]));

        let get = StringGetBitParams::new(CacheKey::constant("bits"), 7);
        assert!(get_bit(&mut space, now(), &get).bit);
        let past_end = StringGetBitParams::new(CacheKey::constant("bits"), 100);
        assert!(!get_bit(&mut space, now(), &past_end).bit);
    }

    #[test]
    fn test_bit_offsets_are_validated() {
        let mut space = Keyspace::default();
        let negative = StringSetBitParams::new(CacheKey::constant("bits"), -1, true);
        assert_eq!(
            set_bit(&mut space, now(), &negative).code(),
            Some(ErrorCode::OffsetLessThanZero)
        );
        let too_far = StringSetBitParams::new(CacheKey::constant("bits"), MAX_BIT_OFFSET + 1, true);
        assert_eq!(set_bit(&mut space, now(), &too_far).code(), Some(ErrorCode::OffsetInvalid));
        assert!(!space.contains("bits", now()));
    }

    #[test]
    fn test_bit_operations_pad_shorter_sources() {
        let mut space = seeded(&[("x", "ab"), ("y", "a")]);
        let sources = vec![CacheKey::constant("x"), CacheKey::constant("y")];

        let and = StringBitOperationParams::new(
            BitOperation::And,
            sources.clone(),
            CacheKey::constant("and"),
        );
        assert_eq!(bit_operation(&mut space, now(), &and).length, 2);
        assert_eq!(raw(&mut space, "and"), Some(vec![0x61, 0x00]));

        let xor = StringBitOperationParams::new(
            BitOperation::Xor,
            sources.clone(),
            CacheKey::constant("xor"),
        );
        assert!(bit_operation(&mut space, now(), &xor).is_success());
        assert_eq!(raw(&mut space, "xor"), Some(vec![0x00, 0x62]));

        let not =
            StringBitOperationParams::new(BitOperation::Not, sources, CacheKey::constant("not"));
        assert_eq!(
            bit_operation(&mut space, now(), &not).code(),
            Some(ErrorCode::OperationUnsupported)
        );

        let not = StringBitOperationParams::new(
            BitOperation::Not,
            vec![CacheKey::constant("y")],
            CacheKey::constant("not"),
        );
        assert!(bit_operation(&mut space, now(), &not).is_success());
        assert_eq!(raw(&mut space, "not"), Some(vec![0x9e]));
    }

    #[test]
    fn test_bit_count_and_position() {
        let mut space = seeded(&[("k", "ab")]);
        let count =
            bit_count(&mut space, now(), &StringBitCountParams::new(CacheKey::constant("k")));
        assert_eq!(count.bit_count, 6);

        let first_set = bit_position(
            &mut space,
            now(),
            &StringBitPositionParams::new(CacheKey::constant("k"), true),
        );
        assert_eq!(first_set.position, 1);
        let second_byte =
            StringBitPositionParams::new(CacheKey::constant("k"), true).with_range(1, 1);
        assert_eq!(bit_position(&mut space, now(), &second_byte).position, 9);
    }

    #[test]
    fn test_set_range_overwrites_and_pads() {
        let mut space = seeded(&[("k", "Hello World")]);
        let params = StringSetRangeParams::new(CacheKey::constant("k"), 6, "Redis");
        assert_eq!(set_range(&mut space, now(), &params).new_length, 11);
        let tail = get_range(
            &mut space,
            now(),
            &StringGetRangeParams::new(CacheKey::constant("k"), -5, -1),
        );
        assert_eq!(tail.value, "Redis");

        let params = StringSetRangeParams::new(CacheKey::constant("fresh"), 3, "x");
        assert_eq!(set_range(&mut space, now(), &params).new_length, 4);
        assert_eq!(raw(&mut space, "fresh"), Some(b"\0\0\0x".to_vec()));
    }

    #[test]
    fn test_set_range_edge_cases() {
        let mut space = Keyspace::default();
        let empty = StringSetRangeParams::new(CacheKey::constant("none"), 0, "");
        assert_eq!(set_range(&mut space, now(), &empty).new_length, 0);
        assert!(!space.contains("none", now()));

        let negative = StringSetRangeParams::new(CacheKey::constant("none"), -1, "x");
        assert_eq!(
            set_range(&mut space, now(), &negative).code(),
            Some(ErrorCode::OffsetLessThanZero)
        );
    }
}
