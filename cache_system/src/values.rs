//! Shared value types used by command parameters and responses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric operand or result of increment/decrement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CacheNumber {
    Integer(i64),
    Float(f64),
}

impl Default for CacheNumber {
    fn default() -> Self {
        CacheNumber::Integer(0)
    }
}

impl CacheNumber {
    /// Parse stored text; integers first, then finite floats
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(value) = text.parse::<i64>() {
            return Some(CacheNumber::Integer(value));
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(CacheNumber::Float(value)),
            _ => None,
        }
    }

    /// Sum, staying integral while both sides are integers. `None` on overflow.
    pub fn checked_add(self, other: CacheNumber) -> Option<CacheNumber> {
        match (self, other) {
            (CacheNumber::Integer(a), CacheNumber::Integer(b)) => {
                a.checked_add(b).map(CacheNumber::Integer)
            }
            (a, b) => {
                let sum = a.as_f64() + b.as_f64();
                sum.is_finite().then_some(CacheNumber::Float(sum))
            }
        }
    }

    pub fn checked_neg(self) -> Option<CacheNumber> {
        match self {
            CacheNumber::Integer(value) => value.checked_neg().map(CacheNumber::Integer),
            CacheNumber::Float(value) => Some(CacheNumber::Float(-value)),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            CacheNumber::Integer(value) => *value as f64,
            CacheNumber::Float(value) => *value,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, CacheNumber::Integer(_))
    }
}

impl fmt::Display for CacheNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheNumber::Integer(value) => write!(f, "{}", value),
            CacheNumber::Float(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for CacheNumber {
    fn from(value: i64) -> Self {
        CacheNumber::Integer(value)
    }
}

impl From<f64> for CacheNumber {
    fn from(value: f64) -> Self {
        CacheNumber::Float(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// How several sets are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineOperation {
    Union,
    Intersect,
    Difference,
}

/// How scores of the same member are merged when combining sorted sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SetAggregate {
    #[default]
    Sum,
    Min,
    Max,
}

impl SetAggregate {
    pub fn apply(&self, current: f64, incoming: f64) -> f64 {
        match self {
            SetAggregate::Sum => current + incoming,
            SetAggregate::Min => current.min(incoming),
            SetAggregate::Max => current.max(incoming),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitOperation {
    And,
    Or,
    Xor,
    Not,
}

/// Score boundary of a sorted set range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScoreBound {
    Inclusive(f64),
    Exclusive(f64),
}

impl ScoreBound {
    pub fn negative_infinity() -> Self {
        ScoreBound::Inclusive(f64::NEG_INFINITY)
    }

    pub fn positive_infinity() -> Self {
        ScoreBound::Inclusive(f64::INFINITY)
    }

    /// Whether `score` lies above this lower bound
    pub fn admits_from_below(&self, score: f64) -> bool {
        match self {
            ScoreBound::Inclusive(min) => score >= *min,
            ScoreBound::Exclusive(min) => score > *min,
        }
    }

    /// Whether `score` lies below this upper bound
    pub fn admits_from_above(&self, score: f64) -> bool {
        match self {
            ScoreBound::Inclusive(max) => score <= *max,
            ScoreBound::Exclusive(max) => score < *max,
        }
    }
}

/// Lexicographic boundary of a sorted set range
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LexBound {
    #[default]
    Unbounded,
    Inclusive(String),
    Exclusive(String),
}

impl LexBound {
    pub fn admits_from_below(&self, value: &str) -> bool {
        match self {
            LexBound::Unbounded => true,
            LexBound::Inclusive(min) => value >= min.as_str(),
            LexBound::Exclusive(min) => value > min.as_str(),
        }
    }

    pub fn admits_from_above(&self, value: &str) -> bool {
        match self {
            LexBound::Unbounded => true,
            LexBound::Inclusive(max) => value <= max.as_str(),
            LexBound::Exclusive(max) => value < max.as_str(),
        }
    }
}

/// Member of a sorted set with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortedSetMember {
    pub value: String,
    pub score: f64,
}

impl SortedSetMember {
    pub fn new(value: impl Into<String>, score: f64) -> Self {
        Self {
            value: value.into(),
            score,
        }
    }
}

/// Resolve an inclusive `[start, end]` range over `len` items, where negative
/// indices count from the end. `None` when the range selects nothing.
pub fn normalize_range(start: i64, end: i64, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    if start > end || start >= len || end < 0 {
        return None;
    }
    Some((start as usize, end as usize))
}

/// Resolve a single possibly negative index
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_range_selects_last_element() {
        assert_eq!(normalize_range(-1, -1, 5), Some((4, 4)));
        assert_eq!(normalize_range(0, -1, 5), Some((0, 4)));
        assert_eq!(normalize_range(-100, 100, 3), Some((0, 2)));
        assert_eq!(normalize_range(3, 1, 5), None);
        assert_eq!(normalize_range(7, 9, 5), None);
        assert_eq!(normalize_range(0, -1, 0), None);
    }

    #[test]
    fn test_normalize_index() {
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(normalize_index(-4, 3), None);
    }

    #[test]
    fn test_number_parsing_and_arithmetic() {
        assert_eq!(CacheNumber::parse("10"), Some(CacheNumber::Integer(10)));
        assert_eq!(CacheNumber::parse(" 2.5 "), Some(CacheNumber::Float(2.5)));
        assert_eq!(CacheNumber::parse("abc"), None);
        assert_eq!(CacheNumber::parse("inf"), None);

        let sum = CacheNumber::Integer(1).checked_add(CacheNumber::Float(0.5));
        assert_eq!(sum, Some(CacheNumber::Float(1.5)));
        assert_eq!(CacheNumber::Integer(i64::MAX).checked_add(1.into()), None);
        assert_eq!(CacheNumber::Float(3.0).to_string(), "3");
    }

    #[test]
    fn test_bounds() {
        assert!(ScoreBound::Exclusive(1.0).admits_from_below(1.5));
        assert!(!ScoreBound::Exclusive(1.0).admits_from_below(1.0));
        assert!(ScoreBound::positive_infinity().admits_from_above(1e300));
        assert!(LexBound::Inclusive("b".into()).admits_from_below("b"));
        assert!(!LexBound::Exclusive("b".into()).admits_from_above("b"));
    }
}
