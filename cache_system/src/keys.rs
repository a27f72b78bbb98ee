//! Cache key composition
//!
//! A `CacheKey` is an ordered list of name/value segments, optionally owned by
//! a `CacheObject`. The `KeyComposer` turns it into the text stored on the
//! backend:
//!
//! ```text
//! global-prefix... : object-prefix... : name[:value] ...
//! ```
//!
//! The composed text is memoized on the key together with the identity of the
//! composer that produced it. A clone starts without a memo.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

pub const DEFAULT_KEY_SPLIT: &str = ":";
pub const DEFAULT_NAME_VALUE_SPLIT: &str = ":";

/// Produces the global prefix segments
pub type GlobalPrefixFn = Arc<dyn Fn() -> Vec<String> + Send + Sync>;

/// Produces the prefix segments of a cache object
pub type ObjectPrefixFn = Arc<dyn Fn(&CacheObject) -> Vec<String> + Send + Sync>;

/// Logical entity (table, collection) a key belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheObject {
    pub name: String,
}

impl CacheObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySegment {
    pub name: String,
    pub value: String,
}

static NEXT_COMPOSER_ID: AtomicU64 = AtomicU64::new(1);

fn next_composer_id() -> u64 {
    NEXT_COMPOSER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Cache key built from segments
#[derive(Debug, Default)]
pub struct CacheKey {
    segments: Vec<KeySegment>,
    object: Option<CacheObject>,
    constant: Option<String>,
    /// Composer id and the text it produced
    actual: OnceLock<(u64, String)>,
}

impl Clone for CacheKey {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            object: self.object.clone(),
            constant: self.constant.clone(),
            actual: OnceLock::new(),
        }
    }
}

impl CacheKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty key owned by a cache object
    pub fn for_object(object: CacheObject) -> Self {
        Self {
            object: Some(object),
            ..Self::default()
        }
    }

    /// Literal key that bypasses composition and prefixes
    pub fn constant(literal: impl Into<String>) -> Self {
        Self {
            constant: Some(literal.into()),
            ..Self::default()
        }
    }

    /// Append a bare name segment
    pub fn add_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_name_value(name, "")
    }

    /// Append a name/value segment
    pub fn add_name_value(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.segments.push(KeySegment {
            name: name.into(),
            value: value.into(),
        });
        self.actual = OnceLock::new();
        self
    }

    /// Builder form of `add_name`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.add_name(name);
        self
    }

    /// Builder form of `add_name_value`
    pub fn with_name_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_name_value(name, value);
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.segments
    }

    pub fn object(&self) -> Option<&CacheObject> {
        self.object.as_ref()
    }

    pub fn is_constant(&self) -> bool {
        self.constant.is_some()
    }

    /// True when the key renders to nothing
    pub fn is_empty(&self) -> bool {
        match &self.constant {
            Some(literal) => literal.trim().is_empty(),
            None => self.segments.is_empty(),
        }
    }

    /// Composed text for the given composer. The memo is filled on first use;
    /// a different composer gets freshly composed text.
    pub fn actual_key(&self, composer: &KeyComposer) -> Cow<'_, str> {
        if let Some(literal) = &self.constant {
            return Cow::Borrowed(literal);
        }
        let (id, text) = self.actual.get_or_init(|| (composer.id, composer.compose(self)));
        if *id == composer.id {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(composer.compose(self))
        }
    }

    /// Fill the memo with `composer` if empty. False when another composer
    /// already owns it.
    pub(crate) fn bind(&self, composer: &KeyComposer) -> bool {
        if self.constant.is_some() {
            return true;
        }
        let (id, _) = self.actual.get_or_init(|| (composer.id, composer.compose(self)));
        *id == composer.id
    }

    /// Composed text; falls back to the default composer when not yet generated
    pub fn to_text(&self) -> String {
        if let Some(literal) = &self.constant {
            return literal.clone();
        }
        match self.actual.get() {
            Some((_, text)) => text.clone(),
            None => KeyComposer::default().compose(self),
        }
    }
}

impl From<&str> for CacheObject {
    fn from(name: &str) -> Self {
        CacheObject::new(name)
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_text() == other.to_text()
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_text().hash(state);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Composes and parses key text using the registered prefixes and split strings
#[derive(Clone)]
pub struct KeyComposer {
    id: u64,
    key_split: String,
    name_value_split: String,
    global_prefix: Option<GlobalPrefixFn>,
    object_prefix: ObjectPrefixFn,
}

impl fmt::Debug for KeyComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyComposer")
            .field("key_split", &self.key_split)
            .field("name_value_split", &self.name_value_split)
            .field("global_prefixes", &self.global_prefixes())
            .finish()
    }
}

impl Default for KeyComposer {
    fn default() -> Self {
        Self {
            id: next_composer_id(),
            key_split: DEFAULT_KEY_SPLIT.to_string(),
            name_value_split: DEFAULT_NAME_VALUE_SPLIT.to_string(),
            global_prefix: None,
            object_prefix: Arc::new(|object: &CacheObject| {
                if object.name.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![object.name.clone()]
                }
            }),
        }
    }
}

impl KeyComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_split(
        mut self,
        key_split: impl Into<String>,
        name_value_split: impl Into<String>,
    ) -> Self {
        self.key_split = key_split.into();
        self.name_value_split = name_value_split.into();
        self.id = next_composer_id();
        self
    }

    pub fn with_global_prefix(mut self, prefix: GlobalPrefixFn) -> Self {
        self.global_prefix = Some(prefix);
        self.id = next_composer_id();
        self
    }

    pub fn with_object_prefix(mut self, prefix: ObjectPrefixFn) -> Self {
        self.object_prefix = prefix;
        self.id = next_composer_id();
        self
    }

    pub fn key_split(&self) -> &str {
        &self.key_split
    }

    pub fn name_value_split(&self) -> &str {
        &self.name_value_split
    }

    /// Current global prefixes
    pub fn global_prefixes(&self) -> Vec<String> {
        self.global_prefix.as_ref().map(|f| f()).unwrap_or_default()
    }

    /// Build the key text. Constant keys return their literal unchanged.
    pub fn compose(&self, key: &CacheKey) -> String {
        if let Some(literal) = &key.constant {
            return literal.clone();
        }
        if key.segments.is_empty() {
            return String::new();
        }

        let mut parts = self.global_prefixes();
        if let Some(object) = &key.object {
            parts.extend((self.object_prefix)(object));
        }
        for segment in &key.segments {
            if segment.value.is_empty() {
                parts.push(segment.name.clone());
            } else {
                parts.push(format!(
                    "{}{}{}",
                    segment.name, self.name_value_split, segment.value
                ));
            }
        }
        parts.retain(|p| !p.is_empty());
        parts.join(&self.key_split)
    }

    /// Turn stored key text back into a key. Parts equal to a registered
    /// global prefix are dropped; the rest become bare names.
    pub fn parse(&self, text: &str) -> CacheKey {
        let mut key = CacheKey::new();
        if text.trim().is_empty() {
            return key;
        }

        let globals = self.global_prefixes();
        for part in text.split(self.key_split.as_str()) {
            if part.is_empty() || globals.iter().any(|g| g == part) {
                continue;
            }
            key.add_name(part);
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer_with_globals(prefixes: &[&str]) -> KeyComposer {
        let owned: Vec<String> = prefixes.iter().map(|p| p.to_string()).collect();
        KeyComposer::default().with_global_prefix(Arc::new(move || owned.clone()))
    }

    #[test]
    fn test_compose_order_and_rendering() {
        let composer = composer_with_globals(&["app", "v1"]);
        let key = CacheKey::for_object(CacheObject::new("users"))
            .with_name("profile")
            .with_name_value("id", "42");

        assert_eq!(key.actual_key(&composer), "app:v1:users:profile:id:42");
    }

    #[test]
    fn test_compose_with_custom_split() {
        let composer = KeyComposer::default().with_split("|", "=");
        let key = CacheKey::new().with_name_value("user", "1").with_name("name");
        assert_eq!(composer.compose(&key), "user=1|name");
    }

    #[test]
    fn test_memo_is_invalidated_by_new_segment() {
        let composer = KeyComposer::default();
        let mut key = CacheKey::new().with_name("user");
        assert_eq!(key.actual_key(&composer), "user");
        assert_eq!(key.actual_key(&composer), "user");

        key.add_name_value("id", "7");
        assert_eq!(key.actual_key(&composer), "user:id:7");
    }

    #[test]
    fn test_memo_belongs_to_first_composer_only() {
        let first = composer_with_globals(&["a"]);
        let second = composer_with_globals(&["b"]);
        let key = CacheKey::new().with_name_value("user", "1");

        assert!(key.bind(&first));
        assert!(!key.bind(&second));
        assert_eq!(key.actual_key(&first), "a:user:1");
        assert_eq!(key.actual_key(&second), "b:user:1");
        assert_eq!(key.to_text(), "a:user:1");

        let copy = key.clone();
        assert!(copy.bind(&second));
        assert_eq!(copy.to_text(), "b:user:1");
    }

    #[test]
    fn test_constant_key_bypasses_prefixes() {
        let composer = composer_with_globals(&["app"]);
        let key = CacheKey::constant("user:1");
        assert_eq!(key.actual_key(&composer), "user:1");
        assert!(key.is_constant());
    }

    #[test]
    fn test_parse_strips_global_prefixes() {
        let composer = composer_with_globals(&["app"]);
        let key = CacheKey::new().with_name("orders").with_name("17");
        let text = composer.compose(&key);
        assert_eq!(text, "app:orders:17");

        let parsed = composer.parse(&text);
        let names: Vec<&str> = parsed.segments().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "17"]);
        assert_eq!(composer.compose(&parsed), text);
    }

    #[test]
    fn test_parse_empty_text_gives_empty_key() {
        let composer = KeyComposer::default();
        assert!(composer.parse("").is_empty());
        assert!(composer.parse("   ").is_empty());
    }

    #[test]
    fn test_equality_uses_text_only() {
        let a = CacheKey::new().with_name_value("user", "1");
        let b = CacheKey::new().with_name("user").with_name("1");
        let c = CacheKey::constant("user:1");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_ne!(a, CacheKey::new().with_name("user"));
    }
}
