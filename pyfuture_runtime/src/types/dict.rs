//! Python 3 `dict`.
//!
//! An insertion-ordered mapping whose `keys()`, `values()` and `items()`
//! return views over the live dictionary rather than materialized lists.
//!
//! Keys are wrapped in [`HashKey`], which caches a hash that agrees with
//! Python equality across the numeric tower (`1`, `1.0` and `True` are the
//! same key).

use super::int::NewInt;
use crate::ops::comparison::values_equal;
use crate::value::Value;
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive};
use pyfuture_core::{FutureError, FutureResult};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHasher};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Modulus of Python's numeric hash (`2**61 - 1`).
const HASH_MODULUS: u64 = (1 << 61) - 1;

/// Category tags keep text, binary and numeric hashes apart.
const TAG_NONE: u8 = 0;
const TAG_NUMBER: u8 = 1;
const TAG_TEXT: u8 = 2;
const TAG_BINARY: u8 = 3;
const TAG_TUPLE: u8 = 4;
const TAG_RANGE: u8 = 5;
const TAG_SLICE: u8 = 6;

fn int_hash(value: &BigInt) -> u64 {
    let reduced = (value.abs() % HASH_MODULUS).to_u64().unwrap_or_default();
    if value.is_negative() { reduced.wrapping_neg() } else { reduced }
}

fn float_hash(value: f64) -> u64 {
    if value.is_finite() && value.fract() == 0.0 {
        if let Some(int) = BigInt::from_f64(value) {
            return int_hash(&int);
        }
    }
    value.to_bits()
}

/// Hash a value so that `values_equal(a, b)` implies equal hashes.
fn hash_value(value: &Value) -> FutureResult<u64> {
    let mut state = FxHasher::default();
    match value {
        Value::None => TAG_NONE.hash(&mut state),
        Value::Bool(_) | Value::Int(_) => {
            let int = value.as_int().map(NewInt::into_bigint).unwrap_or_default();
            TAG_NUMBER.hash(&mut state);
            int_hash(&int).hash(&mut state);
        }
        Value::Float(f) => {
            TAG_NUMBER.hash(&mut state);
            float_hash(*f).hash(&mut state);
        }
        Value::Complex(c) => {
            TAG_NUMBER.hash(&mut state);
            float_hash(c.re).hash(&mut state);
            if c.im != 0.0 {
                float_hash(c.im).hash(&mut state);
            }
        }
        Value::Str(text) => {
            TAG_TEXT.hash(&mut state);
            text.hash(&mut state);
        }
        Value::Bytes(data) => {
            TAG_BINARY.hash(&mut state);
            data.as_bytes().hash(&mut state);
        }
        Value::LegacyBytes(raw) => {
            TAG_BINARY.hash(&mut state);
            raw[..].hash(&mut state);
        }
        Value::Tuple(items) => {
            TAG_TUPLE.hash(&mut state);
            for item in items {
                hash_value(item)?.hash(&mut state);
            }
        }
        Value::Range(range) => {
            TAG_RANGE.hash(&mut state);
            range.hash(&mut state);
        }
        Value::Slice(slice) => {
            TAG_SLICE.hash(&mut state);
            slice.hash(&mut state);
        }
        Value::List(_) | Value::Dict(_) => {
            return Err(FutureError::type_error(format!(
                "unhashable type: '{}'",
                value.type_name()
            )));
        }
    }
    Ok(state.finish())
}

// =============================================================================
// HashKey
// =============================================================================

/// A hashable [`Value`] with its hash computed once.
#[derive(Clone)]
pub struct HashKey {
    value: Value,
    hash: u64,
}

impl HashKey {
    /// Wrap `value`; lists and dicts raise `TypeError`.
    pub fn new(value: Value) -> FutureResult<Self> {
        let hash = hash_value(&value)?;
        Ok(Self { value, hash })
    }

    /// The wrapped value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Unwrap the value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl PartialEq for HashKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && values_equal(&self.value, &other.value)
    }
}

impl Eq for HashKey {}

impl Hash for HashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value.repr())
    }
}

// =============================================================================
// NewDict
// =============================================================================

type Entries = IndexMap<HashKey, Value, FxBuildHasher>;

/// Python 3 dictionary.
#[derive(Clone, Default)]
pub struct NewDict {
    entries: Entries,
}

impl NewDict {
    /// Create an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs; later duplicates win.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> FutureResult<Self> {
        let mut dict = Self::new();
        for (key, value) in pairs {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `d[key] = value`, returning the previous value.
    pub fn insert(&mut self, key: Value, value: Value) -> FutureResult<Option<Value>> {
        let key = HashKey::new(key)?;
        Ok(self.entries.insert(key, value))
    }

    /// `d.get(key)`.
    pub fn get(&self, key: &Value) -> FutureResult<Option<&Value>> {
        let key = HashKey::new(key.clone())?;
        Ok(self.entries.get(&key))
    }

    /// `d[key]`; a missing key raises `KeyError`.
    pub fn get_item(&self, key: &Value) -> FutureResult<&Value> {
        self.get(key)?
            .ok_or_else(|| FutureError::key(key.repr()))
    }

    /// `d.pop(key)`: remove and return, keeping the order of the rest.
    pub fn remove(&mut self, key: &Value) -> FutureResult<Value> {
        let lookup = HashKey::new(key.clone())?;
        self.entries
            .shift_remove(&lookup)
            .ok_or_else(|| FutureError::key(key.repr()))
    }

    /// `key in d`.
    pub fn contains_key(&self, key: &Value) -> FutureResult<bool> {
        let key = HashKey::new(key.clone())?;
        Ok(self.entries.contains_key(&key))
    }

    /// `d.clear()`.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `d.copy()`: a shallow copy.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// `d.update(other)`.
    pub fn update(&mut self, other: &Self) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k.value(), v))
    }

    /// `d.keys()`.
    #[must_use]
    pub fn keys(&self) -> Keys<'_> {
        Keys { dict: self }
    }

    /// `d.values()`.
    #[must_use]
    pub fn values(&self) -> Values<'_> {
        Values { dict: self }
    }

    /// `d.items()`.
    #[must_use]
    pub fn items(&self) -> Items<'_> {
        Items { dict: self }
    }

    /// Native conversion to a host hash map.
    #[must_use]
    pub fn to_native(&self) -> FxHashMap<HashKey, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// `repr(d)`.
    #[must_use]
    pub fn repr(&self) -> String {
        let parts: Vec<String> = self
            .iter()
            .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

impl PartialEq for NewDict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.entries.get(k).is_some_and(|w| values_equal(v, w)))
    }
}

impl fmt::Debug for NewDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NewDict({})", self.repr())
    }
}

// =============================================================================
// Views
// =============================================================================

/// View returned by [`NewDict::keys`].
#[derive(Debug, Clone, Copy)]
pub struct Keys<'a> {
    dict: &'a NewDict,
}

impl<'a> Keys<'a> {
    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// `key in d.keys()`.
    pub fn contains(&self, key: &Value) -> FutureResult<bool> {
        self.dict.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + use<'a> {
        self.dict.entries.keys().map(HashKey::value)
    }
}

/// View returned by [`NewDict::values`].
#[derive(Debug, Clone, Copy)]
pub struct Values<'a> {
    dict: &'a NewDict,
}

impl<'a> Values<'a> {
    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// `value in d.values()`, by equality scan.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.iter().any(|v| values_equal(v, value))
    }

    /// Values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + use<'a> {
        self.dict.entries.values()
    }
}

/// View returned by [`NewDict::items`].
#[derive(Debug, Clone, Copy)]
pub struct Items<'a> {
    dict: &'a NewDict,
}

impl<'a> Items<'a> {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// `(key, value) in d.items()`.
    pub fn contains(&self, key: &Value, value: &Value) -> FutureResult<bool> {
        Ok(self.dict.get(key)?.is_some_and(|v| values_equal(v, value)))
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Value, &'a Value)> + use<'a> {
        self.dict.entries.iter().map(|(k, v)| (k.value(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewBytes, NewList, NewStr};

    fn dict(pairs: &[(&str, i64)]) -> NewDict {
        NewDict::from_pairs(pairs.iter().map(|&(k, v)| (Value::from(k), Value::from(v)))).unwrap()
    }

    #[test]
    fn test_insertion_order() {
        let d = dict(&[("b", 1), ("a", 2), ("c", 3)]);
        let keys: Vec<String> = d.keys().iter().map(|k| k.to_str().to_string()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_numeric_keys_unify() {
        let mut d = NewDict::new();
        d.insert(Value::from(1), Value::from("int")).unwrap();
        d.insert(Value::from(1.0), Value::from("float")).unwrap();
        d.insert(Value::from(true), Value::from("bool")).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.get_item(&Value::from(1)).unwrap(), &Value::from("bool"));
        let big = NewInt::from(1i128 << 70);
        d.insert(Value::Int(big.clone()), Value::None).unwrap();
        assert!(d.contains_key(&Value::from((1i128 << 70) as f64)).unwrap());
    }

    #[test]
    fn test_text_and_binary_keys_are_distinct() {
        let mut d = NewDict::new();
        d.insert(Value::Str(NewStr::from("k")), Value::from(1)).unwrap();
        d.insert(Value::Bytes(NewBytes::from(&b"k"[..])), Value::from(2)).unwrap();
        assert_eq!(d.len(), 2);
        assert!(d.contains_key(&Value::legacy(b"k")).unwrap());
    }

    #[test]
    fn test_unhashable_key() {
        let mut d = NewDict::new();
        let err = d.insert(Value::List(NewList::new()), Value::None).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: unhashable type: 'list'");
        let tuple = Value::Tuple(vec![Value::from(1), Value::List(NewList::new())]);
        assert!(d.contains_key(&tuple).unwrap_err().is_type_error());
    }

    #[test]
    fn test_missing_key() {
        let mut d = dict(&[("a", 1)]);
        let err = d.get_item(&Value::from("z")).unwrap_err();
        assert_eq!(err.to_string(), "KeyError: 'z'");
        assert_eq!(d.remove(&Value::from("a")).unwrap(), Value::from(1));
        assert!(d.remove(&Value::from("a")).is_err());
    }

    #[test]
    fn test_views_track_changes() {
        let mut d = dict(&[("a", 1)]);
        assert_eq!(d.keys().len(), 1);
        d.insert(Value::from("b"), Value::from(2)).unwrap();
        let items = d.items();
        assert_eq!(items.len(), 2);
        assert!(items.contains(&Value::from("b"), &Value::from(2)).unwrap());
        assert!(!items.contains(&Value::from("b"), &Value::from(3)).unwrap());
        assert!(d.values().contains(&Value::from(2.0)));
        assert!(d.keys().contains(&Value::from("a")).unwrap());
    }

    #[test]
    fn test_copy_update_clear() {
        let mut d = dict(&[("a", 1)]);
        let snapshot = d.copy();
        d.update(&dict(&[("a", 5), ("b", 2)]));
        assert_eq!(d, dict(&[("b", 2), ("a", 5)]));
        assert_eq!(snapshot.len(), 1);
        d.clear();
        assert!(d.is_empty());
    }

    #[test]
    fn test_to_native_and_repr() {
        let d = dict(&[("a", 1), ("b", 2)]);
        let native = d.to_native();
        assert_eq!(native.len(), 2);
        assert_eq!(d.repr(), "{'a': 1, 'b': 2}");
    }
}
