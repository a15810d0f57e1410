//! Python 3 `bytes`.
//!
//! Immutable byte sequence, integer indexed. Construction from text needs an
//! explicit encoding, and every argument position that takes binary data
//! rejects text with `TypeError`. There is no `encode` method.

use super::search;
use super::slice::{Slice, normalize_index};
use super::string::NewStr;
use crate::ops::containers;
use crate::value::Value;
use pyfuture_core::codec::STRICT;
use pyfuture_core::{FutureError, FutureResult};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

/// Shared buffer for every empty bytes object.
static EMPTY: LazyLock<Arc<[u8]>> = LazyLock::new(|| Arc::from(Vec::new()));

/// ASCII whitespace as `bytes.split()` and `bytes.strip()` see it.
#[inline]
fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

fn line_break(data: &[u8], i: usize) -> usize {
    match data[i] {
        b'\r' if data.get(i + 1) == Some(&b'\n') => 2,
        b'\r' | b'\n' => 1,
        _ => 0,
    }
}

fn hex_digit(cp: u32) -> Option<u8> {
    char::from_u32(cp)?.to_digit(16).map(|d| d as u8)
}

/// Convert an integer-like value to a byte, as `bytes` element checks do.
pub(crate) fn ordinal(value: &Value, message: &str) -> FutureResult<u8> {
    let int = value.as_int().ok_or_else(|| {
        FutureError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })?;
    int.to_i64()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| FutureError::value_error(message))
}

/// Python 3 binary data.
#[derive(Clone)]
pub struct NewBytes {
    data: Arc<[u8]>,
}

impl NewBytes {
    /// The empty bytes object (shared, no allocation).
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: Arc::clone(&EMPTY),
        }
    }

    /// `bytes(value)` / `bytes(text, encoding, errors)`.
    pub fn from_value(value: &Value, encoding: Option<&str>, errors: Option<&str>) -> FutureResult<Self> {
        if let Value::Str(text) = value {
            let Some(encoding) = encoding else {
                return Err(FutureError::type_error("string argument without an encoding"));
            };
            return text.encode(encoding, errors.unwrap_or(STRICT));
        }
        if encoding.is_some() {
            return Err(FutureError::type_error("encoding without a string argument"));
        }
        if errors.is_some() {
            return Err(FutureError::type_error("errors without a string argument"));
        }

        match value {
            Value::Bytes(data) => Ok(data.clone()),
            Value::LegacyBytes(raw) => Ok(Self::from(&raw[..])),
            Value::Int(_) | Value::Bool(_) => {
                let count = value
                    .as_int()
                    .map(|n| n.to_index())
                    .transpose()?
                    .unwrap_or_default();
                let count = usize::try_from(count)
                    .map_err(|_| FutureError::value_error("negative count"))?;
                Ok(Self::from(vec![0u8; count]))
            }
            Value::List(_) | Value::Tuple(_) | Value::Range(_) => {
                let items = containers::iterate(value)?;
                let packed = items
                    .iter()
                    .map(|item| ordinal(item, "bytes must be in range(0, 256)"))
                    .collect::<FutureResult<Vec<u8>>>()?;
                Ok(Self::from(packed))
            }
            other => Err(FutureError::type_error(format!(
                "cannot convert '{}' object to bytes",
                other.type_name()
            ))),
        }
    }

    /// `bytes.fromhex(text)`: hex pairs, optionally separated by whitespace.
    pub fn fromhex(text: &NewStr) -> FutureResult<Self> {
        let digits = text.code_points();
        let bad = |pos: usize| {
            FutureError::value_error(format!(
                "non-hexadecimal number found in fromhex() arg at position {pos}"
            ))
        };

        let mut out = Vec::with_capacity(digits.len() / 2);
        let mut i = 0;
        while i < digits.len() {
            if digits[i] < 0x80 && is_space(digits[i] as u8) {
                i += 1;
                continue;
            }
            let high = hex_digit(digits[i]).ok_or_else(|| bad(i))?;
            let low = digits
                .get(i + 1)
                .and_then(|&cp| hex_digit(cp))
                .ok_or_else(|| bad(i + 1))?;
            out.push(high << 4 | low);
            i += 2;
        }
        Ok(Self::from(out))
    }

    /// Lowercase hex rendering, the inverse of [`fromhex`](Self::fromhex).
    #[must_use]
    pub fn hex(&self) -> String {
        use std::fmt::Write;
        let mut out = String::with_capacity(self.len() * 2);
        for byte in self.data.iter() {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// Identity: both values share one buffer.
    #[inline]
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    // =========================================================================
    // Sequence Protocol
    // =========================================================================

    /// `b[i]`: an integer, never a length-1 bytes object.
    pub fn get(&self, index: i64) -> FutureResult<u8> {
        normalize_index(index, self.len())
            .map(|i| self.data[i])
            .ok_or_else(|| FutureError::index("index out of range"))
    }

    /// `b[start:stop:step]`.
    pub fn slice(&self, slice: &Slice) -> FutureResult<Self> {
        let indices = slice.indices(self.len())?;
        if indices.len == self.len() && indices.step == 1 {
            return Ok(self.clone());
        }
        Ok(Self::from(indices.select(&self.data)))
    }

    /// `item in b`: an ordinal or a binary subsequence.
    pub fn contains(&self, item: &Value) -> FutureResult<bool> {
        match item {
            Value::Int(_) | Value::Bool(_) => {
                let byte = ordinal(item, "byte must be in range(0, 256)")?;
                Ok(self.data.contains(&byte))
            }
            Value::Bytes(needle) => Ok(search::find_slice(&self.data, &needle.data).is_some()),
            Value::LegacyBytes(raw) => Ok(search::find_slice(&self.data, raw).is_some()),
            other => Err(FutureError::type_error(format!(
                "a bytes-like object is required, not '{}'",
                other.type_name()
            ))),
        }
    }

    /// `b + other`.
    #[must_use]
    pub fn concat(&self, other: &[u8]) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.len() + other.len());
        out.extend_from_slice(&self.data);
        out.extend_from_slice(other);
        Self::from(out)
    }

    /// `b * count`; non-positive counts give empty bytes.
    pub fn repeat(&self, count: i64) -> FutureResult<Self> {
        if count == 1 {
            return Ok(self.clone());
        }
        search::repeat_slice(&self.data[..], count, "repeated bytes are too long").map(Self::from)
    }

    /// `b.join(items)`. Text items raise `TypeError`.
    pub fn join(&self, items: &[Value]) -> FutureResult<Self> {
        let mut out = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let part: &[u8] = match item {
                Value::Bytes(data) => &data.data,
                Value::LegacyBytes(raw) => raw,
                other => {
                    return Err(FutureError::type_error(format!(
                        "sequence item {i}: expected a bytes-like object, {} found",
                        other.type_name()
                    )));
                }
            };
            if i > 0 {
                out.extend_from_slice(&self.data);
            }
            out.extend_from_slice(part);
        }
        Ok(Self::from(out))
    }

    /// `b.decode(encoding, errors)`.
    pub fn decode(&self, encoding: &str, errors: &str) -> FutureResult<NewStr> {
        NewStr::decode_bytes(&self.data, encoding, errors)
    }

    // =========================================================================
    // Searching
    // =========================================================================

    fn affixes(method: &str, arg: &Value) -> FutureResult<Vec<Vec<u8>>> {
        let single = |value: &Value| match value {
            Value::Bytes(data) => Some(data.data.to_vec()),
            Value::LegacyBytes(raw) => Some(raw.to_vec()),
            _ => None,
        };
        match arg {
            Value::Tuple(items) => items
                .iter()
                .map(|item| {
                    single(item).ok_or_else(|| {
                        FutureError::type_error(format!(
                            "a bytes-like object is required, not '{}'",
                            item.type_name()
                        ))
                    })
                })
                .collect(),
            other => single(other).map(|affix| vec![affix]).ok_or_else(|| {
                FutureError::type_error(format!(
                    "{method} first arg must be bytes or a tuple of bytes, not {}",
                    other.type_name()
                ))
            }),
        }
    }

    /// `b.startswith(prefix, start, end)`; `prefix` may be a tuple.
    pub fn startswith(&self, prefix: &Value, start: Option<i64>, end: Option<i64>) -> FutureResult<bool> {
        let candidates = Self::affixes("startswith", prefix)?;
        Ok(candidates
            .iter()
            .any(|p| search::tail_match(&self.data, p, start, end, false)))
    }

    /// `b.endswith(suffix, start, end)`; `suffix` may be a tuple.
    pub fn endswith(&self, suffix: &Value, start: Option<i64>, end: Option<i64>) -> FutureResult<bool> {
        let candidates = Self::affixes("endswith", suffix)?;
        Ok(candidates
            .iter()
            .any(|s| search::tail_match(&self.data, s, start, end, true)))
    }

    /// Lowest index of `sub`, or -1.
    #[must_use]
    pub fn find(&self, sub: &[u8], start: Option<i64>, end: Option<i64>) -> i64 {
        search::find(&self.data, sub, start, end).map_or(-1, |i| i as i64)
    }

    /// Highest index of `sub`, or -1.
    #[must_use]
    pub fn rfind(&self, sub: &[u8], start: Option<i64>, end: Option<i64>) -> i64 {
        search::rfind(&self.data, sub, start, end).map_or(-1, |i| i as i64)
    }

    /// Like [`find`](Self::find) but raises `ValueError` when absent.
    pub fn index(&self, sub: &[u8], start: Option<i64>, end: Option<i64>) -> FutureResult<usize> {
        search::find(&self.data, sub, start, end)
            .ok_or_else(|| FutureError::value_error("subsection not found"))
    }

    /// Like [`rfind`](Self::rfind) but raises `ValueError` when absent.
    pub fn rindex(&self, sub: &[u8], start: Option<i64>, end: Option<i64>) -> FutureResult<usize> {
        search::rfind(&self.data, sub, start, end)
            .ok_or_else(|| FutureError::value_error("subsection not found"))
    }

    /// Non-overlapping occurrences of `sub`.
    #[must_use]
    pub fn count(&self, sub: &[u8], start: Option<i64>, end: Option<i64>) -> usize {
        search::count(&self.data, sub, start, end)
    }

    /// Replace up to `count` occurrences (`-1` for all).
    #[must_use]
    pub fn replace(&self, old: &[u8], new: &[u8], count: i64) -> Self {
        Self::from(search::replace(&self.data, old, new, count))
    }

    // =========================================================================
    // Splitting and Stripping
    // =========================================================================

    fn collect_parts(parts: Vec<&[u8]>) -> Vec<Self> {
        parts.into_iter().map(Self::from).collect()
    }

    fn check_separator(sep: &[u8]) -> FutureResult<()> {
        if sep.is_empty() {
            Err(FutureError::value_error("empty separator"))
        } else {
            Ok(())
        }
    }

    /// `b.split(sep, maxsplit)`; `None` splits on ASCII whitespace runs.
    pub fn split(&self, sep: Option<&[u8]>, maxsplit: i64) -> FutureResult<Vec<Self>> {
        let parts = match sep {
            None => search::split_whitespace(&self.data, is_space, maxsplit),
            Some(sep) => {
                Self::check_separator(sep)?;
                search::split_on(&self.data, sep, maxsplit)
            }
        };
        Ok(Self::collect_parts(parts))
    }

    /// `b.rsplit(sep, maxsplit)`.
    pub fn rsplit(&self, sep: Option<&[u8]>, maxsplit: i64) -> FutureResult<Vec<Self>> {
        let parts = match sep {
            None => search::rsplit_whitespace(&self.data, is_space, maxsplit),
            Some(sep) => {
                Self::check_separator(sep)?;
                search::rsplit_on(&self.data, sep, maxsplit)
            }
        };
        Ok(Self::collect_parts(parts))
    }

    /// `b.partition(sep)`.
    pub fn partition(&self, sep: &[u8]) -> FutureResult<(Self, Self, Self)> {
        Self::check_separator(sep)?;
        Ok(match search::find_slice(&self.data, sep) {
            Some(pos) => (
                Self::from(&self.data[..pos]),
                Self::from(sep),
                Self::from(&self.data[pos + sep.len()..]),
            ),
            None => (self.clone(), Self::empty(), Self::empty()),
        })
    }

    /// `b.rpartition(sep)`.
    pub fn rpartition(&self, sep: &[u8]) -> FutureResult<(Self, Self, Self)> {
        Self::check_separator(sep)?;
        Ok(match search::rfind_slice(&self.data, sep) {
            Some(pos) => (
                Self::from(&self.data[..pos]),
                Self::from(sep),
                Self::from(&self.data[pos + sep.len()..]),
            ),
            None => (Self::empty(), Self::empty(), self.clone()),
        })
    }

    /// `b.splitlines(keepends)`; only `\n`, `\r` and `\r\n` break lines.
    #[must_use]
    pub fn splitlines(&self, keepends: bool) -> Vec<Self> {
        Self::collect_parts(search::splitlines(&self.data, keepends, line_break))
    }

    fn strip_impl(&self, chars: Option<&[u8]>, left: bool, right: bool) -> Self {
        let kept = match chars {
            None => search::strip_by(&self.data, is_space, left, right),
            Some(chars) => search::strip_by(&self.data, |b| chars.contains(&b), left, right),
        };
        if kept.len() == self.len() {
            self.clone()
        } else {
            Self::from(kept)
        }
    }

    /// `b.strip(chars)`.
    #[must_use]
    pub fn strip(&self, chars: Option<&[u8]>) -> Self {
        self.strip_impl(chars, true, true)
    }

    /// `b.lstrip(chars)`.
    #[must_use]
    pub fn lstrip(&self, chars: Option<&[u8]>) -> Self {
        self.strip_impl(chars, true, false)
    }

    /// `b.rstrip(chars)`.
    #[must_use]
    pub fn rstrip(&self, chars: Option<&[u8]>) -> Self {
        self.strip_impl(chars, false, true)
    }

    /// `b.lower()` (ASCII only).
    #[must_use]
    pub fn lower(&self) -> Self {
        Self::from(self.data.to_ascii_lowercase())
    }

    /// `b.upper()` (ASCII only).
    #[must_use]
    pub fn upper(&self) -> Self {
        Self::from(self.data.to_ascii_uppercase())
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// `bytes.maketrans(from, to)`: a 256-byte table.
    pub fn maketrans(from: &[u8], to: &[u8]) -> FutureResult<Self> {
        if from.len() != to.len() {
            return Err(FutureError::value_error("maketrans arguments must have same length"));
        }
        let mut table: Vec<u8> = (0..=255).collect();
        for (&f, &t) in from.iter().zip(to) {
            table[usize::from(f)] = t;
        }
        Ok(Self::from(table))
    }

    /// `b.translate(table, delete)`; `None` leaves bytes unmapped.
    pub fn translate(&self, table: Option<&[u8]>, delete: &[u8]) -> FutureResult<Self> {
        if let Some(table) = table
            && table.len() != 256
        {
            return Err(FutureError::value_error(
                "translation table must be 256 characters long",
            ));
        }
        let out: Vec<u8> = self
            .data
            .iter()
            .filter(|b| !delete.contains(b))
            .map(|&b| table.map_or(b, |t| t[usize::from(b)]))
            .collect();
        Ok(Self::from(out))
    }

    /// `b'...'` form, also used for `str()`.
    #[must_use]
    pub fn repr(&self) -> String {
        bytes_repr(&self.data)
    }
}

/// Render bytes as a Python 3 `b'...'` literal.
pub(crate) fn bytes_repr(data: &[u8]) -> String {
    let quote = if data.contains(&b'\'') && !data.contains(&b'"') { '"' } else { '\'' };
    let mut out = String::with_capacity(data.len() + 3);
    out.push('b');
    out.push(quote);
    for &byte in data {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            _ if char::from(byte) == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7E => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out.push(quote);
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Default for NewBytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<u8>> for NewBytes {
    fn from(data: Vec<u8>) -> Self {
        if data.is_empty() {
            return Self::empty();
        }
        Self { data: data.into() }
    }
}

impl From<&[u8]> for NewBytes {
    fn from(data: &[u8]) -> Self {
        Self::from(data.to_vec())
    }
}

impl AsRef<[u8]> for NewBytes {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl PartialEq for NewBytes {
    fn eq(&self, other: &Self) -> bool {
        self.is(other) || self.data == other.data
    }
}

impl Eq for NewBytes {}

impl PartialEq<[u8]> for NewBytes {
    fn eq(&self, other: &[u8]) -> bool {
        *self.data == *other
    }
}

impl PartialOrd for NewBytes {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NewBytes {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.cmp(&other.data)
    }
}

impl Hash for NewBytes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data[..].hash(state);
    }
}

impl fmt::Display for NewBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl fmt::Debug for NewBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NewBytes({})", self.repr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewList, NewRange};
    use pyfuture_core::codec::SURROGATE_ESCAPE;

    fn b(data: &[u8]) -> NewBytes {
        NewBytes::from(data)
    }

    fn list(items: &[i64]) -> Value {
        Value::List(NewList::from(items.iter().map(|&i| Value::from(i)).collect::<Vec<_>>()))
    }

    #[test]
    fn test_index_returns_int() {
        let data = b(b"ABCD");
        assert_eq!(data.get(0).unwrap(), 65);
        assert_eq!(data.get(-1).unwrap(), 68);
        assert_eq!(data.get(4).unwrap_err().exception_type(), "IndexError");
    }

    #[test]
    fn test_repeat() {
        assert_eq!(b(b"ab").repeat(2).unwrap(), b(b"abab"));
        assert!(b(b"ab").repeat(0).unwrap().is_empty());
        let err = b(b"ab").repeat(i64::MAX).unwrap_err();
        assert_eq!(err.to_string(), "OverflowError: repeated bytes are too long");
    }

    #[test]
    fn test_slice_returns_bytes() {
        let data = b(b"ABCD");
        assert_eq!(data.slice(&Slice::range(1, 3)).unwrap(), b(b"BC"));
    }

    #[test]
    fn test_from_value_text_requires_encoding() {
        let text = Value::Str(NewStr::from("abc"));
        let err = NewBytes::from_value(&text, None, None).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: string argument without an encoding");

        let encoded = NewBytes::from_value(&text, Some("ascii"), None).unwrap();
        assert_eq!(encoded, b(b"abc"));
    }

    #[test]
    fn test_from_value_identity_and_copy() {
        let original = b(b"xyz");
        let same = NewBytes::from_value(&Value::Bytes(original.clone()), None, None).unwrap();
        assert!(same.is(&original));

        let copied = NewBytes::from_value(&Value::legacy(b"xyz"), None, None).unwrap();
        assert_eq!(copied, original);
    }

    #[test]
    fn test_from_value_iterables() {
        assert_eq!(NewBytes::from_value(&list(&[0xbb, 0x0f]), None, None).unwrap(), b(&[0xbb, 0x0f]));

        let range = Value::Range(NewRange::from_stop(3));
        assert_eq!(NewBytes::from_value(&range, None, None).unwrap(), b(&[0, 1, 2]));

        let err = NewBytes::from_value(&list(&[1, 256]), None, None).unwrap_err();
        assert_eq!(err.to_string(), "ValueError: bytes must be in range(0, 256)");

        let mixed = Value::List(NewList::from(vec![Value::from(1), Value::from("x")]));
        assert!(NewBytes::from_value(&mixed, None, None).unwrap_err().is_type_error());
    }

    #[test]
    fn test_from_value_count() {
        assert_eq!(NewBytes::from_value(&Value::from(3), None, None).unwrap(), b(&[0, 0, 0]));
        let err = NewBytes::from_value(&Value::from(-1), None, None).unwrap_err();
        assert_eq!(err.to_string(), "ValueError: negative count");
    }

    #[test]
    fn test_from_value_rejects_other_types() {
        let err = NewBytes::from_value(&Value::from(1.5), None, None).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: cannot convert 'float' object to bytes");

        let err = NewBytes::from_value(&Value::from(3), Some("utf-8"), None).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: encoding without a string argument");
    }

    #[test]
    fn test_fromhex() {
        let parsed = NewBytes::fromhex(&NewStr::from("bb 0f")).unwrap();
        assert_eq!(parsed, b(&[0xbb, 0x0f]));
        assert_eq!(parsed.hex(), "bb0f");

        let err = NewBytes::fromhex(&NewStr::from("bb0")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ValueError: non-hexadecimal number found in fromhex() arg at position 3"
        );
        let err = NewBytes::fromhex(&NewStr::from("zz")).unwrap_err();
        assert!(err.to_string().ends_with("position 0"));
    }

    #[test]
    fn test_contains() {
        let data = b(b"hello");
        assert!(data.contains(&Value::from(104)).unwrap());
        assert!(data.contains(&Value::Bytes(b(b"ell"))).unwrap());
        assert!(data.contains(&Value::legacy(b"lo")).unwrap());
        assert!(data.contains(&Value::from(300)).unwrap_err().is_value_error());

        let err = data.contains(&Value::from("h")).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: a bytes-like object is required, not 'str'");
    }

    #[test]
    fn test_join_rejects_text() {
        let sep = b(b"-");
        let joined = sep
            .join(&[Value::Bytes(b(b"a")), Value::legacy(b"b")])
            .unwrap();
        assert_eq!(joined, b(b"a-b"));

        let err = sep.join(&[Value::from("a")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: sequence item 0: expected a bytes-like object, str found"
        );
    }

    #[test]
    fn test_startswith_rejects_text() {
        let data = b(b"header");
        assert!(data.startswith(&Value::Bytes(b(b"he")), None, None).unwrap());
        let tuple = Value::Tuple(vec![Value::Bytes(b(b"x")), Value::from("he")]);
        assert!(data.startswith(&tuple, None, None).unwrap_err().is_type_error());
        assert!(data.endswith(&Value::from("er"), None, None).unwrap_err().is_type_error());
    }

    #[test]
    fn test_decode_surrogateescape() {
        let data = b(b"caf\xe9");
        let text = data.decode("utf-8", SURROGATE_ESCAPE).unwrap();
        assert_eq!(text.code_points()[3], 0xDCE9);
        assert_eq!(text.encode("utf-8", SURROGATE_ESCAPE).unwrap(), data);
    }

    #[test]
    fn test_split_and_partition() {
        let data = b(b" a b  c ");
        assert_eq!(data.split(None, -1).unwrap(), vec![b(b"a"), b(b"b"), b(b"c")]);
        assert_eq!(b(b"k=v").partition(b"=").unwrap(), (b(b"k"), b(b"="), b(b"v")));
        assert!(b(b"abc").rsplit(Some(b""), -1).unwrap_err().is_value_error());
    }

    #[test]
    fn test_strip_and_case() {
        assert_eq!(b(b"  x\r\n").strip(None), b(b"x"));
        assert_eq!(b(b"xxhi").lstrip(Some(b"x")), b(b"hi"));
        assert_eq!(b(b"Hi\xc3").upper(), b(b"HI\xc3"));
        assert_eq!(b(b"a\nb\r\nc").splitlines(false).len(), 3);
    }

    #[test]
    fn test_translate() {
        let table = NewBytes::maketrans(b"ab", b"xy").unwrap();
        assert_eq!(table.len(), 256);
        let out = b(b"abcabc").translate(Some(table.as_bytes()), b"c").unwrap();
        assert_eq!(out, b(b"xyxy"));
        assert_eq!(b(b"abc").translate(None, b"b").unwrap(), b(b"ac"));
        assert!(b(b"a").translate(Some(b"short"), b"").unwrap_err().is_value_error());
        assert!(NewBytes::maketrans(b"ab", b"x").unwrap_err().is_value_error());
    }

    #[test]
    fn test_repr() {
        assert_eq!(b(b"abc").repr(), "b'abc'");
        assert_eq!(b(b"it's").repr(), "b\"it's\"");
        assert_eq!(b(b"\x00\xff\n").repr(), "b'\\x00\\xff\\n'");
        assert_eq!(b(b"x").to_string(), "b'x'");
    }

    #[test]
    fn test_replace_and_count() {
        assert_eq!(b(b"aXbXc").replace(b"X", b"--", 1), b(b"a--bXc"));
        assert_eq!(b(b"aXbXc").count(b"X", None, None), 2);
        assert_eq!(b(b"aXbXc").rindex(b"X", None, None).unwrap(), 3);
    }
}
