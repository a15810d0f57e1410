//! Python 3 `str`.
//!
//! Features:
//! - **Code-point storage**: text is an `Arc<[u32]>`, so unpaired surrogates
//!   produced by `surrogateescape` survive untouched
//! - **Zero-copy cloning**: clones share the buffer, and construction from an
//!   existing `NewStr` returns the very same buffer (see [`NewStr::is`])
//! - **Strict separation**: every argument position that takes text rejects
//!   `NewBytes` with `TypeError`; there is no `decode` method

use super::bytes::NewBytes;
use super::search;
use super::slice::{Slice, normalize_index};
use crate::value::Value;
use pyfuture_core::codec::{self, STRICT, SURROGATE_ESCAPE};
use pyfuture_core::{FutureError, FutureResult, register_surrogateescape};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};
use unicode_ident::{is_xid_continue, is_xid_start};

/// Mapping used by [`NewStr::translate`]: `Some` replaces, `None` deletes.
pub type TranslationTable = FxHashMap<u32, Option<u32>>;

/// Shared buffer for every empty string.
static EMPTY: LazyLock<Arc<[u32]>> = LazyLock::new(|| Arc::from(Vec::new()));

// =============================================================================
// Character Classes
// =============================================================================

/// `str.isspace()` for one code point.
#[inline]
pub(crate) fn is_space(cp: u32) -> bool {
    matches!(cp, 0x1C..=0x1F) || char::from_u32(cp).is_some_and(char::is_whitespace)
}

/// Width of the line boundary starting at `i`.
fn line_break(text: &[u32], i: usize) -> usize {
    match text[i] {
        0x0D if text.get(i + 1) == Some(&0x0A) => 2,
        0x0A | 0x0B | 0x0C | 0x0D | 0x1C | 0x1D | 0x1E | 0x85 | 0x2028 | 0x2029 => 1,
        _ => 0,
    }
}

/// Whether `repr()` shows the character as-is.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        u32::from(c),
        0xAD | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0xFEFF
            | 0xFFF9..=0xFFFB
            | 0xFFFE
            | 0xFFFF
            | 0xE000..=0xF8FF
            | 0xF0000..
    )
}

// =============================================================================
// NewStr
// =============================================================================

/// Python 3 text: an immutable sequence of code points.
#[derive(Clone)]
pub struct NewStr {
    data: Arc<[u32]>,
}

impl NewStr {
    /// The empty string (shared, no allocation).
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: Arc::clone(&EMPTY),
        }
    }

    /// Create from code points, which may include lone surrogates.
    #[inline]
    #[must_use]
    pub fn from_code_points(code_points: impl Into<Arc<[u32]>>) -> Self {
        Self {
            data: code_points.into(),
        }
    }

    /// `str(value)` / `str(value, encoding, errors)`.
    ///
    /// A `NewStr` argument comes back as the same object. Binary data needs
    /// an encoding to be decoded; without one, `NewBytes` falls back to its
    /// `b'...'` form and `LegacyBytes` is ASCII-decoded.
    pub fn from_value(value: &Value, encoding: Option<&str>, errors: Option<&str>) -> FutureResult<Self> {
        if encoding.is_none() && errors.is_none() {
            return match value {
                Value::Str(text) => Ok(text.clone()),
                Value::LegacyBytes(raw) => Self::decode_legacy(raw),
                other => Ok(other.to_str()),
            };
        }

        let encoding = encoding.unwrap_or("utf-8");
        let errors = errors.unwrap_or(STRICT);
        match value {
            Value::Bytes(data) => data.decode(encoding, errors),
            Value::LegacyBytes(raw) => Self::decode_bytes(raw, encoding, errors),
            Value::Str(_) => Err(FutureError::type_error("decoding str is not supported")),
            other => Err(FutureError::type_error(format!(
                "decoding to str: need a bytes-like object, {} found",
                other.type_name()
            ))),
        }
    }

    /// The implicit ASCII conversion applied to legacy host strings.
    pub(crate) fn decode_legacy(raw: &[u8]) -> FutureResult<Self> {
        Self::decode_bytes(raw, "ascii", STRICT)
    }

    pub(crate) fn decode_bytes(raw: &[u8], encoding: &str, errors: &str) -> FutureResult<Self> {
        if errors == SURROGATE_ESCAPE {
            register_surrogateescape();
        }
        codec::decode(raw, encoding, errors).map(Self::from)
    }

    /// Identity: both values share one buffer.
    #[inline]
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Length in code points.
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

    /// The code points.
    #[inline]
    #[must_use]
    pub fn code_points(&self) -> &[u32] {
        &self.data
    }

    /// Whether the text holds unpaired surrogates.
    #[must_use]
    pub fn has_surrogates(&self) -> bool {
        self.data.iter().any(|&cp| char::from_u32(cp).is_none())
    }

    /// Convert to a host string; lone surrogates raise `UnicodeEncodeError`.
    pub fn to_native(&self) -> FutureResult<String> {
        let bytes = codec::encode(&self.data, "utf-8", STRICT)?;
        String::from_utf8(bytes).map_err(|err| FutureError::value_error(err.to_string()))
    }

    // =========================================================================
    // Sequence Protocol
    // =========================================================================

    /// `s[i]`: a one-character string, never a code point.
    pub fn get(&self, index: i64) -> FutureResult<Self> {
        normalize_index(index, self.len())
            .map(|i| Self::from(vec![self.data[i]]))
            .ok_or_else(|| FutureError::index("string index out of range"))
    }

    /// `s[start:stop:step]`.
    pub fn slice(&self, slice: &Slice) -> FutureResult<Self> {
        let indices = slice.indices(self.len())?;
        if indices.len == self.len() && indices.step == 1 {
            return Ok(self.clone());
        }
        Ok(Self::from(indices.select(&self.data)))
    }

    /// `item in s`. Accepts text only; binary data is a `TypeError`.
    pub fn contains(&self, item: &Value) -> FutureResult<bool> {
        let needle = match item {
            Value::Str(text) => text.clone(),
            Value::LegacyBytes(raw) => Self::decode_legacy(raw)?,
            other => {
                return Err(FutureError::type_error(format!(
                    "'in <string>' requires string as left operand, not {}",
                    other.type_name()
                )));
            }
        };
        Ok(search::find_slice(&self.data, &needle.data).is_some())
    }

    /// `s + other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut out = Vec::with_capacity(self.len() + other.len());
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&other.data);
        Self::from(out)
    }

    /// `s * count`; non-positive counts give the empty string.
    pub fn repeat(&self, count: i64) -> FutureResult<Self> {
        if count == 1 {
            return Ok(self.clone());
        }
        search::repeat_slice(&self.data[..], count, "repeated string is too long").map(Self::from)
    }

    /// `s.join(items)`. Binary items raise `TypeError`.
    pub fn join(&self, items: &[Value]) -> FutureResult<Self> {
        let mut out = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let part = match item {
                Value::Str(text) => text.clone(),
                Value::LegacyBytes(raw) => Self::decode_legacy(raw)?,
                other => {
                    return Err(FutureError::type_error(format!(
                        "sequence item {i}: expected str instance, {} found",
                        other.type_name()
                    )));
                }
            };
            if i > 0 {
                out.extend_from_slice(&self.data);
            }
            out.extend_from_slice(&part.data);
        }
        Ok(Self::from(out))
    }

    /// `s.encode(encoding, errors)`.
    pub fn encode(&self, encoding: &str, errors: &str) -> FutureResult<NewBytes> {
        if errors == SURROGATE_ESCAPE {
            register_surrogateescape();
        }
        codec::encode(&self.data, encoding, errors).map(NewBytes::from)
    }

    // =========================================================================
    // Searching
    // =========================================================================

    /// Collect the candidates of a `startswith`/`endswith` argument.
    fn affixes(method: &str, arg: &Value) -> FutureResult<Vec<Self>> {
        let single = |value: &Value| match value {
            Value::Str(text) => Ok(Some(text.clone())),
            Value::LegacyBytes(raw) => Self::decode_legacy(raw).map(Some),
            _ => Ok(None),
        };
        match arg {
            Value::Tuple(items) => items
                .iter()
                .map(|item| {
                    single(item)?.ok_or_else(|| {
                        FutureError::type_error(format!(
                            "tuple for {method} must only contain str, not {}",
                            item.type_name()
                        ))
                    })
                })
                .collect(),
            other => match single(other)? {
                Some(text) => Ok(vec![text]),
                None => Err(FutureError::type_error(format!(
                    "{method} first arg must be str or a tuple of str, not {}",
                    other.type_name()
                ))),
            },
        }
    }

    /// `s.startswith(prefix, start, end)`; `prefix` may be a tuple.
    pub fn startswith(&self, prefix: &Value, start: Option<i64>, end: Option<i64>) -> FutureResult<bool> {
        let candidates = Self::affixes("startswith", prefix)?;
        Ok(candidates
            .iter()
            .any(|p| search::tail_match(&self.data, &p.data, start, end, false)))
    }

    /// `s.endswith(suffix, start, end)`; `suffix` may be a tuple.
    pub fn endswith(&self, suffix: &Value, start: Option<i64>, end: Option<i64>) -> FutureResult<bool> {
        let candidates = Self::affixes("endswith", suffix)?;
        Ok(candidates
            .iter()
            .any(|s| search::tail_match(&self.data, &s.data, start, end, true)))
    }

    /// Lowest index of `sub`, or -1.
    #[must_use]
    pub fn find(&self, sub: &Self, start: Option<i64>, end: Option<i64>) -> i64 {
        search::find(&self.data, &sub.data, start, end).map_or(-1, |i| i as i64)
    }

    /// Highest index of `sub`, or -1.
    #[must_use]
    pub fn rfind(&self, sub: &Self, start: Option<i64>, end: Option<i64>) -> i64 {
        search::rfind(&self.data, &sub.data, start, end).map_or(-1, |i| i as i64)
    }

    /// Like [`find`](Self::find) but raises `ValueError` when absent.
    pub fn index(&self, sub: &Self, start: Option<i64>, end: Option<i64>) -> FutureResult<usize> {
        search::find(&self.data, &sub.data, start, end)
            .ok_or_else(|| FutureError::value_error("substring not found"))
    }

    /// Like [`rfind`](Self::rfind) but raises `ValueError` when absent.
    pub fn rindex(&self, sub: &Self, start: Option<i64>, end: Option<i64>) -> FutureResult<usize> {
        search::rfind(&self.data, &sub.data, start, end)
            .ok_or_else(|| FutureError::value_error("substring not found"))
    }

    /// Non-overlapping occurrences of `sub`.
    #[must_use]
    pub fn count(&self, sub: &Self, start: Option<i64>, end: Option<i64>) -> usize {
        search::count(&self.data, &sub.data, start, end)
    }

    /// Replace up to `count` occurrences (`-1` for all).
    #[must_use]
    pub fn replace(&self, old: &Self, new: &Self, count: i64) -> Self {
        Self::from(search::replace(&self.data, &old.data, &new.data, count))
    }

    // =========================================================================
    // Splitting and Stripping
    // =========================================================================

    fn collect_parts(parts: Vec<&[u32]>) -> Vec<Self> {
        parts.into_iter().map(|part| Self::from(part.to_vec())).collect()
    }

    fn check_separator(sep: &Self) -> FutureResult<()> {
        if sep.is_empty() {
            Err(FutureError::value_error("empty separator"))
        } else {
            Ok(())
        }
    }

    /// `s.split(sep, maxsplit)`; `None` splits on whitespace runs.
    pub fn split(&self, sep: Option<&Self>, maxsplit: i64) -> FutureResult<Vec<Self>> {
        let parts = match sep {
            None => search::split_whitespace(&self.data, is_space, maxsplit),
            Some(sep) => {
                Self::check_separator(sep)?;
                search::split_on(&self.data, &sep.data, maxsplit)
            }
        };
        Ok(Self::collect_parts(parts))
    }

    /// `s.rsplit(sep, maxsplit)`.
    pub fn rsplit(&self, sep: Option<&Self>, maxsplit: i64) -> FutureResult<Vec<Self>> {
        let parts = match sep {
            None => search::rsplit_whitespace(&self.data, is_space, maxsplit),
            Some(sep) => {
                Self::check_separator(sep)?;
                search::rsplit_on(&self.data, &sep.data, maxsplit)
            }
        };
        Ok(Self::collect_parts(parts))
    }

    /// `s.partition(sep)`.
    pub fn partition(&self, sep: &Self) -> FutureResult<(Self, Self, Self)> {
        Self::check_separator(sep)?;
        Ok(match search::find_slice(&self.data, &sep.data) {
            Some(pos) => (
                Self::from(self.data[..pos].to_vec()),
                sep.clone(),
                Self::from(self.data[pos + sep.len()..].to_vec()),
            ),
            None => (self.clone(), Self::empty(), Self::empty()),
        })
    }

    /// `s.rpartition(sep)`.
    pub fn rpartition(&self, sep: &Self) -> FutureResult<(Self, Self, Self)> {
        Self::check_separator(sep)?;
        Ok(match search::rfind_slice(&self.data, &sep.data) {
            Some(pos) => (
                Self::from(self.data[..pos].to_vec()),
                sep.clone(),
                Self::from(self.data[pos + sep.len()..].to_vec()),
            ),
            None => (Self::empty(), Self::empty(), self.clone()),
        })
    }

    /// `s.splitlines(keepends)`, using every Unicode line boundary.
    #[must_use]
    pub fn splitlines(&self, keepends: bool) -> Vec<Self> {
        Self::collect_parts(search::splitlines(&self.data, keepends, line_break))
    }

    fn strip_impl(&self, chars: Option<&Self>, left: bool, right: bool) -> Self {
        let kept = match chars {
            None => search::strip_by(&self.data, is_space, left, right),
            Some(chars) => search::strip_by(&self.data, |cp| chars.data.contains(&cp), left, right),
        };
        if kept.len() == self.len() {
            self.clone()
        } else {
            Self::from(kept.to_vec())
        }
    }

    /// `s.strip(chars)`.
    #[must_use]
    pub fn strip(&self, chars: Option<&Self>) -> Self {
        self.strip_impl(chars, true, true)
    }

    /// `s.lstrip(chars)`.
    #[must_use]
    pub fn lstrip(&self, chars: Option<&Self>) -> Self {
        self.strip_impl(chars, true, false)
    }

    /// `s.rstrip(chars)`.
    #[must_use]
    pub fn rstrip(&self, chars: Option<&Self>) -> Self {
        self.strip_impl(chars, false, true)
    }

    // =========================================================================
    // Case and Classification
    // =========================================================================

    /// `s.lower()`. Surrogates pass through.
    #[must_use]
    pub fn lower(&self) -> Self {
        let mut out = Vec::with_capacity(self.len());
        for &cp in self.data.iter() {
            match char::from_u32(cp) {
                Some(c) => out.extend(c.to_lowercase().map(u32::from)),
                None => out.push(cp),
            }
        }
        Self::from(out)
    }

    /// `s.upper()`. Surrogates pass through.
    #[must_use]
    pub fn upper(&self) -> Self {
        let mut out = Vec::with_capacity(self.len());
        for &cp in self.data.iter() {
            match char::from_u32(cp) {
                Some(c) => out.extend(c.to_uppercase().map(u32::from)),
                None => out.push(cp),
            }
        }
        Self::from(out)
    }

    /// `s.isidentifier()`: `_` or XID_Start, then XID_Continue.
    #[must_use]
    pub fn isidentifier(&self) -> bool {
        let mut chars = self.data.iter().map(|&cp| char::from_u32(cp));
        match chars.next() {
            Some(Some(c)) if c == '_' || is_xid_start(c) => {}
            _ => return false,
        }
        chars.all(|c| c.is_some_and(is_xid_continue))
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// `str.maketrans(from, to, delete)`.
    pub fn maketrans(from: &Self, to: &Self, delete: Option<&Self>) -> FutureResult<TranslationTable> {
        if from.len() != to.len() {
            return Err(FutureError::value_error(
                "the first two maketrans arguments must have equal length",
            ));
        }
        let mut table: TranslationTable = from
            .data
            .iter()
            .zip(to.data.iter())
            .map(|(&f, &t)| (f, Some(t)))
            .collect();
        if let Some(delete) = delete {
            table.extend(delete.data.iter().map(|&cp| (cp, None)));
        }
        Ok(table)
    }

    /// `s.translate(table)`.
    #[must_use]
    pub fn translate(&self, table: &TranslationTable) -> Self {
        let out: Vec<u32> = self
            .data
            .iter()
            .filter_map(|&cp| match table.get(&cp) {
                Some(mapped) => *mapped,
                None => Some(cp),
            })
            .collect();
        Self::from(out)
    }

    /// Python 3 `repr()`: quoted, no `u` prefix.
    #[must_use]
    pub fn repr(&self) -> String {
        let has_single = self.data.contains(&u32::from('\''));
        let has_double = self.data.contains(&u32::from('"'));
        let quote = if has_single && !has_double { '"' } else { '\'' };

        let mut out = String::with_capacity(self.len() + 2);
        out.push(quote);
        for &cp in self.data.iter() {
            match cp {
                0x5C => out.push_str("\\\\"),
                0x09 => out.push_str("\\t"),
                0x0A => out.push_str("\\n"),
                0x0D => out.push_str("\\r"),
                _ if cp == u32::from(quote) => {
                    out.push('\\');
                    out.push(quote);
                }
                _ => match char::from_u32(cp) {
                    Some(c) if is_printable(c) => out.push(c),
                    _ if cp < 0x100 => out.push_str(&format!("\\x{cp:02x}")),
                    _ if cp < 0x10000 => out.push_str(&format!("\\u{cp:04x}")),
                    _ => out.push_str(&format!("\\U{cp:08x}")),
                },
            }
        }
        out.push(quote);
        out
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Default for NewStr {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for NewStr {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            return Self::empty();
        }
        Self::from(s.chars().map(u32::from).collect::<Vec<_>>())
    }
}

impl From<String> for NewStr {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<char> for NewStr {
    fn from(c: char) -> Self {
        Self::from(vec![u32::from(c)])
    }
}

impl From<Vec<u32>> for NewStr {
    fn from(code_points: Vec<u32>) -> Self {
        if code_points.is_empty() {
            return Self::empty();
        }
        Self::from_code_points(code_points)
    }
}

impl PartialEq for NewStr {
    fn eq(&self, other: &Self) -> bool {
        self.is(other) || self.data == other.data
    }
}

impl Eq for NewStr {}

impl PartialEq<str> for NewStr {
    fn eq(&self, other: &str) -> bool {
        self.data.iter().copied().eq(other.chars().map(u32::from))
    }
}

impl PartialEq<&str> for NewStr {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl PartialOrd for NewStr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NewStr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.cmp(&other.data)
    }
}

impl Hash for NewStr {
    /// Surrogate-free text hashes exactly like the equivalent `str`.
    fn hash<H: Hasher>(&self, state: &mut H) {
        if !self.has_surrogates() {
            let native: String = self.data.iter().filter_map(|&cp| char::from_u32(cp)).collect();
            native.as_str().hash(state);
            return;
        }
        // Generalized UTF-8, then the same terminator `str` uses.
        let mut buf = Vec::with_capacity(self.len() * 3);
        for &cp in self.data.iter() {
            match char::from_u32(cp) {
                Some(c) => buf.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes()),
                None => buf.extend_from_slice(&[
                    0xE0 | (cp >> 12) as u8,
                    0x80 | ((cp >> 6) & 0x3F) as u8,
                    0x80 | (cp & 0x3F) as u8,
                ]),
            }
        }
        state.write(&buf);
        state.write_u8(0xff);
    }
}

impl fmt::Display for NewStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &cp in self.data.iter() {
            fmt::Write::write_char(f, char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl fmt::Debug for NewStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NewStr({})", self.repr())
    }
}
