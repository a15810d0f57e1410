//! The closed set of values the coercion layer operates on.
//!
//! Exact-type checks are a match on the [`Value`] discriminant; the
//! "behaves like text/binary" questions asked across the crate go through
//! [`TypeFlags`] so the legacy host type can answer differently from the
//! Python 3 types.

use crate::ops::comparison::values_equal;
use crate::types::bytes::bytes_repr;
use crate::types::{NewBytes, NewDict, NewInt, NewList, NewRange, NewStr, Slice};
use num_complex::Complex64;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Type Flags
// =============================================================================

bitflags::bitflags! {
    /// Flags describing value capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeFlags: u16 {
        /// Value is Python 3 text.
        const TEXT = 1 << 0;
        /// Value holds raw bytes.
        const BINARY = 1 << 1;
        /// Value is the host's conflated byte/text type.
        const LEGACY = 1 << 2;
        /// Value supports the number protocol.
        const NUMBER = 1 << 3;
        /// Value can be used as an index (`__index__`).
        const INDEX = 1 << 4;
        /// Value supports the sequence protocol.
        const SEQUENCE = 1 << 5;
        /// Value supports the mapping protocol.
        const MAPPING = 1 << 6;
        /// Value can change after construction.
        const MUTABLE = 1 << 7;
        /// Value can be used as a dictionary key.
        const HASHABLE = 1 << 8;
    }
}

// =============================================================================
// Value
// =============================================================================

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// `None`.
    None,
    /// `True` / `False`.
    Bool(bool),
    /// Arbitrary-precision integer.
    Int(NewInt),
    /// IEEE double.
    Float(f64),
    /// Complex number.
    Complex(Complex64),
    /// Python 3 text.
    Str(NewStr),
    /// Python 3 binary data.
    Bytes(NewBytes),
    /// The host's native string: binary data that is also accepted as
    /// ASCII text wherever compatibility requires it.
    LegacyBytes(Arc<[u8]>),
    /// Mutable list.
    List(NewList),
    /// Immutable tuple.
    Tuple(Vec<Value>),
    /// Lazy integer range.
    Range(NewRange),
    /// Insertion-ordered mapping.
    Dict(NewDict),
    /// Slice object.
    Slice(Slice),
}

impl Value {
    /// Wrap host bytes as a legacy string.
    #[inline]
    #[must_use]
    pub fn legacy(raw: &[u8]) -> Self {
        Self::LegacyBytes(Arc::from(raw))
    }

    /// Python type name, as shown in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Str(_) => "str",
            Self::Bytes(_) | Self::LegacyBytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Range(_) => "range",
            Self::Dict(_) => "dict",
            Self::Slice(_) => "slice",
        }
    }

    /// Capability flags for this value.
    #[must_use]
    pub const fn flags(&self) -> TypeFlags {
        match self {
            Self::None | Self::Slice(_) => TypeFlags::HASHABLE,
            Self::Bool(_) | Self::Int(_) => TypeFlags::NUMBER
                .union(TypeFlags::INDEX)
                .union(TypeFlags::HASHABLE),
            Self::Float(_) | Self::Complex(_) => TypeFlags::NUMBER.union(TypeFlags::HASHABLE),
            Self::Str(_) => TypeFlags::TEXT
                .union(TypeFlags::SEQUENCE)
                .union(TypeFlags::HASHABLE),
            Self::Bytes(_) => TypeFlags::BINARY
                .union(TypeFlags::SEQUENCE)
                .union(TypeFlags::HASHABLE),
            Self::LegacyBytes(_) => TypeFlags::BINARY
                .union(TypeFlags::LEGACY)
                .union(TypeFlags::SEQUENCE)
                .union(TypeFlags::HASHABLE),
            Self::List(_) => TypeFlags::SEQUENCE.union(TypeFlags::MUTABLE),
            Self::Tuple(_) | Self::Range(_) => TypeFlags::SEQUENCE.union(TypeFlags::HASHABLE),
            Self::Dict(_) => TypeFlags::MAPPING.union(TypeFlags::MUTABLE),
        }
    }

    /// Raw bytes, Python 3 or legacy.
    #[inline]
    #[must_use]
    pub fn is_binary_like(&self) -> bool {
        self.flags().contains(TypeFlags::BINARY)
    }

    /// Accepted where text is expected: Python 3 text or a legacy string.
    #[inline]
    #[must_use]
    pub fn is_text_like(&self) -> bool {
        self.flags().intersects(TypeFlags::TEXT.union(TypeFlags::LEGACY))
    }

    /// The host's legacy string.
    #[inline]
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.flags().contains(TypeFlags::LEGACY)
    }

    /// Integer value of an `int` or `bool`.
    #[must_use]
    pub fn as_int(&self) -> Option<NewInt> {
        match self {
            Self::Bool(b) => Some(NewInt::from(*b)),
            Self::Int(n) => Some(n.clone()),
            _ => None,
        }
    }

    /// `str(value)`.
    #[must_use]
    pub fn to_str(&self) -> NewStr {
        match self {
            Self::Str(text) => text.clone(),
            Self::LegacyBytes(raw) => {
                NewStr::decode_legacy(raw).unwrap_or_else(|_| NewStr::from(bytes_repr(raw)))
            }
            other => NewStr::from(other.repr()),
        }
    }

    /// `repr(value)`.
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::None => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => float_repr(*f),
            Self::Complex(c) => complex_repr(*c),
            Self::Str(text) => text.repr(),
            Self::Bytes(data) => data.repr(),
            Self::LegacyBytes(raw) => bytes_repr(raw),
            Self::List(list) => list.repr(),
            Self::Tuple(items) => match items.as_slice() {
                [single] => format!("({},)", single.repr()),
                _ => {
                    let parts: Vec<String> = items.iter().map(Self::repr).collect();
                    format!("({})", parts.join(", "))
                }
            },
            Self::Range(range) => range.repr(),
            Self::Dict(dict) => dict.repr(),
            Self::Slice(slice) => slice.to_string(),
        }
    }
}

// =============================================================================
// Float Formatting
// =============================================================================

/// Shortest round-trip digits in Python's layout: fixed notation for
/// decimal exponents in `-4..16`, otherwise `d.ddde+XX`.
fn format_float(value: f64, force_point: bool) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let fixed = value.to_string();
        if force_point && !fixed.contains('.') {
            format!("{fixed}.0")
        } else {
            fixed
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// `repr(float)`.
#[must_use]
pub fn float_repr(value: f64) -> String {
    format_float(value, true)
}

/// `repr(complex)`.
#[must_use]
pub fn complex_repr(value: Complex64) -> String {
    let imag = format_float(value.im, false);
    if value.re == 0.0 && value.re.is_sign_positive() {
        return format!("{imag}j");
    }
    let real = format_float(value.re, false);
    let sign = if imag.starts_with('-') { "" } else { "+" };
    format!("({real}{sign}{imag}j)")
}

// =============================================================================
// Trait Implementations
// =============================================================================

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::Int(NewInt::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i32, i64, u8, u32, u64, usize);

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Complex64> for Value {
    #[inline]
    fn from(value: Complex64) -> Self {
        Self::Complex(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(NewStr::from(value))
    }
}

impl From<NewStr> for Value {
    #[inline]
    fn from(value: NewStr) -> Self {
        Self::Str(value)
    }
}

impl From<NewBytes> for Value {
    #[inline]
    fn from(value: NewBytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<NewInt> for Value {
    #[inline]
    fn from(value: NewInt) -> Self {
        Self::Int(value)
    }
}

impl From<NewList> for Value {
    #[inline]
    fn from(value: NewList) -> Self {
        Self::List(value)
    }
}

impl From<NewRange> for Value {
    #[inline]
    fn from(value: NewRange) -> Self {
        Self::Range(value)
    }
}

impl From<NewDict> for Value {
    #[inline]
    fn from(value: NewDict) -> Self {
        Self::Dict(value)
    }
}

/// Symmetric Python equality; see [`crate::ops::comparison::py_eq`] for the
/// legacy-aware `==`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_str(), f)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}
