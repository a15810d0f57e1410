//! Equality and ordering across value variants.
//!
//! Two notions of equality live here:
//! - [`values_equal`] is symmetric and is what containers, dictionary keys
//!   and `PartialEq for Value` use;
//! - [`py_eq`] is the `==` operator, which adds one asymmetric rule for the
//!   host's legacy strings: `legacy == text` is true when the bytes
//!   ASCII-decode to the same text, while `text == legacy` stays false.

use crate::types::{NewInt, NewStr};
use crate::value::Value;
use num_complex::Complex64;
use pyfuture_core::{FutureError, FutureResult};
use std::cmp::Ordering;

/// Rich comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Whether `ordering` satisfies this operator.
    #[must_use]
    pub const fn matches(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
            Self::Lt => ordering.is_lt(),
            Self::Le => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Ge => ordering.is_ge(),
        }
    }
}

// =============================================================================
// Numeric Helpers
// =============================================================================

enum Number {
    Int(NewInt),
    Float(f64),
    Complex(Complex64),
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Bool(_) | Value::Int(_) => value.as_int().map(Number::Int),
        Value::Float(f) => Some(Number::Float(*f)),
        Value::Complex(c) => Some(Number::Complex(*c)),
        _ => None,
    }
}

fn real_cmp(a: &Number, b: &Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Some(x.cmp(y)),
        (Number::Int(x), Number::Float(y)) => x.cmp_f64(*y),
        (Number::Float(x), Number::Int(y)) => y.cmp_f64(*x).map(Ordering::reverse),
        (Number::Float(x), Number::Float(y)) => x.partial_cmp(y),
        _ => None,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a, b) {
        (Number::Complex(x), Number::Complex(y)) => x == y,
        (Number::Complex(c), other) | (other, Number::Complex(c)) => {
            c.im == 0.0 && real_cmp(&Number::Float(c.re), other) == Some(Ordering::Equal)
        }
        _ => real_cmp(a, b) == Some(Ordering::Equal),
    }
}

fn binary_data(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Bytes(data) => Some(data.as_bytes()),
        Value::LegacyBytes(raw) => Some(raw),
        _ => None,
    }
}

fn sequences_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
}

// =============================================================================
// Equality
// =============================================================================

/// Symmetric equality. Text never equals binary data.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return numbers_equal(&x, &y);
    }
    if let (Some(x), Some(y)) = (binary_data(a), binary_data(b)) {
        return x == y;
    }
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => x == y,
        (Value::Tuple(x), Value::Tuple(y)) => sequences_equal(x, y),
        (Value::Range(x), Value::Range(y)) => x == y,
        (Value::Dict(x), Value::Dict(y)) => x == y,
        (Value::Slice(x), Value::Slice(y)) => x == y,
        _ => false,
    }
}

/// The `==` operator.
#[must_use]
pub fn py_eq(a: &Value, b: &Value) -> bool {
    if let (Value::LegacyBytes(raw), Value::Str(text)) = (a, b) {
        return NewStr::decode_legacy(raw).is_ok_and(|decoded| decoded == *text);
    }
    values_equal(a, b)
}

/// The `!=` operator.
#[must_use]
pub fn py_ne(a: &Value, b: &Value) -> bool {
    !py_eq(a, b)
}

// =============================================================================
// Ordering
// =============================================================================

fn unorderable(op: CompareOp, a: &Value, b: &Value) -> FutureError {
    FutureError::type_error(format!(
        "'{}' not supported between instances of '{}' and '{}'",
        op.symbol(),
        a.type_name(),
        b.type_name()
    ))
}

fn text_operand(value: &Value) -> FutureResult<Option<NewStr>> {
    match value {
        Value::Str(text) => Ok(Some(text.clone())),
        Value::LegacyBytes(raw) => NewStr::decode_legacy(raw).map(Some),
        _ => Ok(None),
    }
}

fn sequence_compare(op: CompareOp, a: &[Value], b: &[Value]) -> FutureResult<bool> {
    for (x, y) in a.iter().zip(b) {
        if !values_equal(x, y) {
            return compare(op, x, y);
        }
    }
    Ok(op.matches(a.len().cmp(&b.len())))
}

/// Evaluate `a <op> b`.
///
/// Ordering text against Python 3 binary data is a `TypeError`; the legacy
/// string orders against text after ASCII decoding and against binary data
/// bytewise.
pub fn compare(op: CompareOp, a: &Value, b: &Value) -> FutureResult<bool> {
    match op {
        CompareOp::Eq => return Ok(py_eq(a, b)),
        CompareOp::Ne => return Ok(py_ne(a, b)),
        _ => {}
    }

    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        if matches!(x, Number::Complex(_)) || matches!(y, Number::Complex(_)) {
            return Err(unorderable(op, a, b));
        }
        return Ok(real_cmp(&x, &y).is_some_and(|ord| op.matches(ord)));
    }

    match (a, b) {
        (Value::Str(_), Value::Str(_) | Value::LegacyBytes(_))
        | (Value::LegacyBytes(_), Value::Str(_)) => {
            if let (Some(x), Some(y)) = (text_operand(a)?, text_operand(b)?) {
                return Ok(op.matches(x.cmp(&y)));
            }
        }
        (Value::List(x), Value::List(y)) => return sequence_compare(op, x.as_slice(), y.as_slice()),
        (Value::Tuple(x), Value::Tuple(y)) => return sequence_compare(op, x, y),
        _ => {}
    }

    if let (Some(x), Some(y)) = (binary_data(a), binary_data(b)) {
        return Ok(op.matches(x.cmp(y)));
    }
    Err(unorderable(op, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewBytes, NewList};

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    fn bytes(b: &[u8]) -> Value {
        Value::Bytes(NewBytes::from(b))
    }

    #[test]
    fn test_text_never_equals_bytes() {
        assert!(!py_eq(&text("abc"), &bytes(b"abc")));
        assert!(!py_eq(&bytes(b"abc"), &text("abc")));
        assert!(py_ne(&text("abc"), &bytes(b"abc")));
    }

    #[test]
    fn test_legacy_equality_is_asymmetric() {
        let legacy = Value::legacy(b"abc");
        assert!(py_eq(&legacy, &text("abc")));
        assert!(!py_eq(&text("abc"), &legacy));
        assert!(!values_equal(&legacy, &text("abc")));
        assert!(!py_eq(&Value::legacy(b"\xff"), &text("\u{ff}")));
    }

    #[test]
    fn test_legacy_equals_binary() {
        assert!(py_eq(&Value::legacy(b"abc"), &bytes(b"abc")));
        assert!(py_eq(&bytes(b"abc"), &Value::legacy(b"abc")));
    }

    #[test]
    fn test_numeric_tower_equality() {
        assert!(py_eq(&Value::from(1), &Value::from(1.0)));
        assert!(py_eq(&Value::from(true), &Value::from(1)));
        assert!(py_eq(&Value::from(Complex64::new(2.0, 0.0)), &Value::from(2)));
        assert!(!py_eq(&Value::from(Complex64::new(2.0, 1.0)), &Value::from(2)));
        assert!(!py_eq(&Value::from(f64::NAN), &Value::from(f64::NAN)));
    }

    #[test]
    fn test_ordering_text_vs_bytes_raises() {
        let err = compare(CompareOp::Lt, &text("a"), &bytes(b"b")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: '<' not supported between instances of 'str' and 'bytes'"
        );
        let err = compare(CompareOp::Ge, &bytes(b"a"), &text("b")).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_ordering_legacy_against_text() {
        assert!(compare(CompareOp::Lt, &text("a"), &Value::legacy(b"b")).unwrap());
        assert!(compare(CompareOp::Gt, &Value::legacy(b"b"), &text("a")).unwrap());
        assert!(compare(CompareOp::Lt, &Value::legacy(b"a"), &bytes(b"b")).unwrap());
    }

    #[test]
    fn test_ordering_numbers() {
        assert!(compare(CompareOp::Lt, &Value::from(1), &Value::from(1.5)).unwrap());
        assert!(!compare(CompareOp::Lt, &Value::from(1), &Value::from(f64::NAN)).unwrap());
        let err = compare(CompareOp::Lt, &Value::from(Complex64::new(1.0, 1.0)), &Value::from(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: '<' not supported between instances of 'complex' and 'int'"
        );
        assert!(compare(CompareOp::Lt, &Value::from(1), &text("a")).is_err());
    }

    #[test]
    fn test_ordering_sequences() {
        let a = Value::List(NewList::from(vec![Value::from(1), Value::from(2)]));
        let b = Value::List(NewList::from(vec![Value::from(1), Value::from(3)]));
        assert!(compare(CompareOp::Lt, &a, &b).unwrap());
        let short = Value::Tuple(vec![Value::from(1)]);
        let long = Value::Tuple(vec![Value::from(1), Value::from(0)]);
        assert!(compare(CompareOp::Le, &short, &long).unwrap());
    }
}
