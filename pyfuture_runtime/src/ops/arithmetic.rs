//! Binary and unary operators with Python 3 promotion rules.
//!
//! Numbers promote `bool -> int -> float -> complex`; `/` on two ints is
//! true division. For sequences, concatenation and repetition stay within one
//! kind: mixing text and binary data in either operand position raises
//! `TypeError`, with the host's legacy string accepted as text by text and
//! as binary data by bytes.

use crate::types::search::repeat_slice;
use crate::types::{NewBytes, NewInt, NewStr};
use crate::value::Value;
use num_complex::Complex64;
use pyfuture_core::{FutureError, FutureResult};
use std::sync::Arc;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    TrueDiv,
    /// `//`
    FloorDiv,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `<<`
    LShift,
    /// `>>`
    RShift,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
}

impl BinaryOp {
    /// Operator symbol as it appears in error messages.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::TrueDiv => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "** or pow()",
            Self::LShift => "<<",
            Self::RShift => ">>",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Pos,
    /// `~x`
    Invert,
    /// `abs(x)`
    Abs,
}

impl UnaryOp {
    /// Operator name as it appears in error messages.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "unary -",
            Self::Pos => "unary +",
            Self::Invert => "unary ~",
            Self::Abs => "abs()",
        }
    }
}

fn unsupported(symbol: &str, a: &Value, b: &Value) -> FutureError {
    FutureError::type_error(format!(
        "unsupported operand type(s) for {symbol}: '{}' and '{}'",
        a.type_name(),
        b.type_name()
    ))
}

// =============================================================================
// Numeric Tower
// =============================================================================

enum Num {
    Int(NewInt),
    Float(f64),
    Complex(Complex64),
}

fn to_num(value: &Value) -> Option<Num> {
    match value {
        Value::Bool(_) | Value::Int(_) => value.as_int().map(Num::Int),
        Value::Float(f) => Some(Num::Float(*f)),
        Value::Complex(c) => Some(Num::Complex(*c)),
        _ => None,
    }
}

fn to_f64(num: &Num) -> FutureResult<f64> {
    match num {
        Num::Int(n) => n.to_f64(),
        Num::Float(f) => Ok(*f),
        Num::Complex(c) => Ok(c.re),
    }
}

fn to_complex(num: &Num) -> FutureResult<Complex64> {
    match num {
        Num::Complex(c) => Ok(*c),
        other => Ok(Complex64::new(to_f64(other)?, 0.0)),
    }
}

/// `divmod` for floats: the remainder takes the sign of `y`.
pub fn float_divmod(x: f64, y: f64) -> FutureResult<(f64, f64)> {
    if y == 0.0 {
        return Err(FutureError::zero_division("float divmod()"));
    }
    let mut rem = x % y;
    let mut div = (x - rem) / y;
    if rem != 0.0 {
        if (y < 0.0) != (rem < 0.0) {
            rem += y;
            div -= 1.0;
        }
    } else {
        rem = 0.0f64.copysign(y);
    }
    let floordiv = if div != 0.0 {
        let mut floor = div.floor();
        if div - floor > 0.5 {
            floor += 1.0;
        }
        floor
    } else {
        0.0f64.copysign(x / y)
    };
    Ok((floordiv, rem))
}

fn float_pow(x: f64, y: f64) -> FutureResult<Value> {
    if y == 0.0 {
        return Ok(Value::Float(1.0));
    }
    if x == 0.0 && y < 0.0 {
        return Err(FutureError::zero_division(
            "0.0 cannot be raised to a negative power",
        ));
    }
    if x < 0.0 && y.is_finite() && y.fract() != 0.0 {
        return complex_pow(Complex64::new(x, 0.0), Complex64::new(y, 0.0));
    }
    let result = x.powf(y);
    if result.is_infinite() && x.is_finite() && y.is_finite() {
        return Err(FutureError::overflow("(34, 'Numerical result out of range')"));
    }
    Ok(Value::Float(result))
}

fn complex_pow(x: Complex64, y: Complex64) -> FutureResult<Value> {
    if y == Complex64::new(0.0, 0.0) {
        return Ok(Value::Complex(Complex64::new(1.0, 0.0)));
    }
    if x == Complex64::new(0.0, 0.0) {
        if y.im != 0.0 || y.re < 0.0 {
            return Err(FutureError::zero_division(
                "0.0 to a negative or complex power",
            ));
        }
        return Ok(Value::Complex(x));
    }
    Ok(Value::Complex(x.powc(y)))
}

fn int_op(op: BinaryOp, x: &NewInt, y: &NewInt) -> FutureResult<Value> {
    Ok(match op {
        BinaryOp::Add => Value::Int(x + y),
        BinaryOp::Sub => Value::Int(x - y),
        BinaryOp::Mul => Value::Int(x * y),
        BinaryOp::TrueDiv => Value::Float(x.true_div(y)?),
        BinaryOp::FloorDiv => Value::Int(x.floor_div(y)?),
        BinaryOp::Mod => Value::Int(x.modulo(y)?),
        BinaryOp::Pow => x.pow(y)?,
        BinaryOp::LShift => Value::Int(x.shl(y)?),
        BinaryOp::RShift => Value::Int(x.shr(y)?),
        BinaryOp::And => Value::Int(x & y),
        BinaryOp::Or => Value::Int(x | y),
        BinaryOp::Xor => Value::Int(x ^ y),
    })
}

fn float_op(op: BinaryOp, a: &Value, b: &Value, x: f64, y: f64) -> FutureResult<Value> {
    Ok(Value::Float(match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::TrueDiv => {
            if y == 0.0 {
                return Err(FutureError::zero_division("float division by zero"));
            }
            x / y
        }
        BinaryOp::FloorDiv => {
            if y == 0.0 {
                return Err(FutureError::zero_division("float floor division by zero"));
            }
            float_divmod(x, y)?.0
        }
        BinaryOp::Mod => {
            if y == 0.0 {
                return Err(FutureError::zero_division("float modulo by zero"));
            }
            float_divmod(x, y)?.1
        }
        BinaryOp::Pow => return float_pow(x, y),
        _ => return Err(unsupported(op.symbol(), a, b)),
    }))
}

fn complex_op(op: BinaryOp, a: &Value, b: &Value, x: Complex64, y: Complex64) -> FutureResult<Value> {
    Ok(Value::Complex(match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::TrueDiv => {
            if y == Complex64::new(0.0, 0.0) {
                return Err(FutureError::zero_division("complex division by zero"));
            }
            x / y
        }
        BinaryOp::Pow => return complex_pow(x, y),
        _ => return Err(unsupported(op.symbol(), a, b)),
    }))
}

fn numeric_op(op: BinaryOp, a: &Value, b: &Value, x: Num, y: Num) -> FutureResult<Value> {
    // bool & bool stays bool.
    if let (Value::Bool(p), Value::Bool(q)) = (a, b) {
        match op {
            BinaryOp::And => return Ok(Value::Bool(p & q)),
            BinaryOp::Or => return Ok(Value::Bool(p | q)),
            BinaryOp::Xor => return Ok(Value::Bool(p ^ q)),
            _ => {}
        }
    }

    match (&x, &y) {
        (Num::Int(i), Num::Int(j)) => int_op(op, i, j),
        (Num::Complex(_), _) | (_, Num::Complex(_)) => {
            complex_op(op, a, b, to_complex(&x)?, to_complex(&y)?)
        }
        _ => float_op(op, a, b, to_f64(&x)?, to_f64(&y)?),
    }
}

// =============================================================================
// Sequences
// =============================================================================

fn legacy_text(raw: &[u8]) -> FutureResult<NewStr> {
    NewStr::decode_legacy(raw)
}

fn concat(a: &Value, b: &Value) -> FutureResult<Value> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(Value::Str(x.concat(y))),
        (Value::Str(x), Value::LegacyBytes(raw)) => Ok(Value::Str(x.concat(&legacy_text(raw)?))),
        (Value::LegacyBytes(raw), Value::Str(y)) => Ok(Value::Str(legacy_text(raw)?.concat(y))),
        (Value::Str(_), other) => Err(FutureError::type_error(format!(
            "can only concatenate str (not \"{}\") to str",
            other.type_name()
        ))),

        (Value::Bytes(x), Value::Bytes(y)) => Ok(Value::Bytes(x.concat(y.as_bytes()))),
        (Value::Bytes(x), Value::LegacyBytes(raw)) => Ok(Value::Bytes(x.concat(raw))),
        (Value::LegacyBytes(raw), Value::Bytes(y)) => {
            Ok(Value::Bytes(NewBytes::from(&raw[..]).concat(y.as_bytes())))
        }
        (Value::Bytes(_), other) => Err(FutureError::type_error(format!(
            "can't concat {} to bytes",
            other.type_name()
        ))),

        (Value::LegacyBytes(x), Value::LegacyBytes(y)) => {
            let joined: Arc<[u8]> = x.iter().chain(y.iter()).copied().collect();
            Ok(Value::LegacyBytes(joined))
        }

        (Value::List(x), Value::List(y)) => Ok(Value::List(x.concat(y))),
        (Value::List(_), other) => Err(FutureError::type_error(format!(
            "can only concatenate list (not \"{}\") to list",
            other.type_name()
        ))),

        (Value::Tuple(x), Value::Tuple(y)) => Ok(Value::Tuple(x.iter().chain(y).cloned().collect())),
        (Value::Tuple(_), other) => Err(FutureError::type_error(format!(
            "can only concatenate tuple (not \"{}\") to tuple",
            other.type_name()
        ))),

        _ => Err(unsupported("+", a, b)),
    }
}

fn is_repeatable(value: &Value) -> bool {
    matches!(
        value,
        Value::Str(_) | Value::Bytes(_) | Value::LegacyBytes(_) | Value::List(_) | Value::Tuple(_)
    )
}

fn repeat(seq: &Value, count: &Value) -> FutureResult<Value> {
    let count = count.as_int().ok_or_else(|| {
        FutureError::type_error(format!(
            "can't multiply sequence by non-int of type '{}'",
            count.type_name()
        ))
    })?;
    let n = count.to_index()?;
    Ok(match seq {
        Value::Str(text) => Value::Str(text.repeat(n)?),
        Value::Bytes(data) => Value::Bytes(data.repeat(n)?),
        Value::LegacyBytes(raw) => {
            Value::LegacyBytes(repeat_slice(&raw[..], n, "repeated string is too long")?.into())
        }
        Value::List(list) => Value::List(list.repeat(n)?),
        Value::Tuple(items) => Value::Tuple(repeat_slice(items.as_slice(), n, "repeated tuple is too long")?),
        other => return Err(FutureError::type_error(format!(
            "can't multiply sequence by non-int of type '{}'",
            other.type_name()
        ))),
    })
}

// =============================================================================
// Entry Points
// =============================================================================

/// Evaluate `a <op> b`.
pub fn binary_op(op: BinaryOp, a: &Value, b: &Value) -> FutureResult<Value> {
    if let (Some(x), Some(y)) = (to_num(a), to_num(b)) {
        return numeric_op(op, a, b, x, y);
    }
    match op {
        BinaryOp::Add => concat(a, b),
        BinaryOp::Mul if is_repeatable(a) => repeat(a, b),
        BinaryOp::Mul if is_repeatable(b) => repeat(b, a),
        _ => Err(unsupported(op.symbol(), a, b)),
    }
}

/// Three-argument `pow(base, exponent, modulus)`; integers only.
pub fn pow_mod(base: &Value, exponent: &Value, modulus: &Value) -> FutureResult<Value> {
    match (base.as_int(), exponent.as_int(), modulus.as_int()) {
        (Some(b), Some(e), Some(m)) => b.pow_mod(&e, &m).map(Value::Int),
        _ => Err(FutureError::type_error(
            "pow() 3rd argument not allowed unless all arguments are integers",
        )),
    }
}

/// `divmod(a, b)` as a two-element tuple.
pub fn divmod(a: &Value, b: &Value) -> FutureResult<Value> {
    let pair = match (to_num(a), to_num(b)) {
        (Some(Num::Int(x)), Some(Num::Int(y))) => {
            let (q, r) = x.divmod(&y)?;
            (Value::Int(q), Value::Int(r))
        }
        (Some(x), Some(y)) if !matches!(x, Num::Complex(_)) && !matches!(y, Num::Complex(_)) => {
            let (q, r) = float_divmod(to_f64(&x)?, to_f64(&y)?)?;
            (Value::Float(q), Value::Float(r))
        }
        _ => return Err(unsupported("divmod()", a, b)),
    };
    Ok(Value::Tuple(vec![pair.0, pair.1]))
}

/// Evaluate a unary operator.
pub fn unary_op(op: UnaryOp, value: &Value) -> FutureResult<Value> {
    let bad = || {
        FutureError::type_error(format!(
            "bad operand type for {}: '{}'",
            op.symbol(),
            value.type_name()
        ))
    };
    match (op, to_num(value).ok_or_else(bad)?) {
        (UnaryOp::Neg, Num::Int(n)) => Ok(Value::Int(-&n)),
        (UnaryOp::Pos, Num::Int(n)) => Ok(Value::Int(n)),
        (UnaryOp::Abs, Num::Int(n)) => Ok(Value::Int(n.abs())),
        (UnaryOp::Invert, Num::Int(n)) => Ok(Value::Int(!&n)),
        (UnaryOp::Neg, Num::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Num::Float(f)) => Ok(Value::Float(f)),
        (UnaryOp::Abs, Num::Float(f)) => Ok(Value::Float(f.abs())),
        (UnaryOp::Neg, Num::Complex(c)) => Ok(Value::Complex(-c)),
        (UnaryOp::Pos, Num::Complex(c)) => Ok(Value::Complex(c)),
        (UnaryOp::Abs, Num::Complex(c)) => {
            let norm = c.norm();
            if norm.is_infinite() && c.re.is_finite() && c.im.is_finite() {
                return Err(FutureError::overflow("absolute value too large"));
            }
            Ok(Value::Float(norm))
        }
        (UnaryOp::Invert, _) => Err(bad()),
    }
}
