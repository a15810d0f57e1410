//! Python 3 `round()`: round-half-to-even.
//!
//! Every numeric type goes through [`Round`]. A type may supply
//! [`Round::round_hook`], which takes precedence; otherwise the value is
//! rounded as a float using its exact binary value, so `round(0.125, 2)` is
//! `0.12` (a true tie) while `round(0.135, 2)` is `0.14` (0.135 is stored
//! slightly above the tie).

use crate::types::NewInt;
use crate::value::Value;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{FromPrimitive, Signed};
use pyfuture_core::{FutureError, FutureResult};
use std::cmp::Ordering;

/// Beyond this many digits every finite double is already exact.
const NDIGITS_MAX: i64 = 323;

/// A value `round()` accepts.
pub trait Round {
    /// Type-specific rounding. `None` falls through to the float path.
    fn round_hook(&self, ndigits: Option<i64>) -> Option<FutureResult<Value>> {
        let _ = ndigits;
        None
    }

    /// The value as a float for the default path; `None` if not numeric.
    fn as_float(&self) -> Option<FutureResult<f64>>;

    /// Python type name for error messages.
    fn type_name(&self) -> &str;
}

/// `round(number, ndigits)`.
///
/// With `ndigits` absent the result is an `int`; otherwise it has the
/// input's kind. The float path does not support negative `ndigits`.
pub fn round<T: Round + ?Sized>(number: &T, ndigits: Option<i64>) -> FutureResult<Value> {
    if let Some(result) = number.round_hook(ndigits) {
        return result;
    }
    let value = number.as_float().ok_or_else(|| {
        FutureError::type_error(format!(
            "type {} doesn't define __round__ method",
            number.type_name()
        ))
    })??;
    round_float(value, ndigits)
}

/// Round a float half-to-even.
fn round_float(value: f64, ndigits: Option<i64>) -> FutureResult<Value> {
    let Some(ndigits) = ndigits else {
        if value.is_nan() {
            return Err(FutureError::value_error("cannot convert float NaN to integer"));
        }
        if value.is_infinite() {
            return Err(FutureError::overflow("cannot convert float infinity to integer"));
        }
        let rounded = BigInt::from_f64(value.round_ties_even()).unwrap_or_default();
        return Ok(Value::Int(NewInt::from(rounded)));
    };

    if ndigits < 0 {
        return Err(FutureError::not_implemented(
            "negative ndigits not supported for this type",
        ));
    }
    if !value.is_finite() || value == 0.0 || ndigits > NDIGITS_MAX {
        return Ok(Value::Float(value));
    }

    let scaled = round_scaled(value.abs(), ndigits as u32);
    let text = format!("{scaled}e-{ndigits}");
    let rounded: f64 = text
        .parse()
        .map_err(|_| FutureError::value_error(format!("could not convert '{text}' to float")))?;
    if rounded.is_infinite() {
        return Err(FutureError::overflow("rounded value too large to represent"));
    }
    Ok(Value::Float(rounded.copysign(value)))
}

/// `|value| * 10**ndigits` rounded half-to-even, computed exactly.
fn round_scaled(value: f64, ndigits: u32) -> BigInt {
    let (mantissa, exponent) = decompose(value);
    let numerator = BigInt::from(mantissa) * BigInt::from(10u8).pow(ndigits);
    if exponent >= 0 {
        return numerator << exponent as usize;
    }
    let denominator = BigInt::from(1u8) << (-exponent) as usize;
    half_even_div(&numerator, &denominator)
}

/// Split a positive finite double into `mantissa * 2**exponent`.
fn decompose(value: f64) -> (u64, i64) {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7FF) as i64;
    let fraction = bits & ((1 << 52) - 1);
    if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    }
}

/// `numerator / denominator` rounded half-to-even (floor based, so it also
/// works for negative numerators).
fn half_even_div(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    let (quotient, remainder) = numerator.div_mod_floor(denominator);
    let twice: BigInt = remainder * 2u8;
    match twice.cmp(&denominator.abs()) {
        Ordering::Greater => quotient + 1u8,
        Ordering::Equal if quotient.is_odd() => quotient + 1u8,
        _ => quotient,
    }
}

// =============================================================================
// Implementations
// =============================================================================

impl Round for f64 {
    fn as_float(&self) -> Option<FutureResult<f64>> {
        Some(Ok(*self))
    }

    fn type_name(&self) -> &str {
        "float"
    }
}

impl Round for NewInt {
    /// `int.__round__`: integers are returned unchanged for non-negative
    /// `ndigits`; negative `ndigits` round to a multiple of `10**-ndigits`.
    fn round_hook(&self, ndigits: Option<i64>) -> Option<FutureResult<Value>> {
        let places = match ndigits {
            Some(n) if n < 0 => n.unsigned_abs(),
            _ => return Some(Ok(Value::Int(self.clone()))),
        };
        // 10**places exceeds twice |self|, so everything rounds to zero.
        if places > self.bit_length() {
            return Some(Ok(Value::Int(NewInt::default())));
        }
        let Ok(places) = u32::try_from(places) else {
            return Some(Ok(Value::Int(NewInt::default())));
        };
        let pow = BigInt::from(10u8).pow(places);
        let rounded = half_even_div(self.as_bigint(), &pow) * pow;
        Some(Ok(Value::Int(NewInt::from(rounded))))
    }

    fn as_float(&self) -> Option<FutureResult<f64>> {
        Some(self.to_f64())
    }

    fn type_name(&self) -> &str {
        "int"
    }
}

impl Round for Value {
    fn round_hook(&self, ndigits: Option<i64>) -> Option<FutureResult<Value>> {
        self.as_int().and_then(|n| n.round_hook(ndigits))
    }

    fn as_float(&self) -> Option<FutureResult<f64>> {
        match self {
            Value::Float(f) => Some(Ok(*f)),
            _ => None,
        }
    }

    fn type_name(&self) -> &str {
        Value::type_name(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn float(value: f64, ndigits: i64) -> f64 {
        match round(&value, Some(ndigits)).unwrap() {
            Value::Float(f) => f,
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn test_bankers_rounding_to_int() {
        assert_eq!(round(&123.5, None).unwrap(), Value::from(124));
        assert_eq!(round(&124.5, None).unwrap(), Value::from(124));
        assert_eq!(round(&-0.5, None).unwrap(), Value::from(0));
        assert_eq!(round(&2.675, None).unwrap(), Value::from(3));
        assert!(matches!(round(&1.5, None).unwrap(), Value::Int(_)));
    }

    #[test]
    fn test_exact_decimal_value() {
        assert_eq!(float(0.125, 2), 0.12);
        assert_eq!(float(0.135, 2), 0.14);
        assert_eq!(float(2.675, 2), 2.67);
        assert_eq!(float(1.5, 0), 2.0);
        assert_eq!(float(2.5, 0), 2.0);
        assert_eq!(float(1e300, 2), 1e300);
    }

    #[test]
    fn test_sign_preserved() {
        assert_eq!(float(-0.125, 2), -0.12);
        let zero = float(-0.4, 0);
        assert!(zero == 0.0 && zero.is_sign_negative());
    }

    #[test]
    fn test_non_finite() {
        let err = round(&f64::NAN, None).unwrap_err();
        assert_eq!(err.to_string(), "ValueError: cannot convert float NaN to integer");
        let err = round(&f64::INFINITY, None).unwrap_err();
        assert_eq!(err.to_string(), "OverflowError: cannot convert float infinity to integer");
        assert!(float(f64::NAN, 2).is_nan());
        assert_eq!(float(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_negative_ndigits_on_float_path() {
        let err = round(&1234.5, Some(-2)).unwrap_err();
        assert_eq!(err.exception_type(), "NotImplementedError");
    }

    #[test]
    fn test_int_hook() {
        let n = NewInt::from(1250);
        assert_eq!(round(&n, Some(-2)).unwrap(), Value::from(1200));
        assert_eq!(round(&NewInt::from(1350), Some(-2)).unwrap(), Value::from(1400));
        assert_eq!(round(&NewInt::from(-1251), Some(-2)).unwrap(), Value::from(-1300));
        assert_eq!(round(&NewInt::from(7), Some(3)).unwrap(), Value::from(7));
        assert_eq!(round(&NewInt::from(7), Some(-100)).unwrap(), Value::from(0));
        assert_eq!(round(&NewInt::from(7), Some(i64::MIN)).unwrap(), Value::from(0));
    }

    #[test]
    fn test_value_dispatch() {
        assert_eq!(round(&Value::from(2.5), None).unwrap(), Value::from(2));
        assert_eq!(round(&Value::from(true), None).unwrap(), Value::from(1));
        let err = round(&Value::from("x"), None).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: type str doesn't define __round__ method");
        let err = round(&Value::from(Complex64::new(1.0, 1.0)), Some(1)).unwrap_err();
        assert!(err.is_type_error());
    }

    /// A user type that rounds itself.
    struct Cents(i64);

    impl Round for Cents {
        fn round_hook(&self, _ndigits: Option<i64>) -> Option<FutureResult<Value>> {
            Some(Ok(Value::from(self.0 / 100)))
        }

        fn as_float(&self) -> Option<FutureResult<f64>> {
            None
        }

        fn type_name(&self) -> &str {
            "Cents"
        }
    }

    #[test]
    fn test_user_hook_takes_precedence() {
        assert_eq!(round(&Cents(1234), None).unwrap(), Value::from(12));
    }
}
