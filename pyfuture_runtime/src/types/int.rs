//! Python 3 `int`.
//!
//! An arbitrary-precision integer with Python 3 division semantics:
//! `/` is true division to a correctly rounded float, `//` and `%` floor
//! toward negative infinity, and bitwise operators act on an infinite
//! two's complement representation.

use super::bytes::NewBytes;
use crate::value::Value;
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use pyfuture_core::{FutureError, FutureResult};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Mul, Neg, Not, Sub};

/// Byte order for [`NewInt::to_bytes`] and [`NewInt::from_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// Parse Python's `byteorder` argument.
    pub fn parse(name: &str) -> FutureResult<Self> {
        match name {
            "big" => Ok(Self::Big),
            "little" => Ok(Self::Little),
            _ => Err(FutureError::value_error(
                "byteorder must be either 'little' or 'big'",
            )),
        }
    }
}

/// Python 3 integer.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NewInt(BigInt);

impl NewInt {
    /// Wrap a big integer.
    #[inline]
    #[must_use]
    pub const fn new(value: BigInt) -> Self {
        Self(value)
    }

    /// The underlying big integer.
    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Consume into the underlying big integer.
    #[inline]
    #[must_use]
    pub fn into_bigint(self) -> BigInt {
        self.0
    }

    /// `int(text, base)`.
    ///
    /// Accepts surrounding whitespace, one sign, a `0x`/`0o`/`0b` prefix when
    /// `base` is 0 or matches it, and single underscores between digits.
    /// Base 0 infers the radix from the prefix and rejects leading zeros in
    /// non-zero decimals.
    pub fn parse(text: &str, base: u32) -> FutureResult<Self> {
        if base == 1 || base > 36 {
            return Err(FutureError::value_error(
                "int() base must be >= 2 and <= 36, or 0",
            ));
        }
        let invalid = || {
            FutureError::value_error(format!(
                "invalid literal for int() with base {base}: '{text}'"
            ))
        };

        let trimmed = text.trim();
        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let prefix_radix = match body.get(..2).map(str::to_ascii_lowercase).as_deref() {
            Some("0x") => Some(16),
            Some("0o") => Some(8),
            Some("0b") => Some(2),
            _ => None,
        };
        let (radix, digits) = match (base, prefix_radix) {
            (0, Some(radix)) => (radix, &body[2..]),
            (0, None) => (10, body),
            (base, Some(radix)) if base == radix => (base, &body[2..]),
            (base, _) => (base, body),
        };
        let digits = if digits.len() == body.len() {
            digits
        } else {
            digits.strip_prefix('_').unwrap_or(digits)
        };

        if digits.is_empty()
            || digits.starts_with('_')
            || digits.ends_with('_')
            || digits.contains("__")
            || !digits.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
        {
            return Err(invalid());
        }
        let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
        if base == 0 && radix == 10 && cleaned.starts_with('0') && cleaned.bytes().any(|b| b != b'0') {
            return Err(invalid());
        }

        let magnitude = BigInt::parse_bytes(cleaned.as_bytes(), radix).ok_or_else(invalid)?;
        Ok(Self(if negative { -magnitude } else { magnitude }))
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Value as `i64`, if it fits.
    #[inline]
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    /// Value as a sequence index or count.
    pub fn to_index(&self) -> FutureResult<i64> {
        self.to_i64().ok_or_else(|| {
            FutureError::overflow("cannot fit 'int' into an index-sized integer")
        })
    }

    /// Correctly rounded conversion to float.
    pub fn to_f64(&self) -> FutureResult<f64> {
        self.0
            .to_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| FutureError::overflow("int too large to convert to float"))
    }

    /// `self == 0`.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self < 0`.
    #[inline]
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// `abs(self)`.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// `int.bit_length()`: bits needed for `abs(self)`.
    #[must_use]
    pub fn bit_length(&self) -> u64 {
        self.0.bits()
    }

    /// Exact comparison with a float; `None` for NaN.
    #[must_use]
    pub fn cmp_f64(&self, other: f64) -> Option<Ordering> {
        if other.is_nan() {
            return None;
        }
        if other.is_infinite() {
            return Some(if other > 0.0 { Ordering::Less } else { Ordering::Greater });
        }
        let floor = BigInt::from_f64(other.floor())?;
        if other.fract() == 0.0 {
            return Some(self.0.cmp(&floor));
        }
        // floor(f) < f < floor(f) + 1, so no integer equals f.
        Some(if self.0 <= floor { Ordering::Less } else { Ordering::Greater })
    }

    // =========================================================================
    // Division
    // =========================================================================

    /// `self / other`, correctly rounded (round-half-even) to `f64`.
    pub fn true_div(&self, other: &Self) -> FutureResult<f64> {
        const MANT_DIG: i64 = f64::MANTISSA_DIGITS as i64;
        const MIN_EXP: i64 = f64::MIN_EXP as i64;
        const MAX_EXP: i64 = f64::MAX_EXP as i64;

        if other.is_zero() {
            return Err(FutureError::zero_division("division by zero"));
        }
        let too_large = || FutureError::overflow("integer division result too large for a float");
        let negative = self.is_negative() != other.is_negative();
        let signed = |v: f64| if negative { -v } else { v };

        let a = self.0.magnitude();
        let b = other.0.magnitude();
        if a.is_zero() {
            return Ok(signed(0.0));
        }

        // Both operands exact as floats: one IEEE division rounds correctly.
        if a.bits() <= MANT_DIG as u64 && b.bits() <= MANT_DIG as u64 {
            if let (Some(x), Some(y)) = (a.to_f64(), b.to_f64()) {
                return Ok(signed(x / y));
            }
        }

        let diff = a.bits() as i64 - b.bits() as i64;
        if diff > MAX_EXP {
            return Err(too_large());
        }
        if diff < MIN_EXP - MANT_DIG - 1 {
            return Ok(signed(0.0));
        }

        // Scale so the quotient carries two or three bits beyond the mantissa.
        let shift = diff.max(MIN_EXP) - MANT_DIG - 2;
        let (quotient, remainder) = if shift <= 0 {
            (a << (-shift) as usize).div_rem(b)
        } else {
            a.div_rem(&(b << shift as usize))
        };
        let inexact = u64::from(!remainder.is_zero());
        let x = quotient.to_u64().ok_or_else(too_large)?;
        let x_bits = i64::from(64 - x.leading_zeros());

        let extra_bits = x_bits.max(MIN_EXP - shift) - MANT_DIG;
        let mask = 1u64 << (extra_bits - 1);
        let mut low = x | inexact;
        if low & mask != 0 && low & (3 * mask - 1) != 0 {
            low += mask;
        }
        low &= !(2 * mask - 1);
        let dx = low as f64;

        if shift + x_bits >= MAX_EXP
            && (shift + x_bits > MAX_EXP || dx == libm::ldexp(1.0, x_bits as i32))
        {
            return Err(too_large());
        }
        Ok(signed(libm::ldexp(dx, shift as i32)))
    }

    /// `self // other`.
    pub fn floor_div(&self, other: &Self) -> FutureResult<Self> {
        if other.is_zero() {
            return Err(FutureError::zero_division("integer division or modulo by zero"));
        }
        Ok(Self(self.0.div_floor(&other.0)))
    }

    /// `self % other`; the result takes the sign of `other`.
    pub fn modulo(&self, other: &Self) -> FutureResult<Self> {
        if other.is_zero() {
            return Err(FutureError::zero_division("integer modulo by zero"));
        }
        Ok(Self(self.0.mod_floor(&other.0)))
    }

    /// `divmod(self, other)`.
    pub fn divmod(&self, other: &Self) -> FutureResult<(Self, Self)> {
        if other.is_zero() {
            return Err(FutureError::zero_division("integer division or modulo by zero"));
        }
        let (q, r) = self.0.div_mod_floor(&other.0);
        Ok((Self(q), Self(r)))
    }

    // =========================================================================
    // Powers and Shifts
    // =========================================================================

    /// `self ** exponent`: an int for non-negative exponents, else a float.
    pub fn pow(&self, exponent: &Self) -> FutureResult<Value> {
        if exponent.is_negative() {
            if self.is_zero() {
                return Err(FutureError::zero_division(
                    "0.0 cannot be raised to a negative power",
                ));
            }
            let base = self.to_f64()?;
            let exp = exponent.to_f64()?;
            return Ok(Value::Float(base.powf(exp)));
        }

        if self.0.is_zero() || self.0.is_one() {
            return Ok(Value::Int(if exponent.is_zero() { Self::from(1) } else { self.clone() }));
        }
        if self.0 == -BigInt::one() {
            let odd = exponent.0.is_odd();
            return Ok(Value::Int(Self::from(if odd { -1 } else { 1 })));
        }
        let exp = exponent
            .0
            .to_u32()
            .ok_or_else(|| FutureError::overflow("exponent too large"))?;
        Ok(Value::Int(Self(self.0.pow(exp))))
    }

    /// Three-argument `pow(self, exponent, modulus)`.
    pub fn pow_mod(&self, exponent: &Self, modulus: &Self) -> FutureResult<Self> {
        if modulus.is_zero() {
            return Err(FutureError::value_error("pow() 3rd argument cannot be 0"));
        }
        if !exponent.is_negative() {
            return Ok(Self(self.0.modpow(&exponent.0, &modulus.0)));
        }

        let m = modulus.0.abs();
        let gcd = self.0.mod_floor(&m).extended_gcd(&m);
        if !gcd.gcd.is_one() {
            return Err(FutureError::value_error(
                "base is not invertible for the given modulus",
            ));
        }
        let inverse = gcd.x.mod_floor(&m);
        Ok(Self(inverse.modpow(&(-&exponent.0), &modulus.0)))
    }

    fn shift_count(count: &Self) -> FutureResult<Option<usize>> {
        if count.is_negative() {
            return Err(FutureError::value_error("negative shift count"));
        }
        Ok(count.0.to_usize())
    }

    /// `self << count`.
    pub fn shl(&self, count: &Self) -> FutureResult<Self> {
        match Self::shift_count(count)? {
            _ if self.is_zero() => Ok(Self::default()),
            Some(n) => Ok(Self(&self.0 << n)),
            None => Err(FutureError::overflow("too many digits in integer")),
        }
    }

    /// `self >> count`, rounding toward negative infinity.
    pub fn shr(&self, count: &Self) -> FutureResult<Self> {
        match Self::shift_count(count)? {
            Some(n) => Ok(Self(&self.0 >> n)),
            None => Ok(Self::from(if self.is_negative() { -1 } else { 0 })),
        }
    }

    // =========================================================================
    // Byte Conversion
    // =========================================================================

    /// `int.to_bytes(length, byteorder, signed=...)`.
    pub fn to_bytes(&self, length: usize, order: ByteOrder, signed: bool) -> FutureResult<NewBytes> {
        if !signed && self.is_negative() {
            return Err(FutureError::overflow("can't convert negative int to unsigned"));
        }
        let mut raw = if self.is_zero() {
            Vec::new()
        } else if signed {
            self.0.to_signed_bytes_le()
        } else {
            self.0.to_bytes_le().1
        };
        if raw.len() > length {
            return Err(FutureError::overflow("int too big to convert"));
        }
        let fill = if self.is_negative() { 0xFF } else { 0x00 };
        raw.resize(length, fill);
        if order == ByteOrder::Big {
            raw.reverse();
        }
        Ok(NewBytes::from(raw))
    }

    /// `int.from_bytes(data, byteorder, signed=...)`.
    #[must_use]
    pub fn from_bytes(data: &[u8], order: ByteOrder, signed: bool) -> Self {
        let value = match (order, signed) {
            (ByteOrder::Little, true) => BigInt::from_signed_bytes_le(data),
            (ByteOrder::Big, true) => BigInt::from_signed_bytes_be(data),
            (ByteOrder::Little, false) => BigInt::from_bytes_le(Sign::Plus, data),
            (ByteOrder::Big, false) => BigInt::from_bytes_be(Sign::Plus, data),
        };
        Self(value)
    }
}

// =============================================================================
// Conversions and Operators
// =============================================================================

macro_rules! impl_from_primitive {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NewInt {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self(BigInt::from(value))
                }
            }
        )*
    };
}

impl_from_primitive!(i32, i64, u8, u32, u64, usize, i128);

impl From<bool> for NewInt {
    #[inline]
    fn from(value: bool) -> Self {
        Self::from(u8::from(value))
    }
}

impl From<BigInt> for NewInt {
    #[inline]
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

macro_rules! impl_binary_op {
    ($($trait:ident :: $method:ident),*) => {
        $(
            impl $trait for &NewInt {
                type Output = NewInt;

                #[inline]
                fn $method(self, rhs: Self) -> NewInt {
                    NewInt($trait::$method(&self.0, &rhs.0))
                }
            }
        )*
    };
}

impl_binary_op!(Add::add, Sub::sub, Mul::mul, BitAnd::bitand, BitOr::bitor, BitXor::bitxor);

impl Neg for &NewInt {
    type Output = NewInt;

    fn neg(self) -> NewInt {
        NewInt(-&self.0)
    }
}

impl Not for &NewInt {
    type Output = NewInt;

    /// `~x == -x - 1`.
    fn not(self) -> NewInt {
        NewInt(!&self.0)
    }
}

impl fmt::Display for NewInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for NewInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NewInt({})", self.0)
    }
}
