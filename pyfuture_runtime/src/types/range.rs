//! Python 3 `range`.
//!
//! A lazy arithmetic progression over [`NewInt`]. The stop bound is
//! normalized at construction (`stop == start + len * step`) so lookups,
//! slicing and equality are all O(1) arithmetic.

use super::int::NewInt;
use super::slice::Slice;
use crate::value::Value;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use pyfuture_core::{FutureError, FutureResult};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Python 3 range object.
#[derive(Clone)]
pub struct NewRange {
    start: BigInt,
    stop: BigInt,
    step: BigInt,
    len: BigInt,
}

fn range_len(start: &BigInt, stop: &BigInt, step: &BigInt) -> BigInt {
    let (lo, hi, stride) = if step.is_positive() {
        (start, stop, step.clone())
    } else {
        (stop, start, -step)
    };
    if lo >= hi {
        BigInt::zero()
    } else {
        (hi - lo - 1u8) / stride + 1u8
    }
}

/// `slice.indices(len)` for a length of any size: `(start, step, count)`.
fn slice_bounds(slice: &Slice, len: &BigInt) -> FutureResult<(BigInt, BigInt, BigInt)> {
    let step = slice.step.unwrap_or(1);
    if step == 0 {
        return Err(FutureError::value_error("slice step cannot be zero"));
    }
    let backwards = step < 0;
    let step = BigInt::from(step);

    let (lower, upper) = if backwards {
        (BigInt::from(-1), len - 1u8)
    } else {
        (BigInt::zero(), len.clone())
    };
    let clamp = |bound: Option<i64>, default: &BigInt| match bound {
        None => default.clone(),
        Some(v) if v < 0 => (BigInt::from(v) + len).max(lower.clone()),
        Some(v) => BigInt::from(v).min(upper.clone()),
    };
    let (start, stop) = if backwards {
        (clamp(slice.start, &upper), clamp(slice.stop, &lower))
    } else {
        (clamp(slice.start, &lower), clamp(slice.stop, &upper))
    };

    let count = if backwards && stop < start {
        (&start - &stop - 1u8) / -&step + 1u8
    } else if !backwards && start < stop {
        (&stop - &start - 1u8) / &step + 1u8
    } else {
        BigInt::zero()
    };
    Ok((start, step, count))
}

fn integer_arg(value: &Value) -> FutureResult<BigInt> {
    value.as_int().map(NewInt::into_bigint).ok_or_else(|| {
        FutureError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

impl NewRange {
    /// `range(start, stop, step)`.
    pub fn new(start: impl Into<NewInt>, stop: impl Into<NewInt>, step: impl Into<NewInt>) -> FutureResult<Self> {
        let (start, stop, step) = (
            start.into().into_bigint(),
            stop.into().into_bigint(),
            step.into().into_bigint(),
        );
        if step.is_zero() {
            return Err(FutureError::value_error("range() arg 3 must not be zero"));
        }
        let len = range_len(&start, &stop, &step);
        Ok(Self::from_parts(start, step, len))
    }

    /// `range(stop)`.
    #[must_use]
    pub fn from_stop(stop: i64) -> Self {
        let len = BigInt::from(stop.max(0));
        Self::from_parts(BigInt::zero(), BigInt::one(), len)
    }

    /// `range(*args)` with one to three integer arguments.
    pub fn from_values(args: &[Value]) -> FutureResult<Self> {
        match args {
            [stop] => Self::new(0, NewInt::from(integer_arg(stop)?), 1),
            [start, stop] => Self::new(
                NewInt::from(integer_arg(start)?),
                NewInt::from(integer_arg(stop)?),
                1,
            ),
            [start, stop, step] => Self::new(
                NewInt::from(integer_arg(start)?),
                NewInt::from(integer_arg(stop)?),
                NewInt::from(integer_arg(step)?),
            ),
            [] => Err(FutureError::type_error("range expected at least 1 argument, got 0")),
            _ => Err(FutureError::type_error(format!(
                "range expected at most 3 arguments, got {}",
                args.len()
            ))),
        }
    }

    fn from_parts(start: BigInt, step: BigInt, len: BigInt) -> Self {
        let stop = &start + &len * &step;
        Self { start, stop, step, len }
    }

    /// First element (whether or not the range is empty).
    #[must_use]
    pub fn start(&self) -> NewInt {
        NewInt::from(self.start.clone())
    }

    /// Normalized stop: `start + len * step`.
    #[must_use]
    pub fn stop(&self) -> NewInt {
        NewInt::from(self.stop.clone())
    }

    /// Stride.
    #[must_use]
    pub fn step(&self) -> NewInt {
        NewInt::from(self.step.clone())
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> NewInt {
        NewInt::from(self.len.clone())
    }

    /// Number of elements as a native size.
    pub fn len_usize(&self) -> FutureResult<usize> {
        self.len
            .to_usize()
            .ok_or_else(|| FutureError::overflow("Python int too large to convert to C ssize_t"))
    }

    /// Check if empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len.is_zero()
    }

    // =========================================================================
    // Sequence Protocol
    // =========================================================================

    /// `r[index]`, negative indices counted from the end.
    pub fn get(&self, index: &NewInt) -> FutureResult<NewInt> {
        let index = index.as_bigint();
        let position = if index.is_negative() { index + &self.len } else { index.clone() };
        if position.is_negative() || position >= self.len {
            return Err(FutureError::index("range object index out of range"));
        }
        Ok(NewInt::from(&self.start + position * &self.step))
    }

    /// `r[start:stop:step]`, another range computed without iteration.
    ///
    /// The bounds are clamped on big integers, so ranges longer than any
    /// native index can still be sliced.
    pub fn slice(&self, slice: &Slice) -> FutureResult<Self> {
        let (first, stride, len) = slice_bounds(slice, &self.len)?;
        let start = &self.start + first * &self.step;
        let step = &self.step * stride;
        Ok(Self::from_parts(start, step, len))
    }

    fn position_of(&self, value: &BigInt) -> Option<BigInt> {
        let offset = value - &self.start;
        let (position, rem) = offset.div_mod_floor(&self.step);
        (rem.is_zero() && !position.is_negative() && position < self.len).then_some(position)
    }

    fn integral(value: &Value) -> Option<BigInt> {
        match value {
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => num_traits::FromPrimitive::from_f64(*f),
            other => other.as_int().map(NewInt::into_bigint),
        }
    }

    /// `value in r`: ints and integral floats by arithmetic.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        Self::integral(value).is_some_and(|v| self.position_of(&v).is_some())
    }

    /// `r.index(value)`.
    pub fn index(&self, value: &Value) -> FutureResult<NewInt> {
        Self::integral(value)
            .and_then(|v| self.position_of(&v))
            .map(NewInt::from)
            .ok_or_else(|| FutureError::value_error(format!("{} is not in range", value.repr())))
    }

    /// `r.count(value)`: 0 or 1.
    #[must_use]
    pub fn count(&self, value: &Value) -> usize {
        usize::from(self.contains(value))
    }

    /// Iterate forward; use `.rev()` for `reversed(r)`.
    #[must_use]
    pub fn iter(&self) -> RangeIter {
        let back = if self.len.is_zero() {
            self.start.clone()
        } else {
            &self.stop - &self.step
        };
        RangeIter {
            front: self.start.clone(),
            back,
            step: self.step.clone(),
            remaining: self.len.clone(),
        }
    }

    /// `repr(r)`.
    #[must_use]
    pub fn repr(&self) -> String {
        if self.step.is_one() {
            format!("range({}, {})", self.start, self.stop)
        } else {
            format!("range({}, {}, {})", self.start, self.stop, self.step)
        }
    }
}

/// Double-ended iterator over a [`NewRange`].
#[derive(Debug, Clone)]
pub struct RangeIter {
    front: BigInt,
    back: BigInt,
    step: BigInt,
    remaining: BigInt,
}

impl Iterator for RangeIter {
    type Item = NewInt;

    fn next(&mut self) -> Option<NewInt> {
        if self.remaining.is_zero() {
            return None;
        }
        let value = self.front.clone();
        self.front += &self.step;
        self.remaining -= 1u8;
        Some(NewInt::from(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining.to_usize() {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for RangeIter {
    fn next_back(&mut self) -> Option<NewInt> {
        if self.remaining.is_zero() {
            return None;
        }
        let value = self.back.clone();
        self.back -= &self.step;
        self.remaining -= 1u8;
        Some(NewInt::from(value))
    }
}

impl IntoIterator for &NewRange {
    type Item = NewInt;
    type IntoIter = RangeIter;

    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

/// Ranges compare as the sequences they produce.
impl PartialEq for NewRange {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        self.len.is_zero()
            || (self.start == other.start && (self.len.is_one() || self.step == other.step))
    }
}

impl Eq for NewRange {}

impl Hash for NewRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        if !self.len.is_zero() {
            self.start.hash(state);
            if !self.len.is_one() {
                self.step.hash(state);
            }
        }
    }
}

impl fmt::Display for NewRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl fmt::Debug for NewRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}
