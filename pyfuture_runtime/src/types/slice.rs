//! Extended slices and index normalization.

use pyfuture_core::{FutureError, FutureResult};
use std::fmt;

/// A Python slice, `start:stop:step`, with every bound optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Slice {
    /// First index, or the sequence edge when absent.
    pub start: Option<i64>,
    /// End index (exclusive), or the sequence edge when absent.
    pub stop: Option<i64>,
    /// Stride; absent means 1.
    pub step: Option<i64>,
}

/// Concrete slice bounds for one sequence length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceIndices {
    /// First selected index.
    pub start: i64,
    /// Stop index; may be -1 for negative steps.
    pub stop: i64,
    /// Non-zero stride.
    pub step: i64,
    /// Number of selected elements.
    pub len: usize,
}

impl Slice {
    /// Create a slice from optional bounds.
    #[inline]
    #[must_use]
    pub const fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// `[:]`
    #[inline]
    #[must_use]
    pub const fn full() -> Self {
        Self::new(None, None, None)
    }

    /// `[start:stop]`
    #[inline]
    #[must_use]
    pub const fn range(start: i64, stop: i64) -> Self {
        Self::new(Some(start), Some(stop), None)
    }

    /// Resolve the slice against a sequence of `len` elements.
    ///
    /// Follows `slice.indices()`: out-of-range bounds are clamped, never
    /// rejected.
    pub fn indices(&self, len: usize) -> FutureResult<SliceIndices> {
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(FutureError::value_error("slice step cannot be zero"));
        }
        let step = step.max(-i64::MAX);

        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: Option<i64>, default: i64| match bound {
            None => default,
            Some(v) if v < 0 => v.saturating_add(len).max(lower),
            Some(v) => v.min(upper),
        };
        let (start, stop) = if step < 0 {
            (clamp(self.start, upper), clamp(self.stop, lower))
        } else {
            (clamp(self.start, lower), clamp(self.stop, upper))
        };

        let count = if step < 0 {
            if stop < start { (start - stop - 1) / -step + 1 } else { 0 }
        } else if start < stop {
            (stop - start - 1) / step + 1
        } else {
            0
        };

        Ok(SliceIndices {
            start,
            stop,
            step,
            len: usize::try_from(count).unwrap_or(0),
        })
    }
}

impl SliceIndices {
    /// Positions selected by the slice, in order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + use<> {
        let Self { start, step, len, .. } = *self;
        (0..len).map(move |i| (start + i as i64 * step) as usize)
    }

    /// Gather the selected elements of `items`.
    #[must_use]
    pub fn select<T: Clone>(&self, items: &[T]) -> Vec<T> {
        if self.step == 1 {
            let start = self.start as usize;
            return items[start..start + self.len].to_vec();
        }
        self.positions().map(|i| items[i].clone()).collect()
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |bound: Option<i64>| bound.map_or_else(|| "None".to_string(), |v| v.to_string());
        write!(
            f,
            "slice({}, {}, {})",
            part(self.start),
            part(self.stop),
            part(self.step)
        )
    }
}

/// Resolve a possibly negative index against `len`.
#[inline]
#[must_use]
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let idx = if index < 0 { index.checked_add(len)? } else { index };
    if (0..len).contains(&idx) {
        Some(idx as usize)
    } else {
        None
    }
}
