//! Sequence algorithms shared by the text and binary types.
//!
//! Everything here works on plain slices (`&[u32]` code points or `&[u8]`
//! bytes), so `NewStr` and `NewBytes` get identical `find`/`split`/`strip`
//! semantics and differ only in what they accept as arguments.

use pyfuture_core::{FutureError, FutureResult};

/// `items * count`. Non-positive counts give an empty vector; a result too
/// large to allocate raises `OverflowError` with `too_long` as the message.
pub(crate) fn repeat_slice<T: Clone>(items: &[T], count: i64, too_long: &str) -> FutureResult<Vec<T>> {
    let count = match usize::try_from(count) {
        Ok(n) if n > 0 && !items.is_empty() => n,
        _ => return Ok(Vec::new()),
    };
    let overflow = || FutureError::overflow(too_long);
    let total = items.len().checked_mul(count).ok_or_else(overflow)?;
    let mut out = Vec::new();
    out.try_reserve_exact(total).map_err(|_| overflow())?;
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    Ok(out)
}

/// Clamp `start`/`end` the way Python's string methods do.
///
/// `end` is clamped to `len`; `start` is only adjusted for negative values,
/// so it may exceed `len` (which callers treat as "no match").
#[inline]
pub(crate) fn adjust_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let fix = |v: i64| if v < 0 { v.saturating_add(len_i).max(0) } else { v };
    let end = end.map_or(len_i, fix).min(len_i);
    let start = start.map_or(0, fix);
    (start as usize, end as usize)
}

/// First occurrence of `needle` in `hay`.
pub(crate) fn find_slice<T: PartialEq>(hay: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > hay.len() {
        return None;
    }
    hay.windows(needle.len()).position(|w| w == needle)
}

/// Last occurrence of `needle` in `hay`.
pub(crate) fn rfind_slice<T: PartialEq>(hay: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() {
        return Some(hay.len());
    }
    if needle.len() > hay.len() {
        return None;
    }
    hay.windows(needle.len()).rposition(|w| w == needle)
}

pub(crate) fn find<T: PartialEq>(
    hay: &[T],
    needle: &[T],
    start: Option<i64>,
    end: Option<i64>,
) -> Option<usize> {
    let (start, end) = adjust_bounds(hay.len(), start, end);
    if start > end {
        return None;
    }
    find_slice(&hay[start..end], needle).map(|pos| pos + start)
}

pub(crate) fn rfind<T: PartialEq>(
    hay: &[T],
    needle: &[T],
    start: Option<i64>,
    end: Option<i64>,
) -> Option<usize> {
    let (start, end) = adjust_bounds(hay.len(), start, end);
    if start > end {
        return None;
    }
    rfind_slice(&hay[start..end], needle).map(|pos| pos + start)
}

/// Non-overlapping occurrences of `needle` in `hay[start..end]`.
pub(crate) fn count<T: PartialEq>(
    hay: &[T],
    needle: &[T],
    start: Option<i64>,
    end: Option<i64>,
) -> usize {
    let (start, end) = adjust_bounds(hay.len(), start, end);
    if start > end {
        return 0;
    }
    if needle.is_empty() {
        return end - start + 1;
    }
    let mut window = &hay[start..end];
    let mut found = 0;
    while let Some(pos) = find_slice(window, needle) {
        found += 1;
        window = &window[pos + needle.len()..];
    }
    found
}

/// Whether `hay[start..end]` starts (or ends) with `affix`.
pub(crate) fn tail_match<T: PartialEq>(
    hay: &[T],
    affix: &[T],
    start: Option<i64>,
    end: Option<i64>,
    at_end: bool,
) -> bool {
    let (start, end) = adjust_bounds(hay.len(), start, end);
    if start > end || end - start < affix.len() {
        return false;
    }
    if at_end {
        &hay[end - affix.len()..end] == affix
    } else {
        &hay[start..start + affix.len()] == affix
    }
}

/// Replace up to `limit` occurrences (`limit < 0` means all).
pub(crate) fn replace<T: Copy + PartialEq>(hay: &[T], old: &[T], new: &[T], limit: i64) -> Vec<T> {
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(hay.len());
    let mut done = 0;

    if old.is_empty() {
        for &item in hay {
            if done < limit {
                out.extend_from_slice(new);
                done += 1;
            }
            out.push(item);
        }
        if done < limit {
            out.extend_from_slice(new);
        }
        return out;
    }

    let mut i = 0;
    while i < hay.len() {
        if done < limit && hay[i..].starts_with(old) {
            out.extend_from_slice(new);
            i += old.len();
            done += 1;
        } else {
            out.push(hay[i]);
            i += 1;
        }
    }
    out
}

// =============================================================================
// Splitting
// =============================================================================

/// Split on a non-empty separator, left to right.
pub(crate) fn split_on<'a, T: PartialEq>(hay: &'a [T], sep: &[T], maxsplit: i64) -> Vec<&'a [T]> {
    let mut parts = Vec::new();
    let mut rest = hay;
    let mut splits = 0;
    while maxsplit < 0 || splits < maxsplit {
        let Some(pos) = find_slice(rest, sep) else {
            break;
        };
        parts.push(&rest[..pos]);
        rest = &rest[pos + sep.len()..];
        splits += 1;
    }
    parts.push(rest);
    parts
}

/// Split on a non-empty separator, right to left.
pub(crate) fn rsplit_on<'a, T: PartialEq>(hay: &'a [T], sep: &[T], maxsplit: i64) -> Vec<&'a [T]> {
    let mut parts = Vec::new();
    let mut rest = hay;
    let mut splits = 0;
    while maxsplit < 0 || splits < maxsplit {
        let Some(pos) = rfind_slice(rest, sep) else {
            break;
        };
        parts.push(&rest[pos + sep.len()..]);
        rest = &rest[..pos];
        splits += 1;
    }
    parts.push(rest);
    parts.reverse();
    parts
}

/// Split on runs of whitespace, dropping empty fields.
///
/// Once `maxsplit` is reached the remainder is kept verbatim, trailing
/// whitespace included.
pub(crate) fn split_whitespace<T: Copy>(
    hay: &[T],
    is_space: impl Fn(T) -> bool,
    maxsplit: i64,
) -> Vec<&[T]> {
    let mut parts = Vec::new();
    let mut splits = 0;
    let mut i = 0;
    loop {
        while i < hay.len() && is_space(hay[i]) {
            i += 1;
        }
        if i == hay.len() {
            break;
        }
        if maxsplit >= 0 && splits == maxsplit {
            parts.push(&hay[i..]);
            break;
        }
        let start = i;
        while i < hay.len() && !is_space(hay[i]) {
            i += 1;
        }
        parts.push(&hay[start..i]);
        splits += 1;
    }
    parts
}

/// Right-to-left variant of [`split_whitespace`].
pub(crate) fn rsplit_whitespace<T: Copy>(
    hay: &[T],
    is_space: impl Fn(T) -> bool,
    maxsplit: i64,
) -> Vec<&[T]> {
    let mut parts = Vec::new();
    let mut splits = 0;
    let mut i = hay.len();
    loop {
        while i > 0 && is_space(hay[i - 1]) {
            i -= 1;
        }
        if i == 0 {
            break;
        }
        if maxsplit >= 0 && splits == maxsplit {
            parts.push(&hay[..i]);
            break;
        }
        let end = i;
        while i > 0 && !is_space(hay[i - 1]) {
            i -= 1;
        }
        parts.push(&hay[i..end]);
        splits += 1;
    }
    parts.reverse();
    parts
}

/// Split at line boundaries. `line_break(hay, i)` returns the length of
/// the boundary starting at `i`, or 0.
pub(crate) fn splitlines<T: Copy>(
    hay: &[T],
    keepends: bool,
    line_break: impl Fn(&[T], usize) -> usize,
) -> Vec<&[T]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < hay.len() {
        let width = line_break(hay, i);
        if width == 0 {
            i += 1;
            continue;
        }
        let end = if keepends { i + width } else { i };
        lines.push(&hay[start..end]);
        i += width;
        start = i;
    }
    if start < hay.len() {
        lines.push(&hay[start..]);
    }
    lines
}

/// Trim elements matching `strip` from either end.
pub(crate) fn strip_by<T: Copy>(hay: &[T], strip: impl Fn(T) -> bool, left: bool, right: bool) -> &[T] {
    let mut start = 0;
    let mut end = hay.len();
    if left {
        while start < end && strip(hay[start]) {
            start += 1;
        }
    }
    if right {
        while end > start && strip(hay[end - 1]) {
            end -= 1;
        }
    }
    &hay[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_space(b: u8) -> bool {
        b.is_ascii_whitespace()
    }

    #[test]
    fn test_find_bounds() {
        assert_eq!(find(b"abcabc", b"c", None, None), Some(2));
        assert_eq!(find(b"abcabc", b"c", Some(3), None), Some(5));
        assert_eq!(find(b"abcabc", b"c", Some(-2), None), Some(5));
        assert_eq!(find(b"abc", b"", Some(3), None), Some(3));
        assert_eq!(find(b"abc", b"", Some(4), None), None);
        assert_eq!(rfind(b"abcabc", b"ab", None, Some(5)), Some(3));
    }

    #[test]
    fn test_count_empty_needle() {
        assert_eq!(count(b"abc", b"", None, None), 4);
        assert_eq!(count(b"aaaa", b"aa", None, None), 2);
        assert_eq!(count(b"abc", b"", Some(5), None), 0);
    }

    #[test]
    fn test_tail_match() {
        assert!(tail_match(b"hello", b"he", None, None, false));
        assert!(tail_match(b"hello", b"lo", None, None, true));
        assert!(tail_match(b"hello", b"ll", Some(2), Some(4), false));
        assert!(tail_match(b"abc", b"", Some(3), None, false));
        assert!(!tail_match(b"abc", b"", Some(4), None, false));
    }

    #[test]
    fn test_replace_limits() {
        assert_eq!(replace(b"aaa", b"a", b"b", -1), b"bbb");
        assert_eq!(replace(b"aaa", b"a", b"b", 2), b"bba");
        assert_eq!(replace(b"abc", b"", b"-", -1), b"-a-b-c-");
        assert_eq!(replace(b"abc", b"", b"-", 2), b"-a-bc");
        assert_eq!(replace(b"", b"", b"x", -1), b"x");
    }

    #[test]
    fn test_split_on() {
        assert_eq!(split_on(b"a,b,,c", b",", -1), vec![&b"a"[..], b"b", b"", b"c"]);
        assert_eq!(split_on(b"a,b,c", b",", 1), vec![&b"a"[..], b"b,c"]);
        assert_eq!(rsplit_on(b"a,b,c", b",", 1), vec![&b"a,b"[..], b"c"]);
    }

    #[test]
    fn test_split_whitespace_keeps_remainder() {
        assert_eq!(
            split_whitespace(b"  a b  c ", is_space, -1),
            vec![&b"a"[..], b"b", b"c"]
        );
        assert_eq!(split_whitespace(b"a b  c ", is_space, 1), vec![&b"a"[..], b"b  c "]);
        assert_eq!(rsplit_whitespace(b" a b  c", is_space, 1), vec![&b" a b"[..], b"c"]);
        assert!(split_whitespace(b"   ", is_space, -1).is_empty());
    }

    #[test]
    fn test_splitlines() {
        let brk = |hay: &[u8], i: usize| match hay[i] {
            b'\r' if hay.get(i + 1) == Some(&b'\n') => 2,
            b'\r' | b'\n' => 1,
            _ => 0,
        };
        assert_eq!(splitlines(b"a\r\nb\nc", false, brk), vec![&b"a"[..], b"b", b"c"]);
        assert_eq!(splitlines(b"a\r\nb\n", true, brk), vec![&b"a\r\n"[..], b"b\n"]);
    }

    #[test]
    fn test_strip_by() {
        assert_eq!(strip_by(b"  x  ", is_space, true, true), b"x");
        assert_eq!(strip_by(b"  x  ", is_space, true, false), b"x  ");
        assert_eq!(strip_by(b"  x  ", is_space, false, true), b"  x");
    }
}
