//! The `surrogateescape` error handler (PEP 383).
//!
//! Decoding maps every undecodable byte `b` in `0x80..=0xFF` to the lone
//! surrogate `U+DC00 + b`; encoding maps `U+DC80..=U+DCFF` back to the byte.
//! Anything else inside a fault range re-raises the original codec error, so
//! no data is ever silently lost.

use super::registry::ErrorHandler;
use super::{DecodeFault, DecodeRecovery, EncodeFault, EncodeRecovery, EncodeReplacement};
use crate::error::FutureResult;
use smallvec::SmallVec;
use tracing::trace;

/// Base of the escape range.
pub const ESCAPE_BASE: u32 = 0xDC00;

/// Map an undecodable byte to its escape code point.
///
/// Only bytes `0x80..=0xFF` can be escaped; ASCII bytes never are.
#[inline]
#[must_use]
pub const fn escape_byte(byte: u8) -> Option<u32> {
    if byte >= 0x80 {
        Some(ESCAPE_BASE + byte as u32)
    } else {
        None
    }
}

/// Map an escape code point back to its byte.
#[inline]
#[must_use]
pub const fn unescape_code_point(cp: u32) -> Option<u8> {
    if cp >= ESCAPE_BASE + 0x80 && cp <= ESCAPE_BASE + 0xFF {
        Some((cp - ESCAPE_BASE) as u8)
    } else {
        None
    }
}

/// Check whether a code point is a surrogate escape.
#[inline]
#[must_use]
pub const fn is_escape(cp: u32) -> bool {
    unescape_code_point(cp).is_some()
}

/// Handler object registered under the name `surrogateescape`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SurrogateEscape;

impl ErrorHandler for SurrogateEscape {
    fn handle_decode(&self, fault: &DecodeFault<'_>) -> FutureResult<DecodeRecovery> {
        let mut replacement = SmallVec::with_capacity(fault.end - fault.start);
        for &byte in fault.bytes() {
            match escape_byte(byte) {
                Some(cp) => replacement.push(cp),
                None => return Err(fault.to_error()),
            }
        }
        trace!(
            encoding = fault.encoding,
            start = fault.start,
            end = fault.end,
            "escaped undecodable bytes"
        );
        Ok(DecodeRecovery {
            replacement,
            resume: fault.end,
        })
    }

    fn handle_encode(&self, fault: &EncodeFault<'_>) -> FutureResult<EncodeRecovery> {
        let mut replacement = SmallVec::with_capacity(fault.end - fault.start);
        for &cp in fault.code_points() {
            match unescape_code_point(cp) {
                Some(byte) => replacement.push(byte),
                None => return Err(fault.to_error()),
            }
        }
        trace!(
            encoding = fault.encoding,
            start = fault.start,
            end = fault.end,
            "restored escaped bytes"
        );
        Ok(EncodeRecovery {
            replacement: EncodeReplacement::Bytes(replacement),
            resume: fault.end,
        })
    }
}
