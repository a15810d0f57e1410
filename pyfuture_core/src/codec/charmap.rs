//! Single-byte codecs: ASCII, Latin-1 and Windows-1251.

use super::utf::run_end;
use super::{DecodeFault, EncodeFault, Encoding, HandlerSlot};
use crate::error::FutureResult;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Marker for bytes with no mapping in a code page.
const UNDEFINED: u32 = u32::MAX;

/// Code points for bytes 0x80..=0xFF in Windows-1251 (0x00..=0x7F are ASCII).
#[rustfmt::skip]
static CP1251_HIGH: [u32; 128] = [
    0x0402, 0x0403, 0x201A, 0x0453, 0x201E, 0x2026, 0x2020, 0x2021,
    0x20AC, 0x2030, 0x0409, 0x2039, 0x040A, 0x040C, 0x040B, 0x040F,
    0x0452, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014,
    UNDEFINED, 0x2122, 0x0459, 0x203A, 0x045A, 0x045C, 0x045B, 0x045F,
    0x00A0, 0x040E, 0x045E, 0x0408, 0x00A4, 0x0490, 0x00A6, 0x00A7,
    0x0401, 0x00A9, 0x0404, 0x00AB, 0x00AC, 0x00AD, 0x00AE, 0x0407,
    0x00B0, 0x00B1, 0x0406, 0x0456, 0x0491, 0x00B5, 0x00B6, 0x00B7,
    0x0451, 0x2116, 0x0454, 0x00BB, 0x0458, 0x0405, 0x0455, 0x0457,
    0x0410, 0x0411, 0x0412, 0x0413, 0x0414, 0x0415, 0x0416, 0x0417,
    0x0418, 0x0419, 0x041A, 0x041B, 0x041C, 0x041D, 0x041E, 0x041F,
    0x0420, 0x0421, 0x0422, 0x0423, 0x0424, 0x0425, 0x0426, 0x0427,
    0x0428, 0x0429, 0x042A, 0x042B, 0x042C, 0x042D, 0x042E, 0x042F,
    0x0430, 0x0431, 0x0432, 0x0433, 0x0434, 0x0435, 0x0436, 0x0437,
    0x0438, 0x0439, 0x043A, 0x043B, 0x043C, 0x043D, 0x043E, 0x043F,
    0x0440, 0x0441, 0x0442, 0x0443, 0x0444, 0x0445, 0x0446, 0x0447,
    0x0448, 0x0449, 0x044A, 0x044B, 0x044C, 0x044D, 0x044E, 0x044F,
];

/// Reverse Windows-1251 table, built on first use.
static CP1251_ENCODE: LazyLock<FxHashMap<u32, u8>> = LazyLock::new(|| {
    CP1251_HIGH
        .iter()
        .enumerate()
        .filter(|&(_, &cp)| cp != UNDEFINED)
        .map(|(i, &cp)| (cp, 0x80 + i as u8))
        .collect()
});

/// Name CPython reports for table-driven code pages.
const CHARMAP: &str = "charmap";

// =============================================================================
// Decoding
// =============================================================================

pub(crate) fn decode_ascii(input: &[u8], handler: &mut HandlerSlot<'_>) -> FutureResult<Vec<u32>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        let byte = input[pos];
        if byte.is_ascii() {
            out.push(u32::from(byte));
            pos += 1;
            continue;
        }
        let fault = DecodeFault {
            encoding: Encoding::Ascii.name(),
            input,
            start: pos,
            end: pos + 1,
            reason: "ordinal not in range(128)",
        };
        pos = handler.recover_decode(&fault, &mut out)?;
    }
    Ok(out)
}

pub(crate) fn decode_latin1(input: &[u8]) -> Vec<u32> {
    input.iter().map(|&b| u32::from(b)).collect()
}

pub(crate) fn decode_cp1251(input: &[u8], handler: &mut HandlerSlot<'_>) -> FutureResult<Vec<u32>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        let byte = input[pos];
        let cp = if byte.is_ascii() {
            u32::from(byte)
        } else {
            CP1251_HIGH[usize::from(byte - 0x80)]
        };
        if cp != UNDEFINED {
            out.push(cp);
            pos += 1;
            continue;
        }
        let fault = DecodeFault {
            encoding: CHARMAP,
            input,
            start: pos,
            end: pos + 1,
            reason: "character maps to <undefined>",
        };
        pos = handler.recover_decode(&fault, &mut out)?;
    }
    Ok(out)
}

// =============================================================================
// Encoding
// =============================================================================

/// Append `cp` as one byte when it is below `limit`.
#[inline]
pub(crate) fn push_limited(cp: u32, limit: u32, out: &mut Vec<u8>) -> bool {
    if cp < limit {
        out.push(cp as u8);
        true
    } else {
        false
    }
}

/// Append the Windows-1251 byte for `cp`, if it has one.
#[inline]
pub(crate) fn push_cp1251(cp: u32, out: &mut Vec<u8>) -> bool {
    if cp < 0x80 {
        out.push(cp as u8);
        return true;
    }
    match CP1251_ENCODE.get(&cp) {
        Some(&byte) => {
            out.push(byte);
            true
        }
        None => false,
    }
}

pub(crate) fn encode_ascii(input: &[u32], handler: &mut HandlerSlot<'_>) -> FutureResult<Vec<u8>> {
    encode_limited(input, Encoding::Ascii, 0x80, "ordinal not in range(128)", handler)
}

pub(crate) fn encode_latin1(input: &[u32], handler: &mut HandlerSlot<'_>) -> FutureResult<Vec<u8>> {
    encode_limited(input, Encoding::Latin1, 0x100, "ordinal not in range(256)", handler)
}

fn encode_limited(
    input: &[u32],
    encoding: Encoding,
    limit: u32,
    reason: &'static str,
    handler: &mut HandlerSlot<'_>,
) -> FutureResult<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        if push_limited(input[pos], limit, &mut out) {
            pos += 1;
            continue;
        }
        let fault = EncodeFault {
            encoding: encoding.name(),
            input,
            start: pos,
            end: run_end(input, pos, |cp| cp >= limit),
            reason,
        };
        pos = handler.recover_encode(&fault, encoding, &mut out)?;
    }
    Ok(out)
}

pub(crate) fn encode_cp1251(input: &[u32], handler: &mut HandlerSlot<'_>) -> FutureResult<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        if push_cp1251(input[pos], &mut out) {
            pos += 1;
            continue;
        }
        let fault = EncodeFault {
            encoding: CHARMAP,
            input,
            start: pos,
            end: pos + 1,
            reason: "character maps to <undefined>",
        };
        pos = handler.recover_encode(&fault, Encoding::Cp1251, &mut out)?;
    }
    Ok(out)
}
