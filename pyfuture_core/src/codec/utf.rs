//! UTF-8 and UTF-16 codecs.
//!
//! The UTF-8 decoder leans on `std::str::from_utf8` for validation: its
//! `error_len` reports the maximal invalid subpart, which is the same fault
//! range CPython reports, so handlers see identical byte ranges.

use super::{DecodeFault, EncodeFault, Encoding, HandlerSlot};
use crate::error::FutureResult;

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_END: u32 = 0xDFFF;
const LOW_SURROGATE_START: u32 = 0xDC00;

#[inline]
const fn is_surrogate(cp: u32) -> bool {
    cp >= SURROGATE_START && cp <= SURROGATE_END
}

/// Bytes that can never begin a UTF-8 sequence.
#[inline]
const fn is_invalid_start(byte: u8) -> bool {
    matches!(byte, 0x80..=0xC1 | 0xF5..=0xFF)
}

// =============================================================================
// UTF-8
// =============================================================================

pub(crate) fn decode_utf8(input: &[u8], handler: &mut HandlerSlot<'_>) -> FutureResult<Vec<u32>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        match std::str::from_utf8(&input[pos..]) {
            Ok(valid) => {
                out.extend(valid.chars().map(u32::from));
                break;
            }
            Err(err) => {
                let start = pos + err.valid_up_to();
                let valid = std::str::from_utf8(&input[pos..start]).unwrap_or_default();
                out.extend(valid.chars().map(u32::from));

                let (end, reason) = match err.error_len() {
                    Some(len) if is_invalid_start(input[start]) => (start + len, "invalid start byte"),
                    Some(len) => (start + len, "invalid continuation byte"),
                    None => (input.len(), "unexpected end of data"),
                };
                let fault = DecodeFault {
                    encoding: Encoding::Utf8.name(),
                    input,
                    start,
                    end,
                    reason,
                };
                pos = handler.recover_decode(&fault, &mut out)?;
            }
        }
    }

    Ok(out)
}

/// Append the UTF-8 form of `cp`; false for surrogates and out-of-range values.
pub(crate) fn push_utf8(cp: u32, out: &mut Vec<u8>) -> bool {
    match char::from_u32(cp) {
        Some(c) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            true
        }
        None => false,
    }
}

pub(crate) fn encode_utf8(input: &[u32], handler: &mut HandlerSlot<'_>) -> FutureResult<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        if push_utf8(input[pos], &mut out) {
            pos += 1;
            continue;
        }
        let end = run_end(input, pos, |cp| char::from_u32(cp).is_none());
        let fault = EncodeFault {
            encoding: Encoding::Utf8.name(),
            input,
            start: pos,
            end,
            reason: "surrogates not allowed",
        };
        pos = handler.recover_encode(&fault, Encoding::Utf8, &mut out)?;
    }

    Ok(out)
}

// =============================================================================
// UTF-16
// =============================================================================

/// Byte order for UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

impl Endian {
    const fn decoder_name(self) -> &'static str {
        match self {
            Self::Little => "utf-16-le",
            Self::Big => "utf-16-be",
        }
    }

    #[inline]
    fn read(self, bytes: &[u8], idx: usize) -> u32 {
        let pair = [bytes[idx], bytes[idx + 1]];
        u32::from(match self {
            Self::Little => u16::from_le_bytes(pair),
            Self::Big => u16::from_be_bytes(pair),
        })
    }

    #[inline]
    fn write(self, unit: u16, out: &mut Vec<u8>) {
        match self {
            Self::Little => out.extend_from_slice(&unit.to_le_bytes()),
            Self::Big => out.extend_from_slice(&unit.to_be_bytes()),
        }
    }
}

/// Append the UTF-16 form of `cp`; false for lone surrogates.
pub(crate) fn push_utf16(cp: u32, endian: Endian, out: &mut Vec<u8>) -> bool {
    if is_surrogate(cp) || cp > 0x10FFFF {
        return false;
    }
    if cp < 0x10000 {
        endian.write(cp as u16, out);
    } else {
        let v = cp - 0x10000;
        endian.write((SURROGATE_START + (v >> 10)) as u16, out);
        endian.write((LOW_SURROGATE_START + (v & 0x3FF)) as u16, out);
    }
    true
}

pub(crate) fn encode_utf16(
    input: &[u32],
    endian: Endian,
    with_bom: bool,
    handler: &mut HandlerSlot<'_>,
) -> FutureResult<Vec<u8>> {
    let encoding = match (with_bom, endian) {
        (true, _) => Encoding::Utf16,
        (false, Endian::Little) => Encoding::Utf16Le,
        (false, Endian::Big) => Encoding::Utf16Be,
    };
    let mut out = Vec::with_capacity(input.len() * 2 + 2);
    if with_bom {
        endian.write(0xFEFF, &mut out);
    }

    let mut pos = 0;
    while pos < input.len() {
        if push_utf16(input[pos], endian, &mut out) {
            pos += 1;
            continue;
        }
        let end = run_end(input, pos, is_surrogate);
        let fault = EncodeFault {
            encoding: encoding.name(),
            input,
            start: pos,
            end,
            reason: "surrogates not allowed",
        };
        pos = handler.recover_encode(&fault, encoding, &mut out)?;
    }

    Ok(out)
}

pub(crate) fn decode_utf16(
    input: &[u8],
    endian: Option<Endian>,
    handler: &mut HandlerSlot<'_>,
) -> FutureResult<Vec<u32>> {
    let (endian, mut pos) = match endian {
        Some(e) => (e, 0),
        None => match input {
            [0xFF, 0xFE, ..] => (Endian::Little, 2),
            [0xFE, 0xFF, ..] => (Endian::Big, 2),
            _ => (Endian::Little, 0),
        },
    };
    let encoding = endian.decoder_name();
    let mut out = Vec::with_capacity(input.len() / 2);

    while pos < input.len() {
        let fault = |start: usize, end: usize, reason: &'static str| DecodeFault {
            encoding,
            input,
            start,
            end,
            reason,
        };

        if input.len() - pos < 2 {
            pos = handler.recover_decode(&fault(pos, input.len(), "truncated data"), &mut out)?;
            continue;
        }

        let unit = endian.read(input, pos);
        if !is_surrogate(unit) {
            out.push(unit);
            pos += 2;
            continue;
        }
        if unit >= LOW_SURROGATE_START {
            pos = handler.recover_decode(&fault(pos, pos + 2, "illegal encoding"), &mut out)?;
            continue;
        }
        if input.len() - pos < 4 {
            pos = handler.recover_decode(&fault(pos, input.len(), "unexpected end of data"), &mut out)?;
            continue;
        }
        let low = endian.read(input, pos + 2);
        if (LOW_SURROGATE_START..=SURROGATE_END).contains(&low) {
            out.push(0x10000 + ((unit - SURROGATE_START) << 10) + (low - LOW_SURROGATE_START));
            pos += 4;
        } else {
            pos = handler.recover_decode(&fault(pos, pos + 2, "illegal UTF-16 surrogate"), &mut out)?;
        }
    }

    Ok(out)
}

/// End of the run of code points starting at `start` that satisfy `pred`.
pub(crate) fn run_end(input: &[u32], start: usize, pred: impl Fn(u32) -> bool) -> usize {
    input[start..]
        .iter()
        .position(|&cp| !pred(cp))
        .map_or(input.len(), |offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> HandlerSlot<'static> {
        HandlerSlot::new("strict")
    }

    fn cps(s: &str) -> Vec<u32> {
        s.chars().map(u32::from).collect()
    }

    #[test]
    fn test_utf8_roundtrip_multibyte() {
        let text = "naïve 日本 🦀";
        let decoded = decode_utf8(text.as_bytes(), &mut strict()).unwrap();
        assert_eq!(decoded, cps(text));
        assert_eq!(encode_utf8(&decoded, &mut strict()).unwrap(), text.as_bytes());
    }

    #[test]
    fn test_utf8_invalid_start_byte() {
        let err = decode_utf8(b"ab\xffcd", &mut strict()).unwrap_err();
        assert_eq!(err.fault_range(), Some((2, 3)));
        assert!(err.to_string().contains("invalid start byte"));
    }

    #[test]
    fn test_utf8_invalid_continuation() {
        let err = decode_utf8(b"\xe2\x28\xa1", &mut strict()).unwrap_err();
        assert_eq!(err.fault_range(), Some((0, 1)));
        assert!(err.to_string().contains("invalid continuation byte"));
    }

    #[test]
    fn test_utf8_unexpected_end() {
        let err = decode_utf8(b"a\xe2\x82", &mut strict()).unwrap_err();
        assert_eq!(err.fault_range(), Some((1, 3)));
        assert!(err.to_string().contains("unexpected end of data"));
    }

    #[test]
    fn test_utf8_encoded_surrogate_is_invalid() {
        let err = decode_utf8(b"\xed\xa0\x80", &mut strict()).unwrap_err();
        assert_eq!(err.fault_range(), Some((0, 1)));
    }

    #[test]
    fn test_utf8_encode_rejects_surrogate_run() {
        let input = [0x61, 0xDC80, 0xDC81, 0x62];
        let err = encode_utf8(&input, &mut strict()).unwrap_err();
        assert_eq!(err.fault_range(), Some((1, 3)));
        assert!(err.to_string().contains("surrogates not allowed"));
    }

    #[test]
    fn test_utf16_bom_and_pairs() {
        let text = cps("a🦀");
        let encoded = encode_utf16(&text, Endian::Little, true, &mut strict()).unwrap();
        assert_eq!(encoded, vec![0xFF, 0xFE, 0x61, 0x00, 0x3E, 0xD8, 0x80, 0xDD]);
        assert_eq!(decode_utf16(&encoded, None, &mut strict()).unwrap(), text);
    }

    #[test]
    fn test_utf16_big_endian_bom_detected() {
        let decoded = decode_utf16(&[0xFE, 0xFF, 0x00, 0x41], None, &mut strict()).unwrap();
        assert_eq!(decoded, cps("A"));
    }

    #[test]
    fn test_utf16_truncated() {
        let err = decode_utf16(&[0x41, 0x00, 0x42], Some(Endian::Little), &mut strict()).unwrap_err();
        assert_eq!(err.fault_range(), Some((2, 3)));
        assert!(err.to_string().contains("truncated data"));
        assert!(err.to_string().contains("'utf-16-le'"));
    }

    #[test]
    fn test_utf16_lone_low_surrogate() {
        let err = decode_utf16(&[0x00, 0xDC], Some(Endian::Little), &mut strict()).unwrap_err();
        assert!(err.to_string().contains("illegal encoding"));
    }

    #[test]
    fn test_run_end() {
        let input = [1, 2, 3, 10, 4];
        assert_eq!(run_end(&input, 0, |cp| cp < 5), 3);
        assert_eq!(run_end(&input, 4, |cp| cp < 5), 5);
    }
}
