//! Text/binary codecs with pluggable error handlers.
//!
//! Text is represented as a slice of code points (`u32`) rather than `str`
//! because decoded text may contain unpaired surrogates produced by the
//! `surrogateescape` handler, which Rust strings cannot hold.
//!
//! # Supported encodings
//!
//! | Encoding      | Aliases                                   |
//! |---------------|-------------------------------------------|
//! | `utf-8`       | `utf8`, `u8`, `cp65001`                   |
//! | `utf-16`      | `utf16`, `u16`                            |
//! | `utf-16-le`   | `utf-16le`, `utf16le`                     |
//! | `utf-16-be`   | `utf-16be`, `utf16be`                     |
//! | `ascii`       | `us-ascii`, `646`                         |
//! | `latin-1`     | `latin1`, `iso-8859-1`, `iso8859-1`, `l1` |
//! | `cp1251`      | `windows-1251`                            |
//!
//! # Error handling
//!
//! Codecs scan their input and, on the first byte or code point they cannot
//! process, hand a [`DecodeFault`] / [`EncodeFault`] to the error handler named
//! by the caller. The handler is resolved lazily through the process-wide
//! [`registry`], so an unknown handler name only fails when a fault occurs.

pub mod charmap;
pub mod filename;
pub mod registry;
pub mod surrogateescape;
mod utf;

use crate::error::{FutureError, FutureResult};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

pub use filename::FilenameCodec;
pub use registry::{ErrorHandler, lookup_error, register_error, register_surrogateescape};

/// Name of the default strict error handler.
pub const STRICT: &str = "strict";

/// Name of the surrogate-escape error handler.
pub const SURROGATE_ESCAPE: &str = "surrogateescape";

// =============================================================================
// Encoding
// =============================================================================

/// A codec known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-8.
    Utf8,
    /// UTF-16 with byte order mark (little-endian when writing).
    Utf16,
    /// UTF-16 little-endian, no BOM.
    Utf16Le,
    /// UTF-16 big-endian, no BOM.
    Utf16Be,
    /// 7-bit ASCII.
    Ascii,
    /// ISO-8859-1.
    Latin1,
    /// Windows Cyrillic code page.
    Cp1251,
}

impl Encoding {
    /// Resolve an encoding name, accepting Python's spelling variations.
    pub fn lookup(name: &str) -> FutureResult<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        let encoding = match normalized.as_str() {
            "utf-8" | "utf8" | "u8" | "cp65001" => Self::Utf8,
            "utf-16" | "utf16" | "u16" => Self::Utf16,
            "utf-16-le" | "utf-16le" | "utf16le" => Self::Utf16Le,
            "utf-16-be" | "utf-16be" | "utf16be" => Self::Utf16Be,
            "ascii" | "us-ascii" | "646" => Self::Ascii,
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Self::Latin1,
            "cp1251" | "windows-1251" => Self::Cp1251,
            _ => return Err(FutureError::lookup(format!("unknown encoding: {name}"))),
        };
        Ok(encoding)
    }

    /// Canonical codec name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Utf16Le => "utf-16-le",
            Self::Utf16Be => "utf-16-be",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
            Self::Cp1251 => "cp1251",
        }
    }

    /// Decode `input` into code points.
    pub fn decode(self, input: &[u8], errors: &str) -> FutureResult<Vec<u32>> {
        let mut handler = HandlerSlot::new(errors);
        match self {
            Self::Utf8 => utf::decode_utf8(input, &mut handler),
            Self::Utf16 => utf::decode_utf16(input, None, &mut handler),
            Self::Utf16Le => utf::decode_utf16(input, Some(utf::Endian::Little), &mut handler),
            Self::Utf16Be => utf::decode_utf16(input, Some(utf::Endian::Big), &mut handler),
            Self::Ascii => charmap::decode_ascii(input, &mut handler),
            Self::Latin1 => Ok(charmap::decode_latin1(input)),
            Self::Cp1251 => charmap::decode_cp1251(input, &mut handler),
        }
    }

    /// Encode code points into bytes.
    pub fn encode(self, input: &[u32], errors: &str) -> FutureResult<Vec<u8>> {
        let mut handler = HandlerSlot::new(errors);
        match self {
            Self::Utf8 => utf::encode_utf8(input, &mut handler),
            Self::Utf16 => utf::encode_utf16(input, utf::Endian::Little, true, &mut handler),
            Self::Utf16Le => utf::encode_utf16(input, utf::Endian::Little, false, &mut handler),
            Self::Utf16Be => utf::encode_utf16(input, utf::Endian::Big, false, &mut handler),
            Self::Ascii => charmap::encode_ascii(input, &mut handler),
            Self::Latin1 => charmap::encode_latin1(input, &mut handler),
            Self::Cp1251 => charmap::encode_cp1251(input, &mut handler),
        }
    }

    /// Encode a single code point with no error handling.
    ///
    /// Used to encode replacement text returned by error handlers.
    pub(crate) fn encode_strict_one(self, cp: u32, out: &mut Vec<u8>) -> bool {
        match self {
            Self::Utf8 => utf::push_utf8(cp, out),
            Self::Utf16 | Self::Utf16Le => utf::push_utf16(cp, utf::Endian::Little, out),
            Self::Utf16Be => utf::push_utf16(cp, utf::Endian::Big, out),
            Self::Ascii => charmap::push_limited(cp, 0x80, out),
            Self::Latin1 => charmap::push_limited(cp, 0x100, out),
            Self::Cp1251 => charmap::push_cp1251(cp, out),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode `input` with the named encoding and error handler.
pub fn decode(input: &[u8], encoding: &str, errors: &str) -> FutureResult<Vec<u32>> {
    Encoding::lookup(encoding)?.decode(input, errors)
}

/// Encode code points with the named encoding and error handler.
pub fn encode(input: &[u32], encoding: &str, errors: &str) -> FutureResult<Vec<u8>> {
    Encoding::lookup(encoding)?.encode(input, errors)
}

// =============================================================================
// Faults and Recoveries
// =============================================================================

/// A decoding failure handed to an error handler.
#[derive(Debug, Clone, Copy)]
pub struct DecodeFault<'a> {
    /// Codec name reported in errors.
    pub encoding: &'static str,
    /// The complete input being decoded.
    pub input: &'a [u8],
    /// First offending byte.
    pub start: usize,
    /// One past the last offending byte.
    pub end: usize,
    /// Codec-specific reason.
    pub reason: &'static str,
}

impl DecodeFault<'_> {
    /// The offending bytes.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.input[self.start..self.end]
    }

    /// The `UnicodeDecodeError` this fault raises under the strict policy.
    #[must_use]
    pub fn to_error(&self) -> FutureError {
        FutureError::decode(self.encoding, self.input, self.start, self.end, self.reason)
    }
}

/// An encoding failure handed to an error handler.
#[derive(Debug, Clone, Copy)]
pub struct EncodeFault<'a> {
    /// Codec name reported in errors.
    pub encoding: &'static str,
    /// The complete input being encoded.
    pub input: &'a [u32],
    /// First offending code point.
    pub start: usize,
    /// One past the last offending code point.
    pub end: usize,
    /// Codec-specific reason.
    pub reason: &'static str,
}

impl EncodeFault<'_> {
    /// The offending code points.
    #[inline]
    #[must_use]
    pub fn code_points(&self) -> &[u32] {
        &self.input[self.start..self.end]
    }

    /// The `UnicodeEncodeError` this fault raises under the strict policy.
    #[must_use]
    pub fn to_error(&self) -> FutureError {
        FutureError::encode(self.encoding, self.input, self.start, self.end, self.reason)
    }
}

/// Replacement text plus the position where decoding resumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRecovery {
    /// Code points inserted into the output.
    pub replacement: SmallVec<[u32; 4]>,
    /// Input position to continue from.
    pub resume: usize,
}

/// What an encode error handler substitutes for the faulty range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeReplacement {
    /// Text that is encoded strictly with the active codec.
    Text(SmallVec<[u32; 8]>),
    /// Raw bytes copied to the output as-is.
    Bytes(SmallVec<[u8; 8]>),
}

/// Replacement plus the position where encoding resumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRecovery {
    /// Substitute for the faulty code points.
    pub replacement: EncodeReplacement,
    /// Input position to continue from.
    pub resume: usize,
}

// =============================================================================
// Lazy handler resolution
// =============================================================================

/// Error handler named by the caller, resolved on first fault.
pub(crate) struct HandlerSlot<'a> {
    name: &'a str,
    resolved: Option<Arc<dyn ErrorHandler>>,
}

impl<'a> HandlerSlot<'a> {
    pub(crate) fn new(name: &'a str) -> Self {
        Self {
            name,
            resolved: None,
        }
    }

    fn resolve(&mut self) -> FutureResult<Arc<dyn ErrorHandler>> {
        if let Some(handler) = &self.resolved {
            return Ok(Arc::clone(handler));
        }
        let handler = lookup_error(self.name)?;
        self.resolved = Some(Arc::clone(&handler));
        Ok(handler)
    }

    /// Recover from a decode fault, appending the replacement to `out`.
    pub(crate) fn recover_decode(
        &mut self,
        fault: &DecodeFault<'_>,
        out: &mut Vec<u32>,
    ) -> FutureResult<usize> {
        // Strict needs no registry round trip.
        if self.name == STRICT {
            return Err(fault.to_error());
        }
        let recovery = self.resolve()?.handle_decode(fault)?;
        out.extend_from_slice(&recovery.replacement);
        checked_resume(recovery.resume, fault.start, fault.input.len())
    }

    /// Recover from an encode fault, appending the replacement to `out`.
    pub(crate) fn recover_encode(
        &mut self,
        fault: &EncodeFault<'_>,
        encoding: Encoding,
        out: &mut Vec<u8>,
    ) -> FutureResult<usize> {
        if self.name == STRICT {
            return Err(fault.to_error());
        }
        let recovery = self.resolve()?.handle_encode(fault)?;
        match recovery.replacement {
            EncodeReplacement::Bytes(bytes) => out.extend_from_slice(&bytes),
            EncodeReplacement::Text(text) => {
                for cp in text {
                    if !encoding.encode_strict_one(cp, out) {
                        return Err(fault.to_error());
                    }
                }
            }
        }
        checked_resume(recovery.resume, fault.start, fault.input.len())
    }
}

/// Validate a handler's resume position. It must move past the fault start
/// and stay within the input, so a codec loop always makes progress.
fn checked_resume(resume: usize, fault_start: usize, len: usize) -> FutureResult<usize> {
    if resume <= fault_start || resume > len {
        return Err(FutureError::index(format!("position {resume} out of range")));
    }
    Ok(resume)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cps(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(Encoding::lookup("UTF8").unwrap(), Encoding::Utf8);
        assert_eq!(Encoding::lookup("utf_8").unwrap(), Encoding::Utf8);
        assert_eq!(Encoding::lookup("Latin-1").unwrap(), Encoding::Latin1);
        assert_eq!(Encoding::lookup("iso_8859_1").unwrap(), Encoding::Latin1);
        assert_eq!(Encoding::lookup("windows-1251").unwrap(), Encoding::Cp1251);
        assert_eq!(Encoding::lookup("US-ASCII").unwrap(), Encoding::Ascii);
        assert_eq!(Encoding::lookup("utf-16-le").unwrap(), Encoding::Utf16Le);
    }

    #[test]
    fn test_lookup_unknown() {
        let err = Encoding::lookup("klingon").unwrap_err();
        assert_eq!(err.exception_type(), "LookupError");
        assert_eq!(err.to_string(), "LookupError: unknown encoding: klingon");
    }

    #[test]
    fn test_decode_encode_by_name() {
        let text = decode("héllo".as_bytes(), "utf-8", STRICT).unwrap();
        assert_eq!(text, cps("héllo"));
        assert_eq!(encode(&text, "utf-8", STRICT).unwrap(), "héllo".as_bytes());
    }

    #[test]
    fn test_unknown_handler_only_fails_on_fault() {
        assert_eq!(decode(b"abc", "ascii", "no-such-handler").unwrap(), cps("abc"));

        let err = decode(b"ab\xff", "ascii", "no-such-handler").unwrap_err();
        assert_eq!(err.exception_type(), "LookupError");
    }

    #[test]
    fn test_ignore_and_replace_handlers() {
        assert_eq!(decode(b"a\xffb", "utf-8", "ignore").unwrap(), cps("ab"));
        assert_eq!(decode(b"a\xffb", "utf-8", "replace").unwrap(), cps("a\u{fffd}b"));
        assert_eq!(encode(&cps("aéb"), "ascii", "replace").unwrap(), b"a?b");
        assert_eq!(encode(&cps("aéb"), "ascii", "ignore").unwrap(), b"ab");
    }

    #[test]
    fn test_backslashreplace_handler() {
        assert_eq!(
            encode(&cps("a\u{e9}\u{20ac}"), "ascii", "backslashreplace").unwrap(),
            b"a\\xe9\\u20ac"
        );
        assert_eq!(
            decode(b"a\xff", "ascii", "backslashreplace").unwrap(),
            cps("a\\xff")
        );
    }

    #[test]
    fn test_replace_text_is_encoded_with_active_codec() {
        let out = encode(&[0xd800], "utf-16-le", "replace").unwrap();
        assert_eq!(out, vec![b'?', 0]);
    }

    /// Replaces nothing and resumes at a fixed position.
    struct StuckHandler(usize);

    impl ErrorHandler for StuckHandler {
        fn handle_decode(&self, _fault: &DecodeFault<'_>) -> FutureResult<DecodeRecovery> {
            Ok(DecodeRecovery {
                replacement: SmallVec::new(),
                resume: self.0,
            })
        }

        fn handle_encode(&self, _fault: &EncodeFault<'_>) -> FutureResult<EncodeRecovery> {
            Ok(EncodeRecovery {
                replacement: EncodeReplacement::Bytes(SmallVec::new()),
                resume: self.0,
            })
        }
    }

    #[test]
    fn test_handler_resume_must_advance() {
        register_error("test-stuck-at-zero", Arc::new(StuckHandler(0)));
        let err = decode(b"ab\xff", "ascii", "test-stuck-at-zero").unwrap_err();
        assert_eq!(err.to_string(), "IndexError: position 0 out of range");
        let err = encode(&cps("ab\u{e9}"), "ascii", "test-stuck-at-zero").unwrap_err();
        assert_eq!(err.exception_type(), "IndexError");

        // Resuming at the fault start would retry the same fault forever.
        register_error("test-stuck-at-fault", Arc::new(StuckHandler(2)));
        let err = decode(b"ab\xff", "ascii", "test-stuck-at-fault").unwrap_err();
        assert_eq!(err.to_string(), "IndexError: position 2 out of range");

        register_error("test-past-end", Arc::new(StuckHandler(9)));
        let err = decode(b"ab\xff", "ascii", "test-past-end").unwrap_err();
        assert_eq!(err.to_string(), "IndexError: position 9 out of range");

        register_error("test-skip-fault", Arc::new(StuckHandler(3)));
        assert_eq!(decode(b"ab\xff", "ascii", "test-skip-fault").unwrap(), cps("ab"));
    }

    #[test]
    fn test_fault_accessors() {
        let fault = DecodeFault {
            encoding: "utf-8",
            input: b"ab\xff\xfe",
            start: 2,
            end: 4,
            reason: "invalid start byte",
        };
        assert_eq!(fault.bytes(), b"\xff\xfe");
        assert_eq!(fault.to_error().fault_range(), Some((2, 4)));
    }
}
