//! Error types and result definitions for pyfuture.
//!
//! Every failure maps onto one Python 3 exception class. The split matters:
//! - `TypeError` marks a text/binary boundary violation or an unsupported
//!   operand type
//! - `ValueError` marks malformed input to an otherwise valid operation
//! - `AttributeError` marks a method that does not exist on the type at all
//! - `UnicodeDecodeError` / `UnicodeEncodeError` carry the codec fault range

use thiserror::Error;

/// The unified result type used throughout pyfuture.
pub type FutureResult<T> = Result<T, FutureError>;

/// Error type covering every exception the value types can raise.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FutureError {
    /// Type mismatch error.
    #[error("TypeError: {message}")]
    TypeError {
        /// Error description.
        message: String,
    },

    /// Value error.
    #[error("ValueError: {message}")]
    ValueError {
        /// Error description.
        message: String,
    },

    /// Attribute access error.
    #[error("AttributeError: {message}")]
    AttributeError {
        /// Error description.
        message: String,
    },

    /// Index out of bounds.
    #[error("IndexError: {message}")]
    IndexError {
        /// Error description.
        message: String,
    },

    /// Key not found in mapping.
    #[error("KeyError: {key}")]
    KeyError {
        /// The missing key representation.
        key: String,
    },

    /// Zero division.
    #[error("ZeroDivisionError: {message}")]
    ZeroDivisionError {
        /// Error description.
        message: String,
    },

    /// Overflow error.
    #[error("OverflowError: {message}")]
    OverflowError {
        /// Error description.
        message: String,
    },

    /// Deliberately unimplemented corner of an operation.
    #[error("NotImplementedError: {message}")]
    NotImplementedError {
        /// Error description.
        message: String,
    },

    /// Unknown codec or error handler name.
    #[error("LookupError: {message}")]
    LookupError {
        /// Error description.
        message: String,
    },

    /// Bytes that cannot be decoded with the requested encoding.
    #[error(
        "UnicodeDecodeError: '{encoding}' codec can't decode {culprit} in position {}: {reason}",
        position_text(.start, .end)
    )]
    UnicodeDecodeError {
        /// Codec name as reported by Python.
        encoding: String,
        /// Offending input, e.g. `byte 0xff` or `bytes`.
        culprit: String,
        /// First offending byte offset.
        start: usize,
        /// One past the last offending byte offset.
        end: usize,
        /// Codec-specific reason.
        reason: String,
    },

    /// Code points that cannot be encoded with the requested encoding.
    #[error(
        "UnicodeEncodeError: '{encoding}' codec can't encode {culprit} in position {}: {reason}",
        position_text(.start, .end)
    )]
    UnicodeEncodeError {
        /// Codec name as reported by Python.
        encoding: String,
        /// Offending input, e.g. `character '\xe9'` or `characters`.
        culprit: String,
        /// First offending code point offset.
        start: usize,
        /// One past the last offending code point offset.
        end: usize,
        /// Codec-specific reason.
        reason: String,
    },
}

/// Render a fault range the way CPython does (`3` or `3-5`, inclusive).
fn position_text(start: &usize, end: &usize) -> String {
    if end.saturating_sub(*start) <= 1 {
        start.to_string()
    } else {
        format!("{}-{}", start, end - 1)
    }
}

impl FutureError {
    /// Create a type error.
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError {
            message: message.into(),
        }
    }

    /// Create a value error.
    #[must_use]
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::ValueError {
            message: message.into(),
        }
    }

    /// Create an attribute error.
    #[must_use]
    pub fn attribute(message: impl Into<String>) -> Self {
        Self::AttributeError {
            message: message.into(),
        }
    }

    /// Create the attribute error raised for a method a type does not have.
    #[must_use]
    pub fn no_attribute(type_name: &str, name: &str) -> Self {
        Self::attribute(format!("'{type_name}' object has no attribute '{name}'"))
    }

    /// Create an index error.
    #[must_use]
    pub fn index(message: impl Into<String>) -> Self {
        Self::IndexError {
            message: message.into(),
        }
    }

    /// Create a key error.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::KeyError { key: key.into() }
    }

    /// Create a zero division error.
    #[must_use]
    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::ZeroDivisionError {
            message: message.into(),
        }
    }

    /// Create an overflow error.
    #[must_use]
    pub fn overflow(message: impl Into<String>) -> Self {
        Self::OverflowError {
            message: message.into(),
        }
    }

    /// Create a not-implemented error.
    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplementedError {
            message: message.into(),
        }
    }

    /// Create a lookup error.
    #[must_use]
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::LookupError {
            message: message.into(),
        }
    }

    /// Create a decode error for `input[start..end]`.
    #[must_use]
    pub fn decode(
        encoding: impl Into<String>,
        input: &[u8],
        start: usize,
        end: usize,
        reason: impl Into<String>,
    ) -> Self {
        let culprit = if end - start == 1 {
            format!("byte 0x{:02x}", input[start])
        } else {
            "bytes".to_string()
        };
        Self::UnicodeDecodeError {
            encoding: encoding.into(),
            culprit,
            start,
            end,
            reason: reason.into(),
        }
    }

    /// Create an encode error for `input[start..end]` (code points).
    #[must_use]
    pub fn encode(
        encoding: impl Into<String>,
        input: &[u32],
        start: usize,
        end: usize,
        reason: impl Into<String>,
    ) -> Self {
        let culprit = if end - start == 1 {
            format!("character '{}'", escape_code_point(input[start]))
        } else {
            "characters".to_string()
        };
        Self::UnicodeEncodeError {
            encoding: encoding.into(),
            culprit,
            start,
            end,
            reason: reason.into(),
        }
    }

    /// Get the Python exception type name.
    #[must_use]
    pub fn exception_type(&self) -> &'static str {
        match self {
            Self::TypeError { .. } => "TypeError",
            Self::ValueError { .. } => "ValueError",
            Self::AttributeError { .. } => "AttributeError",
            Self::IndexError { .. } => "IndexError",
            Self::KeyError { .. } => "KeyError",
            Self::ZeroDivisionError { .. } => "ZeroDivisionError",
            Self::OverflowError { .. } => "OverflowError",
            Self::NotImplementedError { .. } => "NotImplementedError",
            Self::LookupError { .. } => "LookupError",
            Self::UnicodeDecodeError { .. } => "UnicodeDecodeError",
            Self::UnicodeEncodeError { .. } => "UnicodeEncodeError",
        }
    }

    /// Check whether this error is an instance of `TypeError`.
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::TypeError { .. })
    }

    /// Check whether this error is an instance of `ValueError`.
    ///
    /// The Unicode errors subclass `ValueError` in Python, so they count.
    #[must_use]
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::ValueError { .. } | Self::UnicodeDecodeError { .. } | Self::UnicodeEncodeError { .. }
        )
    }

    /// The `(start, end)` fault range of a Unicode error.
    #[must_use]
    pub fn fault_range(&self) -> Option<(usize, usize)> {
        match self {
            Self::UnicodeDecodeError { start, end, .. }
            | Self::UnicodeEncodeError { start, end, .. } => Some((*start, *end)),
            _ => None,
        }
    }
}

/// Escape a code point as CPython does in encode error messages.
fn escape_code_point(cp: u32) -> String {
    if cp < 0x100 {
        format!("\\x{cp:02x}")
    } else if cp < 0x10000 {
        format!("\\u{cp:04x}")
    } else {
        format!("\\U{cp:08x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_creation() {
        let err = FutureError::type_error("can't concat str to bytes");

        assert_eq!(err.exception_type(), "TypeError");
        assert!(err.is_type_error());
        assert_eq!(err.to_string(), "TypeError: can't concat str to bytes");
    }

    #[test]
    fn test_value_error_creation() {
        let err = FutureError::value_error("negative count");

        assert_eq!(err.exception_type(), "ValueError");
        assert!(err.is_value_error());
    }

    #[test]
    fn test_no_attribute_message() {
        let err = FutureError::no_attribute("str", "decode");

        assert_eq!(err.exception_type(), "AttributeError");
        assert_eq!(
            err.to_string(),
            "AttributeError: 'str' object has no attribute 'decode'"
        );
    }

    #[test]
    fn test_decode_error_single_byte() {
        let err = FutureError::decode("utf-8", b"ab\xff", 2, 3, "invalid start byte");

        assert_eq!(
            err.to_string(),
            "UnicodeDecodeError: 'utf-8' codec can't decode byte 0xff in position 2: invalid start byte"
        );
        assert_eq!(err.fault_range(), Some((2, 3)));
        assert!(err.is_value_error());
    }

    #[test]
    fn test_decode_error_range() {
        let err = FutureError::decode("utf-8", b"\xf0\x90", 0, 2, "unexpected end of data");

        assert_eq!(
            err.to_string(),
            "UnicodeDecodeError: 'utf-8' codec can't decode bytes in position 0-1: unexpected end of data"
        );
    }

    #[test]
    fn test_encode_error_single_char() {
        let err = FutureError::encode("ascii", &[0xe9], 0, 1, "ordinal not in range(128)");

        assert_eq!(
            err.to_string(),
            "UnicodeEncodeError: 'ascii' codec can't encode character '\\xe9' in position 0: ordinal not in range(128)"
        );
    }

    #[test]
    fn test_encode_error_escapes_wide_chars() {
        let err = FutureError::encode("ascii", &[0x20ac], 0, 1, "ordinal not in range(128)");
        assert!(err.to_string().contains("'\\u20ac'"));

        let err = FutureError::encode("ascii", &[0x1f600], 0, 1, "ordinal not in range(128)");
        assert!(err.to_string().contains("'\\U0001f600'"));
    }

    #[test]
    fn test_encode_error_range() {
        let err = FutureError::encode("ascii", &[0xe9, 0xe8, 0x41], 0, 2, "ordinal not in range(128)");

        assert_eq!(
            err.to_string(),
            "UnicodeEncodeError: 'ascii' codec can't encode characters in position 0-1: ordinal not in range(128)"
        );
    }

    #[test]
    fn test_overflow_and_not_implemented() {
        assert_eq!(
            FutureError::overflow("int too big to convert").exception_type(),
            "OverflowError"
        );
        assert_eq!(
            FutureError::not_implemented("negative ndigits").exception_type(),
            "NotImplementedError"
        );
    }

    #[test]
    fn test_lookup_error() {
        let err = FutureError::lookup("unknown encoding: klingon");
        assert_eq!(err.to_string(), "LookupError: unknown encoding: klingon");
    }

    #[test]
    fn test_error_is_clone() {
        let original = FutureError::key("missing");
        let cloned = original.clone();
        assert_eq!(original, cloned);
    }

    #[test]
    fn test_fault_range_absent_for_plain_errors() {
        assert_eq!(FutureError::type_error("x").fault_range(), None);
    }
}
